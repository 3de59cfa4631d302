use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::Serialize;
use uuid::Uuid;

use crate::approvals::ApprovalSet;
use crate::error::ServiceError;
use crate::schema::*;
use crate::status::{BidStatus, OrganizationType, TenderStatus};

#[derive(Debug, Clone, Queryable, Identifiable, Serialize)]
#[diesel(table_name = employee)]
pub struct Employee {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = employee)]
pub struct NewEmployee {
    pub id: Uuid,
    pub username: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = organization)]
pub struct OrganizationRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub organization_type: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub organization_type: OrganizationType,
}

impl TryFrom<OrganizationRow> for Organization {
    type Error = ServiceError;

    fn try_from(row: OrganizationRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            organization_type: row.organization_type.parse()?,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = organization)]
pub struct NewOrganization {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub organization_type: String,
}

#[derive(Debug, Clone, Queryable, Insertable)]
#[diesel(table_name = organization_responsible)]
pub struct OrganizationResponsible {
    pub organization_id: Uuid,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tender {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub status: TenderStatus,
    pub organization_id: Uuid,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable)]
pub struct TenderRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub status: String,
    pub organization_id: Uuid,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<TenderRow> for Tender {
    type Error = ServiceError;

    fn try_from(row: TenderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            service_type: row.service_type,
            status: row.status.parse()?,
            organization_id: row.organization_id,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = tenders)]
#[diesel(treat_none_as_null = true)]
pub struct TenderRecord<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub service_type: &'a str,
    pub status: &'a str,
    pub organization_id: Uuid,
    pub version: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a Tender> for TenderRecord<'a> {
    fn from(tender: &'a Tender) -> Self {
        Self {
            id: tender.id,
            name: &tender.name,
            description: tender.description.as_deref(),
            service_type: &tender.service_type,
            status: tender.status.as_str(),
            organization_id: tender.organization_id,
            version: tender.version,
            created_at: tender.created_at,
            updated_at: tender.updated_at,
        }
    }
}

/// Immutable ledger snapshot of a tender at one version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenderHistory {
    pub tender_id: Uuid,
    pub version: i32,
    pub name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub status: TenderStatus,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable)]
pub struct TenderHistoryRow {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub version: i32,
    pub name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub status: String,
    pub recorded_at: NaiveDateTime,
}

impl TryFrom<TenderHistoryRow> for TenderHistory {
    type Error = ServiceError;

    fn try_from(row: TenderHistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            tender_id: row.tender_id,
            version: row.version,
            name: row.name,
            description: row.description,
            service_type: row.service_type,
            status: row.status.parse()?,
            recorded_at: row.recorded_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = tender_history)]
pub struct NewTenderHistory<'a> {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub version: i32,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub service_type: &'a str,
    pub status: &'a str,
    pub recorded_at: NaiveDateTime,
}

impl<'a> From<&'a TenderHistory> for NewTenderHistory<'a> {
    fn from(entry: &'a TenderHistory) -> Self {
        Self {
            id: Uuid::new_v4(),
            tender_id: entry.tender_id,
            version: entry.version,
            name: &entry.name,
            description: entry.description.as_deref(),
            service_type: &entry.service_type,
            status: entry.status.as_str(),
            recorded_at: entry.recorded_at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Bid {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: BidStatus,
    pub tender_id: Uuid,
    pub organization_id: Uuid,
    pub creator_id: Uuid,
    pub version: i32,
    pub approved_by: ApprovalSet,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Bid {
    /// Always the size of `approved_by`; the count is never stored separately.
    pub fn approve_decision_count(&self) -> i32 {
        self.approved_by.len() as i32
    }
}

#[derive(Debug, Clone, Queryable)]
pub struct BidRow {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub tender_id: Uuid,
    pub organization_id: Uuid,
    pub creator_id: Uuid,
    pub version: i32,
    pub approve_decision_count: i32,
    pub approved_by: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<BidRow> for Bid {
    type Error = ServiceError;

    fn try_from(row: BidRow) -> Result<Self, Self::Error> {
        let approved_by: ApprovalSet = row.approved_by.into_iter().collect();
        if approved_by.len() as i32 != row.approve_decision_count {
            return Err(ServiceError::Internal(format!(
                "bid {} stores {} approvals but a count of {}",
                row.id,
                approved_by.len(),
                row.approve_decision_count
            )));
        }
        Ok(Self {
            id: row.id,
            name: row.name,
            description: row.description,
            status: row.status.parse()?,
            tender_id: row.tender_id,
            organization_id: row.organization_id,
            creator_id: row.creator_id,
            version: row.version,
            approved_by,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(Debug, Insertable, AsChangeset)]
#[diesel(table_name = bids)]
#[diesel(treat_none_as_null = true)]
pub struct BidRecord<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub tender_id: Uuid,
    pub organization_id: Uuid,
    pub creator_id: Uuid,
    pub version: i32,
    pub approve_decision_count: i32,
    pub approved_by: Vec<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl<'a> From<&'a Bid> for BidRecord<'a> {
    fn from(bid: &'a Bid) -> Self {
        Self {
            id: bid.id,
            name: &bid.name,
            description: bid.description.as_deref(),
            status: bid.status.as_str(),
            tender_id: bid.tender_id,
            organization_id: bid.organization_id,
            creator_id: bid.creator_id,
            version: bid.version,
            approve_decision_count: bid.approve_decision_count(),
            approved_by: bid.approved_by.as_slice().to_vec(),
            created_at: bid.created_at,
            updated_at: bid.updated_at,
        }
    }
}

/// Immutable ledger snapshot of a bid at one version.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BidHistory {
    pub bid_id: Uuid,
    pub version: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: BidStatus,
    pub recorded_at: NaiveDateTime,
}

#[derive(Debug, Clone, Queryable)]
pub struct BidHistoryRow {
    pub id: Uuid,
    pub bid_id: Uuid,
    pub version: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: String,
    pub recorded_at: NaiveDateTime,
}

impl TryFrom<BidHistoryRow> for BidHistory {
    type Error = ServiceError;

    fn try_from(row: BidHistoryRow) -> Result<Self, Self::Error> {
        Ok(Self {
            bid_id: row.bid_id,
            version: row.version,
            name: row.name,
            description: row.description,
            status: row.status.parse()?,
            recorded_at: row.recorded_at,
        })
    }
}

#[derive(Debug, Insertable)]
#[diesel(table_name = bid_history)]
pub struct NewBidHistory<'a> {
    pub id: Uuid,
    pub bid_id: Uuid,
    pub version: i32,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub status: &'a str,
    pub recorded_at: NaiveDateTime,
}

impl<'a> From<&'a BidHistory> for NewBidHistory<'a> {
    fn from(entry: &'a BidHistory) -> Self {
        Self {
            id: Uuid::new_v4(),
            bid_id: entry.bid_id,
            version: entry.version,
            name: &entry.name,
            description: entry.description.as_deref(),
            status: entry.status.as_str(),
            recorded_at: entry.recorded_at,
        }
    }
}
