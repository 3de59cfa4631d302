use chrono::NaiveDateTime;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use super::{EntityStore, Versioned};
use crate::approvals::ApprovalSet;
use crate::error::ServiceResult;
use crate::models::{Bid, BidHistory, BidRecord, BidRow};
use crate::schema::bids;
use crate::status::BidStatus;

/// Fields of a bid edit; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BidPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<BidStatus>,
}

pub struct NewBidParams {
    pub name: String,
    pub description: Option<String>,
    pub tender_id: Uuid,
    pub organization_id: Uuid,
    pub creator_id: Uuid,
}

impl Bid {
    pub fn new(params: NewBidParams, now: NaiveDateTime) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: params.name,
            description: params.description,
            status: BidStatus::Created,
            tender_id: params.tender_id,
            organization_id: params.organization_id,
            creator_id: params.creator_id,
            version: 1,
            approved_by: ApprovalSet::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

impl Versioned for Bid {
    type Patch = BidPatch;
    type Snapshot = BidHistory;

    const KIND: &'static str = "bid";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn snapshot(&self) -> BidHistory {
        BidHistory {
            bid_id: self.id,
            version: self.version,
            name: self.name.clone(),
            description: self.description.clone(),
            status: self.status,
            recorded_at: self.updated_at,
        }
    }

    fn apply_patch(&mut self, patch: BidPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }

    /// Approvals are not part of the snapshot and survive a rollback.
    fn restore(&mut self, snapshot: &BidHistory) {
        self.name = snapshot.name.clone();
        self.description = snapshot.description.clone();
        self.status = snapshot.status;
    }

    fn advance(&mut self, now: NaiveDateTime) {
        self.version += 1;
        self.updated_at = now;
    }
}

impl EntityStore<Bid> for PgConnection {
    fn lock(&mut self, id: Uuid) -> ServiceResult<Option<Bid>> {
        bids::table
            .find(id)
            .for_update()
            .first::<BidRow>(self)
            .optional()?
            .map(Bid::try_from)
            .transpose()
    }

    fn insert(&mut self, entity: &Bid) -> ServiceResult<()> {
        diesel::insert_into(bids::table)
            .values(BidRecord::from(entity))
            .execute(self)?;
        Ok(())
    }

    fn save(&mut self, entity: &Bid) -> ServiceResult<()> {
        diesel::update(bids::table.find(entity.id))
            .set(BidRecord::from(entity))
            .execute(self)?;
        Ok(())
    }
}
