use chrono::Utc;
use diesel::dsl::exists;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

use super::tenders::{get_tender, require_employee};
use super::{optional_text, required_text, DESCRIPTION_MAX_LEN, NAME_MAX_LEN};
use crate::approvals::ApprovalSet;
use crate::decision::{DecisionOutcome, QuorumRule};
use crate::error::{ServiceError, ServiceResult};
use crate::ledger::HistoryLedger;
use crate::models::{Bid, BidHistory, BidRow};
use crate::policy;
use crate::schema::{bids, organization};
use crate::status::Decision;
use crate::store::bids::NewBidParams;
use crate::store::{self, BidPatch, Versioned};

#[derive(Debug, Clone)]
pub struct CreateBid {
    pub name: String,
    pub description: Option<String>,
    pub tender_id: Uuid,
    pub organization_id: Uuid,
    pub creator_username: String,
}

pub fn create_bid(conn: &mut PgConnection, input: CreateBid) -> ServiceResult<Bid> {
    let name = required_text("name", &input.name, NAME_MAX_LEN)?;
    let description = optional_text("description", input.description, DESCRIPTION_MAX_LEN)?;
    let now = Utc::now().naive_utc();

    conn.transaction::<_, ServiceError, _>(|conn| {
        let creator = policy::find_employee(conn, &input.creator_username)?.ok_or_else(|| {
            ServiceError::validation(format!("employee '{}' not found", input.creator_username))
        })?;
        get_tender(conn, input.tender_id)?;

        let organization_exists: bool = diesel::select(exists(
            organization::table.filter(organization::id.eq(input.organization_id)),
        ))
        .get_result(conn)?;
        if !organization_exists {
            return Err(ServiceError::validation("organization does not exist"));
        }

        let allowed = policy::is_responsible_for_organization(conn, creator.id, input.organization_id)?
            || policy::is_author_of_tender(conn, input.tender_id, creator.id)?;
        if !allowed {
            warn!(
                username = %creator.username,
                organization_id = %input.organization_id,
                tender_id = %input.tender_id,
                "bid creation denied"
            );
            return Err(ServiceError::permission("user may not submit bids for this organization"));
        }

        let bid = Bid::new(
            NewBidParams {
                name,
                description,
                tender_id: input.tender_id,
                organization_id: input.organization_id,
                creator_id: creator.id,
            },
            now,
        );
        let bid = store::create(conn, bid)?;
        info!(bid_id = %bid.id, tender_id = %bid.tender_id, username = %creator.username, "bid created");
        Ok(bid)
    })
}

pub fn update_bid(
    conn: &mut PgConnection,
    bid_id: Uuid,
    acting_username: &str,
    patch: BidPatch,
) -> ServiceResult<Bid> {
    let patch = BidPatch {
        name: patch
            .name
            .map(|name| required_text("name", &name, NAME_MAX_LEN))
            .transpose()?,
        description: optional_text("description", patch.description, DESCRIPTION_MAX_LEN)?,
        status: patch.status,
    };
    let now = Utc::now().naive_utc();

    conn.transaction::<_, ServiceError, _>(|conn| {
        let mut bid: Bid = store::load_for_update(conn, bid_id)?;
        let actor = require_employee(conn, acting_username)?;

        let allowed = bid.creator_id == actor.id
            || policy::is_responsible_for_organization(conn, actor.id, bid.organization_id)?;
        if !allowed {
            warn!(bid_id = %bid_id, username = %actor.username, "bid edit denied");
            return Err(ServiceError::permission("user may not edit this bid"));
        }

        bid.apply_patch(patch);
        let bid = store::record(conn, bid, now)?;
        info!(bid_id = %bid.id, version = bid.version, username = %actor.username, "bid updated");
        Ok(bid)
    })
}

pub fn rollback_bid(conn: &mut PgConnection, bid_id: Uuid, version: i32) -> ServiceResult<Bid> {
    let now = Utc::now().naive_utc();
    let bid: Bid =
        conn.transaction::<_, ServiceError, _>(|conn| store::rollback(conn, bid_id, version, now))?;
    info!(
        bid_id = %bid.id,
        restored_version = version,
        version = bid.version,
        "bid rolled back"
    );
    Ok(bid)
}

/// Records one approve/reject vote and publishes or cancels the bid when the
/// quorum rule says so.
pub fn decide_bid(
    conn: &mut PgConnection,
    bid_id: Uuid,
    username: &str,
    decision: Decision,
    rule: QuorumRule,
) -> ServiceResult<DecisionOutcome> {
    let now = Utc::now().naive_utc();

    conn.transaction::<_, ServiceError, _>(|conn| {
        let mut bid: Bid = store::load_for_update(conn, bid_id)?;
        if let Some(outcome) = rule.settled(&bid) {
            return Ok(outcome);
        }

        let employee = policy::find_employee(conn, username)?
            .ok_or_else(|| ServiceError::validation(format!("employee '{username}' not found")))?;
        if !policy::is_responsible_for_organization(conn, employee.id, bid.organization_id)? {
            warn!(bid_id = %bid_id, username = %username, "bid decision denied");
            return Err(ServiceError::permission(
                "user is not responsible for the bid's organization",
            ));
        }

        let outcome = rule.apply(&mut bid, username, decision)?;
        if outcome.is_mutation() {
            let bid = store::record(conn, bid, now)?;
            info!(
                bid_id = %bid.id,
                username = %username,
                decision = %decision,
                outcome = outcome.label(),
                approvals = bid.approve_decision_count(),
                quorum = rule.quorum(),
                version = bid.version,
                "bid decision recorded"
            );
        }
        Ok(outcome)
    })
}

pub fn get_bid(conn: &mut PgConnection, bid_id: Uuid) -> ServiceResult<Bid> {
    bids::table
        .find(bid_id)
        .first::<BidRow>(conn)
        .optional()?
        .ok_or_else(|| ServiceError::not_found(format!("bid {bid_id} not found")))
        .and_then(Bid::try_from)
}

pub fn approved_by(conn: &mut PgConnection, bid_id: Uuid) -> ServiceResult<ApprovalSet> {
    Ok(get_bid(conn, bid_id)?.approved_by)
}

pub fn list_my_bids(conn: &mut PgConnection, username: &str) -> ServiceResult<Vec<Bid>> {
    let Some(employee) = policy::find_employee(conn, username)? else {
        return Ok(Vec::new());
    };
    load_bids(
        conn,
        bids::table
            .filter(bids::creator_id.eq(employee.id))
            .order(bids::created_at.asc())
            .into_boxed(),
    )
}

pub fn list_bids_for_tender(conn: &mut PgConnection, tender_id: Uuid) -> ServiceResult<Vec<Bid>> {
    load_bids(
        conn,
        bids::table
            .filter(bids::tender_id.eq(tender_id))
            .order(bids::created_at.asc())
            .into_boxed(),
    )
}

pub fn bid_history(conn: &mut PgConnection, bid_id: Uuid) -> ServiceResult<Vec<BidHistory>> {
    get_bid(conn, bid_id)?;
    HistoryLedger::<BidHistory>::entries(conn, bid_id)
}

fn load_bids(
    conn: &mut PgConnection,
    query: bids::BoxedQuery<'_, diesel::pg::Pg>,
) -> ServiceResult<Vec<Bid>> {
    query
        .load::<BidRow>(conn)?
        .into_iter()
        .map(Bid::try_from)
        .collect()
}
