//! Append-only history of tender and bid snapshots.
//!
//! Entries are keyed by `(owner id, version)`. There is no update or delete
//! path; an entry must be appended in the same transaction as the state
//! change it records.

use diesel::pg::PgConnection;
use diesel::prelude::*;
use uuid::Uuid;

use crate::error::ServiceResult;
use crate::models::{
    BidHistory, BidHistoryRow, NewBidHistory, NewTenderHistory, TenderHistory, TenderHistoryRow,
};
use crate::schema::{bid_history, tender_history};

pub trait LedgerEntry {
    fn owner_id(&self) -> Uuid;
    fn version(&self) -> i32;
}

impl LedgerEntry for TenderHistory {
    fn owner_id(&self) -> Uuid {
        self.tender_id
    }

    fn version(&self) -> i32 {
        self.version
    }
}

impl LedgerEntry for BidHistory {
    fn owner_id(&self) -> Uuid {
        self.bid_id
    }

    fn version(&self) -> i32 {
        self.version
    }
}

pub trait HistoryLedger<S: LedgerEntry> {
    fn append(&mut self, entry: &S) -> ServiceResult<()>;

    fn find(&mut self, owner_id: Uuid, version: i32) -> ServiceResult<Option<S>>;

    /// All entries for one owner in ascending version order.
    fn entries(&mut self, owner_id: Uuid) -> ServiceResult<Vec<S>>;
}

impl HistoryLedger<TenderHistory> for PgConnection {
    fn append(&mut self, entry: &TenderHistory) -> ServiceResult<()> {
        diesel::insert_into(tender_history::table)
            .values(NewTenderHistory::from(entry))
            .execute(self)?;
        Ok(())
    }

    fn find(&mut self, owner_id: Uuid, version: i32) -> ServiceResult<Option<TenderHistory>> {
        tender_history::table
            .filter(tender_history::tender_id.eq(owner_id))
            .filter(tender_history::version.eq(version))
            .first::<TenderHistoryRow>(self)
            .optional()?
            .map(TenderHistory::try_from)
            .transpose()
    }

    fn entries(&mut self, owner_id: Uuid) -> ServiceResult<Vec<TenderHistory>> {
        tender_history::table
            .filter(tender_history::tender_id.eq(owner_id))
            .order(tender_history::version.asc())
            .load::<TenderHistoryRow>(self)?
            .into_iter()
            .map(TenderHistory::try_from)
            .collect()
    }
}

impl HistoryLedger<BidHistory> for PgConnection {
    fn append(&mut self, entry: &BidHistory) -> ServiceResult<()> {
        diesel::insert_into(bid_history::table)
            .values(NewBidHistory::from(entry))
            .execute(self)?;
        Ok(())
    }

    fn find(&mut self, owner_id: Uuid, version: i32) -> ServiceResult<Option<BidHistory>> {
        bid_history::table
            .filter(bid_history::bid_id.eq(owner_id))
            .filter(bid_history::version.eq(version))
            .first::<BidHistoryRow>(self)
            .optional()?
            .map(BidHistory::try_from)
            .transpose()
    }

    fn entries(&mut self, owner_id: Uuid) -> ServiceResult<Vec<BidHistory>> {
        bid_history::table
            .filter(bid_history::bid_id.eq(owner_id))
            .order(bid_history::version.asc())
            .load::<BidHistoryRow>(self)?
            .into_iter()
            .map(BidHistory::try_from)
            .collect()
    }
}
