//! Versioned current-state records for tenders and bids.
//!
//! Every mutation advances `version` by exactly one and appends the
//! post-mutation snapshot to the history ledger. Rollback never rewinds the
//! counter: it writes a new version whose content equals an older one. The
//! operations here do not open transactions themselves; callers run them
//! inside one so the state write and the ledger append commit together.

use chrono::NaiveDateTime;
use uuid::Uuid;

use crate::error::{ServiceError, ServiceResult};
use crate::ledger::{HistoryLedger, LedgerEntry};

pub mod bids;
pub mod tenders;

pub use bids::BidPatch;
pub use tenders::TenderPatch;

pub trait Versioned: Sized {
    type Patch;
    type Snapshot: LedgerEntry;

    const KIND: &'static str;

    fn id(&self) -> Uuid;

    fn version(&self) -> i32;

    fn snapshot(&self) -> Self::Snapshot;

    fn apply_patch(&mut self, patch: Self::Patch);

    /// Copies the content fields of a ledger snapshot into current state.
    fn restore(&mut self, snapshot: &Self::Snapshot);

    /// Bumps the version counter and the modification time.
    fn advance(&mut self, now: NaiveDateTime);
}

pub trait EntityStore<E: Versioned>: HistoryLedger<E::Snapshot> {
    /// Loads the current record and holds it for the rest of the transaction.
    fn lock(&mut self, id: Uuid) -> ServiceResult<Option<E>>;

    fn insert(&mut self, entity: &E) -> ServiceResult<()>;

    fn save(&mut self, entity: &E) -> ServiceResult<()>;
}

/// Stores a freshly built version-1 entity together with its first ledger row.
pub fn create<E, S>(store: &mut S, entity: E) -> ServiceResult<E>
where
    E: Versioned,
    S: EntityStore<E> + ?Sized,
{
    debug_assert_eq!(entity.version(), 1);
    store.insert(&entity)?;
    store.append(&entity.snapshot())?;
    Ok(entity)
}

pub fn load_for_update<E, S>(store: &mut S, id: Uuid) -> ServiceResult<E>
where
    E: Versioned,
    S: EntityStore<E> + ?Sized,
{
    store
        .lock(id)?
        .ok_or_else(|| ServiceError::not_found(format!("{} {id} not found", E::KIND)))
}

/// Persists an already-mutated entity as its next version.
pub fn record<E, S>(store: &mut S, mut entity: E, now: NaiveDateTime) -> ServiceResult<E>
where
    E: Versioned,
    S: EntityStore<E> + ?Sized,
{
    entity.advance(now);
    store.save(&entity)?;
    store.append(&entity.snapshot())?;
    Ok(entity)
}

pub fn update<E, S>(store: &mut S, id: Uuid, patch: E::Patch, now: NaiveDateTime) -> ServiceResult<E>
where
    E: Versioned,
    S: EntityStore<E> + ?Sized,
{
    let mut entity = load_for_update::<E, S>(store, id)?;
    entity.apply_patch(patch);
    record(store, entity, now)
}

pub fn rollback<E, S>(
    store: &mut S,
    id: Uuid,
    target_version: i32,
    now: NaiveDateTime,
) -> ServiceResult<E>
where
    E: Versioned,
    S: EntityStore<E> + ?Sized,
{
    let mut entity = load_for_update::<E, S>(store, id)?;
    let snapshot = store
        .find(id, target_version)?
        .ok_or(ServiceError::InvalidVersion {
            entity: E::KIND,
            id,
            version: target_version,
        })?;
    entity.restore(&snapshot);
    record(store, entity, now)
}
