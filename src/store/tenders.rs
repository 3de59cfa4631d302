use chrono::NaiveDateTime;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use serde::Deserialize;
use uuid::Uuid;

use super::{EntityStore, Versioned};
use crate::error::ServiceResult;
use crate::models::{Tender, TenderHistory, TenderRecord, TenderRow};
use crate::schema::tenders;
use crate::status::TenderStatus;

/// Fields of a tender edit; absent fields keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TenderPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub service_type: Option<String>,
    pub status: Option<TenderStatus>,
    pub organization_id: Option<Uuid>,
}

impl Tender {
    pub fn new(
        name: String,
        description: Option<String>,
        service_type: String,
        organization_id: Uuid,
        now: NaiveDateTime,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            description,
            service_type,
            status: TenderStatus::Created,
            organization_id,
            version: 1,
            created_at: now,
            updated_at: now,
        }
    }
}

impl Versioned for Tender {
    type Patch = TenderPatch;
    type Snapshot = TenderHistory;

    const KIND: &'static str = "tender";

    fn id(&self) -> Uuid {
        self.id
    }

    fn version(&self) -> i32 {
        self.version
    }

    fn snapshot(&self) -> TenderHistory {
        TenderHistory {
            tender_id: self.id,
            version: self.version,
            name: self.name.clone(),
            description: self.description.clone(),
            service_type: self.service_type.clone(),
            status: self.status,
            recorded_at: self.updated_at,
        }
    }

    fn apply_patch(&mut self, patch: TenderPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(service_type) = patch.service_type {
            self.service_type = service_type;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(organization_id) = patch.organization_id {
            self.organization_id = organization_id;
        }
    }

    fn restore(&mut self, snapshot: &TenderHistory) {
        self.name = snapshot.name.clone();
        self.description = snapshot.description.clone();
        self.service_type = snapshot.service_type.clone();
        self.status = snapshot.status;
    }

    fn advance(&mut self, now: NaiveDateTime) {
        self.version += 1;
        self.updated_at = now;
    }
}

impl EntityStore<Tender> for PgConnection {
    fn lock(&mut self, id: Uuid) -> ServiceResult<Option<Tender>> {
        tenders::table
            .find(id)
            .for_update()
            .first::<TenderRow>(self)
            .optional()?
            .map(Tender::try_from)
            .transpose()
    }

    fn insert(&mut self, entity: &Tender) -> ServiceResult<()> {
        diesel::insert_into(tenders::table)
            .values(TenderRecord::from(entity))
            .execute(self)?;
        Ok(())
    }

    fn save(&mut self, entity: &Tender) -> ServiceResult<()> {
        diesel::update(tenders::table.find(entity.id))
            .set(TenderRecord::from(entity))
            .execute(self)?;
        Ok(())
    }
}
