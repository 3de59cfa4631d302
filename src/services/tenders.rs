use chrono::Utc;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use tracing::{info, warn};
use uuid::Uuid;

use super::{optional_text, required_text, DESCRIPTION_MAX_LEN, NAME_MAX_LEN, SERVICE_TYPE_MAX_LEN};
use crate::error::{ServiceError, ServiceResult};
use crate::ledger::HistoryLedger;
use crate::models::{Employee, Tender, TenderHistory, TenderRow};
use crate::policy;
use crate::schema::tenders;
use crate::status::TenderStatus;
use crate::store::{self, TenderPatch, Versioned};

#[derive(Debug, Clone)]
pub struct CreateTender {
    pub name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub organization_id: Uuid,
    pub creator_username: String,
}

pub fn create_tender(conn: &mut PgConnection, input: CreateTender) -> ServiceResult<Tender> {
    let name = required_text("name", &input.name, NAME_MAX_LEN)?;
    let service_type = required_text("service_type", &input.service_type, SERVICE_TYPE_MAX_LEN)?;
    let description = optional_text("description", input.description, DESCRIPTION_MAX_LEN)?;
    let now = Utc::now().naive_utc();

    conn.transaction::<_, ServiceError, _>(|conn| {
        let creator = policy::find_employee(conn, &input.creator_username)?.ok_or_else(|| {
            ServiceError::validation(format!("employee '{}' not found", input.creator_username))
        })?;

        if !policy::is_responsible_for_organization(conn, creator.id, input.organization_id)? {
            warn!(
                username = %creator.username,
                organization_id = %input.organization_id,
                "tender creation denied"
            );
            return Err(ServiceError::permission(
                "user is not responsible for the organization",
            ));
        }

        let tender = Tender::new(name, description, service_type, input.organization_id, now);
        let tender = store::create(conn, tender)?;
        info!(tender_id = %tender.id, username = %creator.username, "tender created");
        Ok(tender)
    })
}

pub fn update_tender(
    conn: &mut PgConnection,
    tender_id: Uuid,
    acting_username: &str,
    patch: TenderPatch,
) -> ServiceResult<Tender> {
    let patch = validate_patch(patch)?;
    let now = Utc::now().naive_utc();

    conn.transaction::<_, ServiceError, _>(|conn| {
        let mut tender: Tender = store::load_for_update(conn, tender_id)?;
        let actor = require_employee(conn, acting_username)?;

        ensure_responsible(conn, &actor, tender.organization_id)?;
        if let Some(target) = patch.organization_id {
            if target != tender.organization_id {
                ensure_responsible(conn, &actor, target)?;
            }
        }

        tender.apply_patch(patch);
        let tender = store::record(conn, tender, now)?;
        info!(
            tender_id = %tender.id,
            version = tender.version,
            username = %actor.username,
            "tender updated"
        );
        Ok(tender)
    })
}

pub fn rollback_tender(
    conn: &mut PgConnection,
    tender_id: Uuid,
    version: i32,
) -> ServiceResult<Tender> {
    let now = Utc::now().naive_utc();
    let tender: Tender =
        conn.transaction::<_, ServiceError, _>(|conn| store::rollback(conn, tender_id, version, now))?;
    info!(
        tender_id = %tender.id,
        restored_version = version,
        version = tender.version,
        "tender rolled back"
    );
    Ok(tender)
}

pub fn get_tender(conn: &mut PgConnection, tender_id: Uuid) -> ServiceResult<Tender> {
    tenders::table
        .find(tender_id)
        .first::<TenderRow>(conn)
        .optional()?
        .ok_or_else(|| ServiceError::not_found(format!("tender {tender_id} not found")))
        .and_then(Tender::try_from)
}

/// Published tenders, plus every tender owned by an organization the user is
/// responsible for when a username is given.
pub fn list_tenders(
    conn: &mut PgConnection,
    service_type: Option<&str>,
    username: Option<&str>,
) -> ServiceResult<Vec<Tender>> {
    let published = tenders::status.eq(TenderStatus::Published.as_str());
    let mut query = tenders::table.into_boxed();

    query = match username {
        None => query.filter(published),
        Some(username) => {
            let organization_ids = match policy::find_employee(conn, username)? {
                Some(employee) => policy::responsible_organization_ids(conn, employee.id)?,
                None => Vec::new(),
            };
            query.filter(published.or(tenders::organization_id.eq_any(organization_ids)))
        }
    };

    if let Some(service_type) = service_type {
        query = query.filter(tenders::service_type.eq(service_type.to_string()));
    }

    load_tenders(conn, query.order(tenders::created_at.asc()))
}

pub fn list_my_tenders(conn: &mut PgConnection, username: &str) -> ServiceResult<Vec<Tender>> {
    let Some(employee) = policy::find_employee(conn, username)? else {
        return Ok(Vec::new());
    };
    let organization_ids = policy::responsible_organization_ids(conn, employee.id)?;
    load_tenders(
        conn,
        tenders::table
            .filter(tenders::organization_id.eq_any(organization_ids))
            .order(tenders::created_at.asc())
            .into_boxed(),
    )
}

pub fn tender_history(
    conn: &mut PgConnection,
    tender_id: Uuid,
) -> ServiceResult<Vec<TenderHistory>> {
    get_tender(conn, tender_id)?;
    HistoryLedger::<TenderHistory>::entries(conn, tender_id)
}

fn load_tenders(
    conn: &mut PgConnection,
    query: tenders::BoxedQuery<'_, diesel::pg::Pg>,
) -> ServiceResult<Vec<Tender>> {
    query
        .load::<TenderRow>(conn)?
        .into_iter()
        .map(Tender::try_from)
        .collect()
}

fn validate_patch(patch: TenderPatch) -> ServiceResult<TenderPatch> {
    Ok(TenderPatch {
        name: patch
            .name
            .map(|name| required_text("name", &name, NAME_MAX_LEN))
            .transpose()?,
        description: optional_text("description", patch.description, DESCRIPTION_MAX_LEN)?,
        service_type: patch
            .service_type
            .map(|value| required_text("service_type", &value, SERVICE_TYPE_MAX_LEN))
            .transpose()?,
        status: patch.status,
        organization_id: patch.organization_id,
    })
}

pub(super) fn require_employee(conn: &mut PgConnection, username: &str) -> ServiceResult<Employee> {
    policy::find_employee(conn, username)?
        .ok_or_else(|| ServiceError::not_found(format!("employee '{username}' not found")))
}

fn ensure_responsible(
    conn: &mut PgConnection,
    actor: &Employee,
    organization_id: Uuid,
) -> ServiceResult<()> {
    if policy::is_responsible_for_organization(conn, actor.id, organization_id)? {
        return Ok(());
    }
    warn!(
        username = %actor.username,
        organization_id = %organization_id,
        "tender edit denied"
    );
    Err(ServiceError::permission(
        "user is not responsible for the tender's organization",
    ))
}

