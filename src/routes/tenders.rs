use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::to_iso;
use crate::error::AppResult;
use crate::models::{Tender, TenderHistory};
use crate::services::tenders::{self as service, CreateTender};
use crate::state::AppState;
use crate::status::TenderStatus;
use crate::store::TenderPatch;

#[derive(Deserialize)]
pub struct CreateTenderRequest {
    pub name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub organization_id: Uuid,
    pub creator_username: String,
}

#[derive(Deserialize)]
pub struct EditTenderRequest {
    pub username: String,
    #[serde(flatten)]
    pub patch: TenderPatch,
}

#[derive(Deserialize)]
pub struct ListTendersQuery {
    pub service_type: Option<String>,
    pub username: Option<String>,
}

#[derive(Deserialize)]
pub struct UsernameQuery {
    pub username: String,
}

#[derive(Serialize)]
pub struct TenderResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub status: TenderStatus,
    pub organization_id: Uuid,
    pub version: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct TenderHistoryResponse {
    pub version: i32,
    pub name: String,
    pub description: Option<String>,
    pub service_type: String,
    pub status: TenderStatus,
    pub recorded_at: String,
}

pub async fn list_tenders(
    State(state): State<AppState>,
    Query(query): Query<ListTendersQuery>,
) -> AppResult<Json<Vec<TenderResponse>>> {
    let mut conn = state.db()?;
    let tenders = service::list_tenders(
        &mut conn,
        query.service_type.as_deref(),
        query.username.as_deref(),
    )?;
    Ok(Json(tenders.into_iter().map(to_tender_response).collect()))
}

pub async fn create_tender(
    State(state): State<AppState>,
    Json(payload): Json<CreateTenderRequest>,
) -> AppResult<(StatusCode, Json<TenderResponse>)> {
    let mut conn = state.db()?;
    let tender = service::create_tender(
        &mut conn,
        CreateTender {
            name: payload.name,
            description: payload.description,
            service_type: payload.service_type,
            organization_id: payload.organization_id,
            creator_username: payload.creator_username,
        },
    )?;
    Ok((StatusCode::CREATED, Json(to_tender_response(tender))))
}

pub async fn list_my_tenders(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<Vec<TenderResponse>>> {
    let mut conn = state.db()?;
    let tenders = service::list_my_tenders(&mut conn, &query.username)?;
    Ok(Json(tenders.into_iter().map(to_tender_response).collect()))
}

pub async fn edit_tender(
    State(state): State<AppState>,
    Path(tender_id): Path<Uuid>,
    Json(payload): Json<EditTenderRequest>,
) -> AppResult<Json<TenderResponse>> {
    let mut conn = state.db()?;
    let tender = service::update_tender(&mut conn, tender_id, &payload.username, payload.patch)?;
    Ok(Json(to_tender_response(tender)))
}

pub async fn rollback_tender(
    State(state): State<AppState>,
    Path((tender_id, version)): Path<(Uuid, i32)>,
) -> AppResult<Json<TenderResponse>> {
    let mut conn = state.db()?;
    let tender = service::rollback_tender(&mut conn, tender_id, version)?;
    Ok(Json(to_tender_response(tender)))
}

pub async fn tender_history(
    State(state): State<AppState>,
    Path(tender_id): Path<Uuid>,
) -> AppResult<Json<Vec<TenderHistoryResponse>>> {
    let mut conn = state.db()?;
    let entries = service::tender_history(&mut conn, tender_id)?;
    Ok(Json(entries.into_iter().map(to_history_response).collect()))
}

fn to_tender_response(tender: Tender) -> TenderResponse {
    TenderResponse {
        id: tender.id,
        name: tender.name,
        description: tender.description,
        service_type: tender.service_type,
        status: tender.status,
        organization_id: tender.organization_id,
        version: tender.version,
        created_at: to_iso(tender.created_at),
        updated_at: to_iso(tender.updated_at),
    }
}

fn to_history_response(entry: TenderHistory) -> TenderHistoryResponse {
    TenderHistoryResponse {
        version: entry.version,
        name: entry.name,
        description: entry.description,
        service_type: entry.service_type,
        status: entry.status,
        recorded_at: to_iso(entry.recorded_at),
    }
}
