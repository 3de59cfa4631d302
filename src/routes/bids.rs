use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::tenders::UsernameQuery;
use super::to_iso;
use crate::approvals::ApprovalSet;
use crate::decision::DecisionOutcome;
use crate::error::AppResult;
use crate::models::{Bid, BidHistory};
use crate::services::bids::{self as service, CreateBid};
use crate::state::AppState;
use crate::status::{BidStatus, Decision};
use crate::store::BidPatch;

#[derive(Deserialize)]
pub struct CreateBidRequest {
    pub name: String,
    pub description: Option<String>,
    pub tender_id: Uuid,
    pub organization_id: Uuid,
    pub creator_username: String,
}

#[derive(Deserialize)]
pub struct EditBidRequest {
    pub username: String,
    #[serde(flatten)]
    pub patch: BidPatch,
}

#[derive(Deserialize)]
pub struct DecisionQuery {
    pub username: String,
    pub decision: Decision,
}

#[derive(Serialize)]
pub struct BidResponse {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub status: BidStatus,
    pub tender_id: Uuid,
    pub organization_id: Uuid,
    pub creator_id: Uuid,
    pub version: i32,
    pub approve_decision_count: i32,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct BidHistoryResponse {
    pub version: i32,
    pub name: String,
    pub description: Option<String>,
    pub status: BidStatus,
    pub recorded_at: String,
}

#[derive(Serialize)]
pub struct ApprovedByResponse {
    pub approved_by: ApprovalSet,
}

pub async fn create_bid(
    State(state): State<AppState>,
    Json(payload): Json<CreateBidRequest>,
) -> AppResult<(StatusCode, Json<BidResponse>)> {
    let mut conn = state.db()?;
    let bid = service::create_bid(
        &mut conn,
        CreateBid {
            name: payload.name,
            description: payload.description,
            tender_id: payload.tender_id,
            organization_id: payload.organization_id,
            creator_username: payload.creator_username,
        },
    )?;
    Ok((StatusCode::CREATED, Json(to_bid_response(bid))))
}

pub async fn list_my_bids(
    State(state): State<AppState>,
    Query(query): Query<UsernameQuery>,
) -> AppResult<Json<Vec<BidResponse>>> {
    let mut conn = state.db()?;
    let bids = service::list_my_bids(&mut conn, &query.username)?;
    Ok(Json(bids.into_iter().map(to_bid_response).collect()))
}

pub async fn list_bids_for_tender(
    State(state): State<AppState>,
    Path(tender_id): Path<Uuid>,
) -> AppResult<Json<Vec<BidResponse>>> {
    let mut conn = state.db()?;
    let bids = service::list_bids_for_tender(&mut conn, tender_id)?;
    Ok(Json(bids.into_iter().map(to_bid_response).collect()))
}

pub async fn edit_bid(
    State(state): State<AppState>,
    Path(bid_id): Path<Uuid>,
    Json(payload): Json<EditBidRequest>,
) -> AppResult<Json<BidResponse>> {
    let mut conn = state.db()?;
    let bid = service::update_bid(&mut conn, bid_id, &payload.username, payload.patch)?;
    Ok(Json(to_bid_response(bid)))
}

pub async fn rollback_bid(
    State(state): State<AppState>,
    Path((bid_id, version)): Path<(Uuid, i32)>,
) -> AppResult<Json<BidResponse>> {
    let mut conn = state.db()?;
    let bid = service::rollback_bid(&mut conn, bid_id, version)?;
    Ok(Json(to_bid_response(bid)))
}

pub async fn decide_bid(
    State(state): State<AppState>,
    Path(bid_id): Path<Uuid>,
    Query(query): Query<DecisionQuery>,
) -> AppResult<Json<DecisionOutcome>> {
    let mut conn = state.db()?;
    let outcome = service::decide_bid(
        &mut conn,
        bid_id,
        &query.username,
        query.decision,
        state.quorum,
    )?;
    Ok(Json(outcome))
}

pub async fn approved_by(
    State(state): State<AppState>,
    Path(bid_id): Path<Uuid>,
) -> AppResult<Json<ApprovedByResponse>> {
    let mut conn = state.db()?;
    let approved_by = service::approved_by(&mut conn, bid_id)?;
    Ok(Json(ApprovedByResponse { approved_by }))
}

pub async fn bid_history(
    State(state): State<AppState>,
    Path(bid_id): Path<Uuid>,
) -> AppResult<Json<Vec<BidHistoryResponse>>> {
    let mut conn = state.db()?;
    let entries = service::bid_history(&mut conn, bid_id)?;
    Ok(Json(entries.into_iter().map(to_history_response).collect()))
}

fn to_bid_response(bid: Bid) -> BidResponse {
    BidResponse {
        approve_decision_count: bid.approve_decision_count(),
        id: bid.id,
        name: bid.name,
        description: bid.description,
        status: bid.status,
        tender_id: bid.tender_id,
        organization_id: bid.organization_id,
        creator_id: bid.creator_id,
        version: bid.version,
        created_at: to_iso(bid.created_at),
        updated_at: to_iso(bid.updated_at),
    }
}

fn to_history_response(entry: BidHistory) -> BidHistoryResponse {
    BidHistoryResponse {
        version: entry.version,
        name: entry.name,
        description: entry.description,
        status: entry.status,
        recorded_at: to_iso(entry.recorded_at),
    }
}
