use axum::http::HeaderValue;
use axum::{
    routing::{get, patch, post, put},
    Router,
};
use chrono::{DateTime, NaiveDateTime, Utc};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub mod bids;
pub mod directory;
pub mod health;
pub mod tenders;

pub fn create_router(state: AppState) -> Router<()> {
    let cors = if let Some(origins) = state.config.cors_allowed_origin.as_ref() {
        let headers: Vec<HeaderValue> = origins
            .split(',')
            .filter_map(|value| {
                let trimmed = value.trim();
                if trimmed.is_empty() {
                    return None;
                }
                match trimmed.parse::<HeaderValue>() {
                    Ok(header) => Some(header),
                    Err(_) => {
                        tracing::warn!(origin = %trimmed, "ignoring invalid CORS origin");
                        None
                    }
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(AllowOrigin::list(headers))
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
    } else {
        CorsLayer::new()
            .allow_origin(AllowOrigin::mirror_request())
            .allow_methods(tower_http::cors::AllowMethods::mirror_request())
            .allow_headers(tower_http::cors::AllowHeaders::mirror_request())
    };

    let tenders_routes = Router::new()
        .route("/", get(tenders::list_tenders))
        .route("/new", post(tenders::create_tender))
        .route("/my", get(tenders::list_my_tenders))
        .route("/:id/edit", patch(tenders::edit_tender))
        .route("/:id/rollback/:version", put(tenders::rollback_tender))
        .route("/:id/history", get(tenders::tender_history));

    let bids_routes = Router::new()
        .route("/new", post(bids::create_bid))
        .route("/my", get(bids::list_my_bids))
        .route("/:id/list", get(bids::list_bids_for_tender))
        .route("/:id/edit", patch(bids::edit_bid))
        .route("/:id/rollback/:version", put(bids::rollback_bid))
        .route("/:id/decision", post(bids::decide_bid))
        .route("/:id/approved_by", get(bids::approved_by))
        .route("/:id/history", get(bids::bid_history));

    Router::new()
        .nest("/api/tenders", tenders_routes)
        .nest("/api/bids", bids_routes)
        .route("/api/employees", get(directory::list_employees))
        .route("/api/organizations", get(directory::list_organizations))
        .route("/api/ping", get(health::ping))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub(crate) fn to_iso(dt: NaiveDateTime) -> String {
    DateTime::<Utc>::from_naive_utc_and_offset(dt, Utc).to_rfc3339()
}
