use axum::{
    extract::{Query, State},
    Json,
};

use crate::error::AppResult;
use crate::models::{Employee, Organization};
use crate::services::{directory, Pagination};
use crate::state::AppState;

pub async fn list_employees(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Employee>>> {
    let mut conn = state.db()?;
    Ok(Json(directory::list_employees(&mut conn, page)?))
}

pub async fn list_organizations(
    State(state): State<AppState>,
    Query(page): Query<Pagination>,
) -> AppResult<Json<Vec<Organization>>> {
    let mut conn = state.db()?;
    Ok(Json(directory::list_organizations(&mut conn, page)?))
}
