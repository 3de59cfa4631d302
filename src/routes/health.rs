use axum::{http::StatusCode, response::Json};

pub async fn ping() -> (StatusCode, Json<&'static str>) {
    (StatusCode::OK, Json("ok"))
}
