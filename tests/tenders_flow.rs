mod common;

use anyhow::Result;
use axum::http::StatusCode;
use serde_json::{json, Value};

use common::{acquire_db_lock, body_json, TestApp};

async fn create_tender(app: &TestApp, organization_id: uuid::Uuid, creator: &str) -> Result<Value> {
    let response = app
        .post_json(
            "/api/tenders/new",
            &json!({
                "name": "Road repair",
                "description": "Patch potholes on Main St",
                "service_type": "Construction",
                "organization_id": organization_id,
                "creator_username": creator,
            }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[tokio::test]
async fn tender_versions_and_rollback_flow() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let organization_id = app.organization_with("City works", &["alice"]).await?;
    let tender = create_tender(&app, organization_id, "alice").await?;
    assert_eq!(tender["version"], 1);
    assert_eq!(tender["status"], "CREATED");
    let tender_id = tender["id"].as_str().unwrap().to_string();

    let response = app
        .patch_json(
            &format!("/api/tenders/{tender_id}/edit"),
            &json!({ "username": "alice", "name": "Bridge repair" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    let updated: Value = body_json(response).await?;
    assert_eq!(updated["version"], 2);
    assert_eq!(updated["name"], "Bridge repair");
    assert_eq!(updated["description"], "Patch potholes on Main St");

    let response = app.put(&format!("/api/tenders/{tender_id}/rollback/1")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let rolled_back: Value = body_json(response).await?;
    assert_eq!(rolled_back["version"], 3);
    assert_eq!(rolled_back["name"], "Road repair");

    let response = app.put(&format!("/api/tenders/{tender_id}/rollback/99")).await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .put(&format!("/api/tenders/{}/rollback/1", uuid::Uuid::new_v4()))
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get(&format!("/api/tenders/{tender_id}/history")).await?;
    assert_eq!(response.status(), StatusCode::OK);
    let history: Vec<Value> = body_json(response).await?;
    let versions: Vec<i64> = history
        .iter()
        .map(|entry| entry["version"].as_i64().unwrap())
        .collect();
    assert_eq!(versions, vec![1, 2, 3]);
    assert_eq!(history[2]["name"], history[0]["name"]);

    let tender_uuid = tender_id.parse()?;
    assert_eq!(app.ledger_versions("tender_history", tender_uuid).await?, vec![1, 2, 3]);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn tender_creation_checks_identity_and_responsibility() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let organization_id = app.organization_with("City works", &["alice"]).await?;
    app.insert_employee("mallory").await?;

    let response = app
        .post_json(
            "/api/tenders/new",
            &json!({
                "name": "Road repair",
                "service_type": "Construction",
                "organization_id": organization_id,
                "creator_username": "ghost",
            }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .post_json(
            "/api/tenders/new",
            &json!({
                "name": "Road repair",
                "service_type": "Construction",
                "organization_id": organization_id,
                "creator_username": "mallory",
            }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body: Value = body_json(response).await?;
    assert!(body["error"].is_string());

    let response = app
        .post_json(
            "/api/tenders/new",
            &json!({
                "name": "   ",
                "service_type": "Construction",
                "organization_id": organization_id,
                "creator_username": "alice",
            }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/api/tenders/my?username=alice").await?;
    let mine: Vec<Value> = body_json(response).await?;
    assert!(mine.is_empty());

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn tender_edit_requires_responsibility() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let organization_id = app.organization_with("City works", &["alice"]).await?;
    app.insert_employee("mallory").await?;
    let tender = create_tender(&app, organization_id, "alice").await?;
    let tender_id = tender["id"].as_str().unwrap().to_string();

    let response = app
        .patch_json(
            &format!("/api/tenders/{tender_id}/edit"),
            &json!({ "username": "mallory", "name": "Hijacked" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .patch_json(
            &format!("/api/tenders/{tender_id}/edit"),
            &json!({ "username": "ghost", "name": "Hijacked" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .patch_json(
            &format!("/api/tenders/{}/edit", uuid::Uuid::new_v4()),
            &json!({ "username": "alice", "name": "Nothing" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app.get(&format!("/api/tenders/{tender_id}/history")).await?;
    let history: Vec<Value> = body_json(response).await?;
    assert_eq!(history.len(), 1);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn tender_listing_filters_by_status_and_viewer() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    let organization_id = app.organization_with("City works", &["alice"]).await?;
    app.insert_employee("bob").await?;
    let draft = create_tender(&app, organization_id, "alice").await?;
    let published = create_tender(&app, organization_id, "alice").await?;
    let published_id = published["id"].as_str().unwrap().to_string();

    let response = app
        .patch_json(
            &format!("/api/tenders/{published_id}/edit"),
            &json!({ "username": "alice", "status": "PUBLISHED", "service_type": "Delivery" }),
        )
        .await?;
    assert_eq!(response.status(), StatusCode::OK);

    let public: Vec<Value> = body_json(app.get("/api/tenders").await?).await?;
    assert_eq!(public.len(), 1);
    assert_eq!(public[0]["id"], published["id"]);

    let for_bob: Vec<Value> = body_json(app.get("/api/tenders?username=bob").await?).await?;
    assert_eq!(for_bob.len(), 1);

    let for_alice: Vec<Value> = body_json(app.get("/api/tenders?username=alice").await?).await?;
    assert_eq!(for_alice.len(), 2);
    assert!(for_alice.iter().any(|tender| tender["id"] == draft["id"]));

    let construction: Vec<Value> =
        body_json(app.get("/api/tenders?username=alice&service_type=Construction").await?).await?;
    assert_eq!(construction.len(), 1);
    assert_eq!(construction[0]["id"], draft["id"]);

    let mine: Vec<Value> = body_json(app.get("/api/tenders/my?username=alice").await?).await?;
    assert_eq!(mine.len(), 2);

    app.cleanup().await?;
    Ok(())
}

#[tokio::test]
async fn directory_endpoints_page_results() -> Result<()> {
    let _lock = acquire_db_lock().await;
    let app = TestApp::new().await?;

    app.organization_with("City works", &["alice", "bob", "carol"]).await?;

    let response = app.get("/api/ping").await?;
    assert_eq!(response.status(), StatusCode::OK);

    let everyone: Vec<Value> = body_json(app.get("/api/employees").await?).await?;
    assert_eq!(everyone.len(), 3);

    let second_page: Vec<Value> =
        body_json(app.get("/api/employees?page=1&limit=2").await?).await?;
    assert_eq!(second_page.len(), 1);

    let organizations: Vec<Value> = body_json(app.get("/api/organizations").await?).await?;
    assert_eq!(organizations.len(), 1);
    assert_eq!(organizations[0]["name"], "City works");

    app.cleanup().await?;
    Ok(())
}
