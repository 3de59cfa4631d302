use std::env;

use anyhow::{anyhow, Context, Result};
use axum::body::Body;
use axum::http::{Method, Request};
use axum::Router;
use diesel::connection::SimpleConnection;
use diesel::prelude::*;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use http_body_util::BodyExt;
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tendering::config::AppConfig;
use tendering::db::{self, PgPool, MIGRATIONS};
use tendering::decision::DEFAULT_APPROVAL_QUORUM;
use tendering::models::{NewEmployee, NewOrganization, OrganizationResponsible};
use tendering::routes;
use tendering::schema::{employee, organization, organization_responsible};
use tendering::state::AppState;
use tokio::sync::Mutex;
use tower::util::ServiceExt;
use uuid::Uuid;

static DB_LOCK: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let database_url = env::var("TEST_DATABASE_URL")
            .context("TEST_DATABASE_URL must be set for integration tests")?;

        let config = AppConfig {
            database_url: database_url.clone(),
            database_max_pool_size: 6,
            server_host: "127.0.0.1".to_string(),
            server_port: 0,
            cors_allowed_origin: None,
            approval_quorum: DEFAULT_APPROVAL_QUORUM,
        };

        let pool = db::init_pool_with_size(&config.database_url, config.database_max_pool_size)?;
        prepare_database(&pool).await?;

        let state = AppState::new(pool, config);
        let router = routes::create_router(state.clone());

        Ok(Self { state, router })
    }

    pub async fn cleanup(&self) -> Result<()> {
        self.with_conn(truncate_all).await
    }

    pub async fn insert_employee(&self, username: &str) -> Result<Uuid> {
        let username = username.to_string();
        self.with_conn(move |conn| {
            let new_employee = NewEmployee {
                id: Uuid::new_v4(),
                username,
                first_name: None,
                last_name: None,
            };
            diesel::insert_into(employee::table)
                .values(&new_employee)
                .execute(conn)
                .context("failed to insert employee")?;
            Ok(new_employee.id)
        })
        .await
    }

    pub async fn insert_organization(&self, name: &str) -> Result<Uuid> {
        let name = name.to_string();
        self.with_conn(move |conn| {
            let new_organization = NewOrganization {
                id: Uuid::new_v4(),
                name,
                description: None,
                organization_type: "LLC".to_string(),
            };
            diesel::insert_into(organization::table)
                .values(&new_organization)
                .execute(conn)
                .context("failed to insert organization")?;
            Ok(new_organization.id)
        })
        .await
    }

    pub async fn make_responsible(&self, organization_id: Uuid, user_id: Uuid) -> Result<()> {
        self.with_conn(move |conn| {
            diesel::insert_into(organization_responsible::table)
                .values(&OrganizationResponsible {
                    organization_id,
                    user_id,
                })
                .execute(conn)
                .context("failed to assign responsibility")?;
            Ok(())
        })
        .await
    }

    /// Inserts an organization with one responsible employee per username.
    pub async fn organization_with(&self, name: &str, usernames: &[&str]) -> Result<Uuid> {
        let organization_id = self.insert_organization(name).await?;
        for username in usernames {
            let user_id = self.insert_employee(username).await?;
            self.make_responsible(organization_id, user_id).await?;
        }
        Ok(organization_id)
    }

    #[allow(dead_code)]
    pub async fn ledger_versions(&self, table: &'static str, owner_id: Uuid) -> Result<Vec<i32>> {
        self.with_conn(move |conn| {
            #[derive(QueryableByName)]
            struct VersionRow {
                #[diesel(sql_type = diesel::sql_types::Int4)]
                version: i32,
            }

            let owner_column = match table {
                "tender_history" => "tender_id",
                "bid_history" => "bid_id",
                other => return Err(anyhow!("unknown ledger table {other}")),
            };
            let rows: Vec<VersionRow> = diesel::sql_query(format!(
                "SELECT version FROM {table} WHERE {owner_column} = $1 ORDER BY version"
            ))
            .bind::<diesel::sql_types::Uuid, _>(owner_id)
            .load(conn)
            .context("failed to load ledger versions")?;
            Ok(rows.into_iter().map(|row| row.version).collect())
        })
        .await
    }

    pub async fn request_json<T: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        payload: Option<&T>,
    ) -> Result<hyper::Response<Body>> {
        let mut builder = Request::builder().method(method).uri(path);
        let body = match payload {
            Some(payload) => {
                builder = builder.header("content-type", "application/json");
                Body::from(serde_json::to_vec(payload)?)
            }
            None => Body::empty(),
        };
        let request = builder.body(body)?;
        Ok(self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("infallible response"))
    }

    pub async fn post_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.request_json(Method::POST, path, Some(payload)).await
    }

    #[allow(dead_code)]
    pub async fn patch_json<T: Serialize + ?Sized>(
        &self,
        path: &str,
        payload: &T,
    ) -> Result<hyper::Response<Body>> {
        self.request_json(Method::PATCH, path, Some(payload)).await
    }

    #[allow(dead_code)]
    pub async fn put(&self, path: &str) -> Result<hyper::Response<Body>> {
        self.request_json::<()>(Method::PUT, path, None).await
    }

    #[allow(dead_code)]
    pub async fn post(&self, path: &str) -> Result<hyper::Response<Body>> {
        self.request_json::<()>(Method::POST, path, None).await
    }

    pub async fn get(&self, path: &str) -> Result<hyper::Response<Body>> {
        self.request_json::<()>(Method::GET, path, None).await
    }

    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut PgConnection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.state.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|err| anyhow!("failed to get database connection: {err}"))?;
            f(&mut conn)
        })
        .await
        .context("connection task panicked")?
    }
}

pub async fn acquire_db_lock() -> tokio::sync::MutexGuard<'static, ()> {
    DB_LOCK.lock().await
}

pub async fn body_to_vec(body: Body) -> Result<Vec<u8>> {
    let collected = body
        .collect()
        .await
        .map_err(|err| anyhow!("failed to read response body: {err}"))?;
    Ok(collected.to_bytes().to_vec())
}

pub async fn body_json<T: DeserializeOwned>(response: hyper::Response<Body>) -> Result<T> {
    let body = body_to_vec(response.into_body()).await?;
    serde_json::from_slice(&body).with_context(|| {
        format!(
            "unexpected response body: {}",
            String::from_utf8_lossy(&body)
        )
    })
}

async fn prepare_database(pool: &PgPool) -> Result<()> {
    let pool = pool.clone();
    tokio::task::spawn_blocking(move || -> Result<()> {
        let mut conn = pool
            .get()
            .map_err(|err| anyhow!("failed to acquire connection: {err}"))?;
        conn.run_pending_migrations(MIGRATIONS)
            .map_err(|err| anyhow!("failed to run migrations: {err}"))?;
        truncate_all(&mut conn)?;
        Ok(())
    })
    .await
    .context("migration task panicked")?
}

fn truncate_all(conn: &mut PgConnection) -> Result<()> {
    conn.batch_execute(
        "TRUNCATE TABLE bid_history, bids, tender_history, tenders, organization_responsible, organization, employee RESTART IDENTITY CASCADE;",
    )
    .context("failed to truncate tables")?;
    Ok(())
}
