use std::env;

use anyhow::{anyhow, bail, Context, Result};
use url::Url;

use crate::db::DEFAULT_MAX_POOL_SIZE;
use crate::decision::DEFAULT_APPROVAL_QUORUM;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_pool_size: u32,
    pub server_host: String,
    pub server_port: u16,
    pub cors_allowed_origin: Option<String>,
    pub approval_quorum: u32,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let database_url = resolve_database_url()?;
        let database_max_pool_size = env::var("DATABASE_MAX_POOL_SIZE")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(DEFAULT_MAX_POOL_SIZE);
        let (server_host, server_port) = match env::var("SERVER_ADDRESS") {
            Ok(address) => split_server_address(&address)?,
            Err(_) => {
                let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
                let port = env::var("SERVER_PORT")
                    .unwrap_or_else(|_| "8080".to_string())
                    .parse()
                    .context("SERVER_PORT must be a valid u16")?;
                (host, port)
            }
        };
        let cors_allowed_origin = env::var("CORS_ALLOWED_ORIGIN").ok();
        let approval_quorum = match env::var("BID_APPROVAL_QUORUM") {
            Ok(raw) => parse_quorum(&raw)?,
            Err(_) => DEFAULT_APPROVAL_QUORUM,
        };

        Ok(Self {
            database_url,
            database_max_pool_size,
            server_host,
            server_port,
            cors_allowed_origin,
            approval_quorum,
        })
    }

    pub fn redacted_database_url(&self) -> String {
        redact_database_url(&self.database_url)
    }
}

fn resolve_database_url() -> Result<String> {
    if let Ok(url) = env::var("DATABASE_URL") {
        return Ok(url);
    }
    if let Ok(url) = env::var("POSTGRES_CONN") {
        return Ok(url);
    }

    let username = env::var("POSTGRES_USERNAME")
        .context("DATABASE_URL, POSTGRES_CONN or POSTGRES_USERNAME must be set")?;
    let password = env::var("POSTGRES_PASSWORD").context("POSTGRES_PASSWORD must be set")?;
    let host = env::var("POSTGRES_HOST").context("POSTGRES_HOST must be set")?;
    let port = env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".to_string());
    let database = env::var("POSTGRES_DATABASE").context("POSTGRES_DATABASE must be set")?;
    build_database_url(&username, &password, &host, &port, &database)
}

fn build_database_url(
    username: &str,
    password: &str,
    host: &str,
    port: &str,
    database: &str,
) -> Result<String> {
    let port: u16 = port.parse().context("POSTGRES_PORT must be a valid u16")?;
    let mut url = Url::parse("postgres://localhost").context("invalid base database url")?;
    url.set_host(Some(host))
        .context("POSTGRES_HOST is not a valid host")?;
    url.set_port(Some(port))
        .map_err(|_| anyhow!("POSTGRES_PORT cannot be set on the database url"))?;
    url.set_username(username)
        .map_err(|_| anyhow!("POSTGRES_USERNAME cannot be set on the database url"))?;
    url.set_password(Some(password))
        .map_err(|_| anyhow!("POSTGRES_PASSWORD cannot be set on the database url"))?;
    url.set_path(&format!("/{database}"));
    Ok(url.to_string())
}

fn split_server_address(address: &str) -> Result<(String, u16)> {
    let (host, port) = address
        .rsplit_once(':')
        .context("SERVER_ADDRESS must look like host:port")?;
    let port = port
        .parse()
        .context("SERVER_ADDRESS port must be a valid u16")?;
    Ok((host.to_string(), port))
}

fn parse_quorum(raw: &str) -> Result<u32> {
    let quorum: u32 = raw
        .trim()
        .parse()
        .context("BID_APPROVAL_QUORUM must be a positive integer")?;
    if quorum == 0 {
        bail!("BID_APPROVAL_QUORUM must be at least 1");
    }
    Ok(quorum)
}

fn redact_database_url(raw: &str) -> String {
    match Url::parse(raw) {
        Ok(mut parsed) => {
            let _ = parsed.set_password(Some("*****"));
            parsed.to_string()
        }
        Err(_) => "***".to_string(),
    }
}
