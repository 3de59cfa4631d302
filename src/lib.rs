pub mod approvals;
pub mod config;
pub mod db;
pub mod decision;
pub mod error;
pub mod ledger;
pub mod models;
pub mod policy;
pub mod routes;
pub mod schema;
pub mod services;
pub mod state;
pub mod status;
pub mod store;
