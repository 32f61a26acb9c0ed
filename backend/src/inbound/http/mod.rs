//! HTTP inbound adapter exposing the REST endpoints.

pub mod auth;
pub mod error;
pub mod follows;
pub mod health;
pub mod schemas;
pub mod sleep_feed;
pub mod sleep_records;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
