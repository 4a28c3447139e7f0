//! Narrow storage contract shared by plugins: JSON records keyed by an integer id, grouped in
//! named collections. Handles are injected into plugins at construction time.

mod collection;
mod memory;
mod postgres;

pub use collection::{Collection, Row};
pub use memory::MemoryStore;
pub use postgres::{connect_pg_store, PgStore};

use crate::error::AppError;
use async_trait::async_trait;
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, OnceLock};

/// A stored record: its id and the JSON payload as written.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: i64,
    pub payload: Value,
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend name for health output, e.g. "memory" or "postgres".
    fn kind(&self) -> &'static str;

    async fn ping(&self) -> Result<(), AppError>;

    /// Insert a payload and return the assigned id. Ids are positive and increase per collection.
    async fn insert(&self, collection: &str, payload: Value) -> Result<i64, AppError>;

    async fn get(&self, collection: &str, id: i64) -> Result<Option<Record>, AppError>;

    /// All records ordered by id.
    async fn list(&self, collection: &str) -> Result<Vec<Record>, AppError>;

    /// Replace the payload of an existing record. Returns false when the id does not exist.
    async fn update(&self, collection: &str, id: i64, payload: Value) -> Result<bool, AppError>;

    /// Returns false when the id does not exist.
    async fn delete(&self, collection: &str, id: i64) -> Result<bool, AppError>;

    async fn count(&self, collection: &str) -> Result<u64, AppError>;
}

pub type SharedStore = Arc<dyn Store>;

/// Collection names become table names in SQL backends, so they are restricted to
/// lowercase identifiers.
pub fn validate_collection_name(name: &str) -> Result<(), AppError> {
    static NAME: OnceLock<Option<Regex>> = OnceLock::new();
    let re = NAME
        .get_or_init(|| Regex::new(r"^[a-z][a-z0-9_]{0,62}$").ok())
        .as_ref()
        .ok_or_else(|| AppError::Internal("collection name pattern failed to compile".into()))?;
    if re.is_match(name) {
        Ok(())
    } else {
        Err(AppError::Internal(format!("invalid collection name: '{}'", name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collection_names_are_identifiers() {
        assert!(validate_collection_name("users").is_ok());
        assert!(validate_collection_name("order_products").is_ok());
        assert!(validate_collection_name("Users").is_err());
        assert!(validate_collection_name("users; drop table x").is_err());
        assert!(validate_collection_name("").is_err());
    }
}
