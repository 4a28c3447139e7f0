//! In-process store: collections of JSON records behind a `RwLock`.

use super::{validate_collection_name, Record, Store};
use crate::error::AppError;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

#[derive(Default)]
struct CollectionData {
    next_id: i64,
    rows: BTreeMap<i64, Value>,
}

pub struct MemoryStore {
    collections: RwLock<HashMap<String, CollectionData>>,
    available: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore {
            collections: RwLock::new(HashMap::new()),
            available: AtomicBool::new(true),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    /// Simulate the backend going away (or coming back). While unavailable every call fails.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn check(&self, collection: &str) -> Result<(), AppError> {
        if !self.available.load(Ordering::SeqCst) {
            return Err(AppError::Store("memory store unavailable".into()));
        }
        validate_collection_name(collection)
    }

    fn poisoned() -> AppError {
        AppError::Store("memory store lock poisoned".into())
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn kind(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> Result<(), AppError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AppError::Store("memory store unavailable".into()))
        }
    }

    async fn insert(&self, collection: &str, payload: Value) -> Result<i64, AppError> {
        self.check(collection)?;
        let mut guard = self.collections.write().map_err(|_| Self::poisoned())?;
        let data = guard.entry(collection.to_string()).or_default();
        data.next_id += 1;
        let id = data.next_id;
        data.rows.insert(id, payload);
        Ok(id)
    }

    async fn get(&self, collection: &str, id: i64) -> Result<Option<Record>, AppError> {
        self.check(collection)?;
        let guard = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(guard
            .get(collection)
            .and_then(|data| data.rows.get(&id))
            .map(|payload| Record {
                id,
                payload: payload.clone(),
            }))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Record>, AppError> {
        self.check(collection)?;
        let guard = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(guard
            .get(collection)
            .map(|data| {
                data.rows
                    .iter()
                    .map(|(id, payload)| Record {
                        id: *id,
                        payload: payload.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn update(&self, collection: &str, id: i64, payload: Value) -> Result<bool, AppError> {
        self.check(collection)?;
        let mut guard = self.collections.write().map_err(|_| Self::poisoned())?;
        match guard.get_mut(collection).and_then(|data| data.rows.get_mut(&id)) {
            Some(slot) => {
                *slot = payload;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, collection: &str, id: i64) -> Result<bool, AppError> {
        self.check(collection)?;
        let mut guard = self.collections.write().map_err(|_| Self::poisoned())?;
        Ok(guard
            .get_mut(collection)
            .map(|data| data.rows.remove(&id).is_some())
            .unwrap_or(false))
    }

    async fn count(&self, collection: &str) -> Result<u64, AppError> {
        self.check(collection)?;
        let guard = self.collections.read().map_err(|_| Self::poisoned())?;
        Ok(guard.get(collection).map(|data| data.rows.len() as u64).unwrap_or(0))
    }
}
