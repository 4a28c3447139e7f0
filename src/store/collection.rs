//! Typed view of one collection. Payloads are (de)serialized with serde at the boundary.

use super::{Record, SharedStore};
use crate::error::AppError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::marker::PhantomData;

/// A record with its id flattened next to the payload fields: `{"id": 1, "name": ...}`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Row<T> {
    pub id: i64,
    #[serde(flatten)]
    pub data: T,
}

pub struct Collection<T> {
    store: SharedStore,
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Collection {
            store: self.store.clone(),
            name: self.name,
            _marker: PhantomData,
        }
    }
}

impl<T> Collection<T>
where
    T: Serialize + DeserializeOwned + Send,
{
    pub fn new(store: SharedStore, name: &'static str) -> Self {
        Collection {
            store,
            name,
            _marker: PhantomData,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    fn decode(&self, record: Record) -> Result<Row<T>, AppError> {
        Ok(Row {
            id: record.id,
            data: serde_json::from_value(record.payload)?,
        })
    }

    pub async fn insert(&self, data: T) -> Result<Row<T>, AppError> {
        let id = self.store.insert(self.name, serde_json::to_value(&data)?).await?;
        Ok(Row { id, data })
    }

    pub async fn get(&self, id: i64) -> Result<Option<Row<T>>, AppError> {
        match self.store.get(self.name, id).await? {
            Some(record) => Ok(Some(self.decode(record)?)),
            None => Ok(None),
        }
    }

    /// Like `get`, but a missing id is `AppError::NotFound`.
    pub async fn require(&self, id: i64) -> Result<Row<T>, AppError> {
        self.get(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("{} {}", self.name, id)))
    }

    pub async fn list(&self) -> Result<Vec<Row<T>>, AppError> {
        self.store
            .list(self.name)
            .await?
            .into_iter()
            .map(|record| self.decode(record))
            .collect()
    }

    /// Replace the payload of `id`; `None` when it does not exist.
    pub async fn update(&self, id: i64, data: T) -> Result<Option<Row<T>>, AppError> {
        if self.store.update(self.name, id, serde_json::to_value(&data)?).await? {
            Ok(Some(Row { id, data }))
        } else {
            Ok(None)
        }
    }

    pub async fn delete(&self, id: i64) -> Result<bool, AppError> {
        self.store.delete(self.name, id).await
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        self.store.count(self.name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use serde::Deserialize;
    use std::sync::Arc;

    #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
    struct Note {
        text: String,
    }

    #[tokio::test]
    async fn typed_rows_flatten_id() {
        let notes: Collection<Note> = Collection::new(Arc::new(MemoryStore::new()), "notes");
        let row = notes.insert(Note { text: "hi".into() }).await.unwrap();
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            serde_json::json!({ "id": 1, "text": "hi" })
        );
        assert_eq!(notes.require(1).await.unwrap().data.text, "hi");
        assert!(matches!(notes.require(2).await, Err(AppError::NotFound(_))));
        assert!(notes.update(2, Note { text: "x".into() }).await.unwrap().is_none());
    }
}
