//! User rules: required name and email, email format, unique email.

use crate::error::AppError;
use crate::store::{Collection, Row, SharedStore};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, OnceLock};
use tokio::sync::Mutex;
use utoipa::ToSchema;

pub const COLLECTION: &str = "users";

/// Stored payload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Row<UserRecord>> for User {
    fn from(row: Row<UserRecord>) -> Self {
        User {
            id: row.id,
            name: row.data.name,
            email: row.data.email,
            created_at: row.data.created_at,
            updated_at: row.data.updated_at,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct NewUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

/// Fields left out keep their current value.
#[derive(Clone, Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
}

#[derive(Clone)]
pub struct UserService {
    users: Collection<UserRecord>,
    /// Serializes the uniqueness check with the write that follows it.
    write_lock: Arc<Mutex<()>>,
}

impl UserService {
    pub fn new(store: SharedStore) -> Self {
        UserService {
            users: Collection::new(store, COLLECTION),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn list(&self) -> Result<Vec<User>, AppError> {
        Ok(self.users.list().await?.into_iter().map(User::from).collect())
    }

    pub async fn get(&self, id: i64) -> Result<User, AppError> {
        Ok(self.users.require(id).await?.into())
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, AppError> {
        let email = email.trim();
        Ok(self
            .users
            .list()
            .await?
            .into_iter()
            .find(|row| row.data.email.eq_ignore_ascii_case(email))
            .map(User::from))
    }

    pub async fn create(&self, input: NewUser) -> Result<User, AppError> {
        let name = required(input.name, "name")?;
        let email = valid_email(required(input.email, "email")?)?;
        let _guard = self.write_lock.lock().await;
        self.ensure_email_free(&email, None).await?;
        let now = Utc::now();
        let row = self
            .users
            .insert(UserRecord {
                name,
                email,
                created_at: now,
                updated_at: now,
            })
            .await?;
        tracing::info!(user_id = row.id, "user registered");
        Ok(row.into())
    }

    pub async fn update(&self, id: i64, input: UpdateUser) -> Result<User, AppError> {
        let _guard = self.write_lock.lock().await;
        let mut record = self.users.require(id).await?.data;
        if let Some(name) = input.name {
            record.name = required(Some(name), "name")?;
        }
        if let Some(email) = input.email {
            let email = valid_email(required(Some(email), "email")?)?;
            self.ensure_email_free(&email, Some(id)).await?;
            record.email = email;
        }
        record.updated_at = Utc::now();
        self.users
            .update(id, record)
            .await?
            .map(User::from)
            .ok_or_else(|| AppError::NotFound(format!("{} {}", COLLECTION, id)))
    }

    pub async fn delete(&self, id: i64) -> Result<(), AppError> {
        if self.users.delete(id).await? {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("{} {}", COLLECTION, id)))
        }
    }

    pub async fn count(&self) -> Result<u64, AppError> {
        self.users.count().await
    }

    async fn ensure_email_free(&self, email: &str, except: Option<i64>) -> Result<(), AppError> {
        match self.find_by_email(email).await? {
            Some(existing) if Some(existing.id) != except => {
                Err(AppError::Conflict(format!("email already registered: {}", email)))
            }
            _ => Ok(()),
        }
    }
}

fn required(value: Option<String>, field: &str) -> Result<String, AppError> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(AppError::Validation(format!("{} is required", field))),
    }
}

fn valid_email(email: String) -> Result<String, AppError> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    let re = EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
        .ok_or_else(|| AppError::Internal("email pattern failed to compile".into()))?;
    if re.is_match(&email) {
        Ok(email)
    } else {
        Err(AppError::Validation(format!("invalid email: {}", email)))
    }
}
