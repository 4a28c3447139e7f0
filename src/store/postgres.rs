//! PostgreSQL store: one JSONB record table per collection, all inside the schema named by
//! `MICROKERNEL_SCHEMA` (default `microkernel`). Tables are created on first use.

use super::{validate_collection_name, Record, Store};
use crate::error::{AppError, ConfigError};
use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{ConnectOptions, PgPool};
use std::collections::HashSet;
use std::str::FromStr;
use tokio::sync::RwLock;

pub struct PgStore {
    pool: PgPool,
    schema: String,
    ensured: RwLock<HashSet<String>>,
}

impl PgStore {
    /// Wrap an existing pool. `schema` must be a lowercase identifier.
    pub fn new(pool: PgPool, schema: &str) -> Result<Self, AppError> {
        validate_collection_name(schema).map_err(|_| ConfigError::InvalidValue {
            key: "MICROKERNEL_SCHEMA",
            value: schema.to_string(),
            reason: "must be a lowercase identifier".into(),
        })?;
        Ok(PgStore {
            pool,
            schema: schema.to_string(),
            ensured: RwLock::new(HashSet::new()),
        })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        sqlx::query(&format!("CREATE SCHEMA IF NOT EXISTS {}", self.schema))
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    fn qualified(&self, collection: &str) -> String {
        format!("{}.{}", self.schema, collection)
    }

    /// Validate the name and create the record table if this process has not seen it yet.
    async fn table(&self, collection: &str) -> Result<String, AppError> {
        validate_collection_name(collection)?;
        let q_table = self.qualified(collection);
        if self.ensured.read().await.contains(collection) {
            return Ok(q_table);
        }
        let ddl = format!(
            r#"
            CREATE TABLE IF NOT EXISTS {} (
                id BIGSERIAL PRIMARY KEY,
                payload JSONB NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
            q_table
        );
        sqlx::query(&ddl).execute(&self.pool).await?;
        self.ensured.write().await.insert(collection.to_string());
        tracing::debug!(table = %q_table, "record table ready");
        Ok(q_table)
    }
}

#[async_trait]
impl Store for PgStore {
    fn kind(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn insert(&self, collection: &str, payload: Value) -> Result<i64, AppError> {
        let q_table = self.table(collection).await?;
        let (id,): (i64,) = sqlx::query_as(&format!(
            "INSERT INTO {} (payload) VALUES ($1) RETURNING id",
            q_table
        ))
        .bind(payload)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn get(&self, collection: &str, id: i64) -> Result<Option<Record>, AppError> {
        let q_table = self.table(collection).await?;
        let row: Option<(i64, Value)> =
            sqlx::query_as(&format!("SELECT id, payload FROM {} WHERE id = $1", q_table))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.map(|(id, payload)| Record { id, payload }))
    }

    async fn list(&self, collection: &str) -> Result<Vec<Record>, AppError> {
        let q_table = self.table(collection).await?;
        let rows: Vec<(i64, Value)> =
            sqlx::query_as(&format!("SELECT id, payload FROM {} ORDER BY id", q_table))
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(|(id, payload)| Record { id, payload }).collect())
    }

    async fn update(&self, collection: &str, id: i64, payload: Value) -> Result<bool, AppError> {
        let q_table = self.table(collection).await?;
        let result = sqlx::query(&format!(
            "UPDATE {} SET payload = $1, updated_at = NOW() WHERE id = $2",
            q_table
        ))
        .bind(payload)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, collection: &str, id: i64) -> Result<bool, AppError> {
        let q_table = self.table(collection).await?;
        let result = sqlx::query(&format!("DELETE FROM {} WHERE id = $1", q_table))
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, collection: &str) -> Result<u64, AppError> {
        let q_table = self.table(collection).await?;
        let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {}", q_table))
            .fetch_one(&self.pool)
            .await?;
        Ok(n.max(0) as u64)
    }
}

/// Create the database if needed, open a pool and create the record schema.
pub async fn connect_pg_store(database_url: &str, schema: &str, max_connections: u32) -> Result<PgStore, AppError> {
    ensure_database_exists(database_url).await?;
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    let store = PgStore::new(pool, schema)?;
    store.ensure_schema().await?;
    tracing::info!(schema = %schema, "connected to postgres");
    Ok(store)
}

/// Ensure the database in `database_url` exists; create it if not. Connects to the
/// default `postgres` database to run CREATE DATABASE.
async fn ensure_database_exists(database_url: &str) -> Result<(), AppError> {
    let (admin_url, db_name) = parse_db_name_from_url(database_url)?;
    if db_name.is_empty() || db_name == "postgres" {
        return Ok(());
    }
    let opts = PgConnectOptions::from_str(&admin_url).map_err(|e| ConfigError::InvalidValue {
        key: "DATABASE_URL",
        value: database_url.to_string(),
        reason: e.to_string(),
    })?;
    let mut conn: sqlx::PgConnection = opts.connect().await?;
    let exists: (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
        .bind(&db_name)
        .fetch_one(&mut conn)
        .await?;
    if !exists.0 {
        sqlx::query(&format!("CREATE DATABASE {}", quote_ident(&db_name)))
            .execute(&mut conn)
            .await?;
        tracing::info!(database = %db_name, "created database");
    }
    Ok(())
}

fn parse_db_name_from_url(url: &str) -> Result<(String, String), AppError> {
    let path_start = url.rfind('/').ok_or_else(|| ConfigError::InvalidValue {
        key: "DATABASE_URL",
        value: url.to_string(),
        reason: "no database path".into(),
    })? + 1;
    let path_and_query = url.get(path_start..).unwrap_or("");
    let db_name = path_and_query.split('?').next().unwrap_or("").trim();
    let base = url.get(..path_start).unwrap_or(url);
    Ok((format!("{}postgres", base), db_name.to_string()))
}

fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_admin_url_and_database() {
        let (admin, db) = parse_db_name_from_url("postgres://u:p@localhost:5432/shop?sslmode=disable").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert_eq!(db, "shop");
        assert!(parse_db_name_from_url("not a url").is_err());
    }

    #[test]
    fn quotes_identifiers() {
        assert_eq!(quote_ident("shop"), "\"shop\"");
        assert_eq!(quote_ident("we\"ird"), "\"we\"\"ird\"");
    }
}
