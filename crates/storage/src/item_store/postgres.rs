//! Postgres-backed item store implementation.
//!
//! Documents are stored in a single `documents` table:
//!
//! ```sql
//! CREATE TABLE documents (
//!     table_name TEXT   NOT NULL,
//!     item_key   TEXT   NOT NULL,
//!     version    BIGINT NOT NULL,
//!     payload    JSONB  NOT NULL,
//!     PRIMARY KEY (table_name, item_key)
//! );
//! CREATE INDEX documents_category_idx
//!     ON documents ((payload->>'category'))
//!     WHERE table_name = 'products';
//! ```
//!
//! Conditional writes compare the `version` column inside a single UPDATE,
//! so the compare-and-swap is atomic at the database level. Store-side
//! result paging is absorbed here (`fetch_all`); callers always see one
//! complete, unordered sequence.

use sqlx::{PgPool, Row};
use std::sync::Arc;
use tracing::instrument;

use super::r#trait::{ItemStore, StoreError, StoredItem};

/// Postgres-backed item store.
///
/// Thread safety comes from the SQLx connection pool (`Arc + Send + Sync`).
#[derive(Debug, Clone)]
pub struct PostgresItemStore {
    pool: Arc<PgPool>,
}

impl PostgresItemStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool: Arc::new(pool),
        }
    }

    #[instrument(skip(self), err)]
    pub async fn get_item(&self, table: &str, key: &str) -> Result<Option<StoredItem>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT item_key, version, payload
            FROM documents
            WHERE table_name = $1 AND item_key = $2
            "#,
        )
        .bind(table)
        .bind(key)
        .fetch_optional(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("get", e))?;

        row.map(row_to_item).transpose()
    }

    #[instrument(skip(self, item), fields(key = %item.key), err)]
    pub async fn put_item(&self, table: &str, item: StoredItem) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO documents (table_name, item_key, version, payload)
            VALUES ($1, $2, 1, $3)
            ON CONFLICT (table_name, item_key)
            DO UPDATE SET
                version = documents.version + 1,
                payload = EXCLUDED.payload
            "#,
        )
        .bind(table)
        .bind(&item.key)
        .bind(&item.payload)
        .execute(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("put", e))?;
        Ok(())
    }

    #[instrument(skip(self, item), fields(key = %item.key, expected_version), err)]
    pub async fn put_item_if_version(
        &self,
        table: &str,
        item: StoredItem,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        let result = if expected_version == 0 {
            // Expecting absence: insert-or-nothing detects a concurrent creator.
            sqlx::query(
                r#"
                INSERT INTO documents (table_name, item_key, version, payload)
                VALUES ($1, $2, 1, $3)
                ON CONFLICT (table_name, item_key) DO NOTHING
                "#,
            )
            .bind(table)
            .bind(&item.key)
            .bind(&item.payload)
            .execute(&*self.pool)
            .await
        } else {
            sqlx::query(
                r#"
                UPDATE documents
                SET version = version + 1, payload = $4
                WHERE table_name = $1 AND item_key = $2 AND version = $3
                "#,
            )
            .bind(table)
            .bind(&item.key)
            .bind(expected_version as i64)
            .bind(&item.payload)
            .execute(&*self.pool)
            .await
        };

        let result = result.map_err(|e| map_sqlx_error("put_if_version", e))?;
        if result.rows_affected() == 0 {
            return Err(StoreError::ConditionFailed);
        }
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn delete_item(&self, table: &str, key: &str) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM documents WHERE table_name = $1 AND item_key = $2")
            .bind(table)
            .bind(key)
            .execute(&*self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;
        Ok(())
    }

    #[instrument(skip(self), err)]
    pub async fn scan_table(&self, table: &str) -> Result<Vec<StoredItem>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT item_key, version, payload
            FROM documents
            WHERE table_name = $1
            "#,
        )
        .bind(table)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("scan", e))?;

        rows.into_iter().map(row_to_item).collect()
    }

    #[instrument(skip(self), err)]
    pub async fn query_attribute(
        &self,
        table: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<StoredItem>, StoreError> {
        let rows = sqlx::query(
            r#"
            SELECT item_key, version, payload
            FROM documents
            WHERE table_name = $1 AND payload->>$2 = $3
            "#,
        )
        .bind(table)
        .bind(attribute)
        .bind(value)
        .fetch_all(&*self.pool)
        .await
        .map_err(|e| map_sqlx_error("query", e))?;

        rows.into_iter().map(row_to_item).collect()
    }
}

fn row_to_item(row: sqlx::postgres::PgRow) -> Result<StoredItem, StoreError> {
    let key: String = row
        .try_get("item_key")
        .map_err(|e| StoreError::Unavailable(format!("malformed row: {e}")))?;
    let version: i64 = row
        .try_get("version")
        .map_err(|e| StoreError::Unavailable(format!("malformed row: {e}")))?;
    let payload: serde_json::Value = row
        .try_get("payload")
        .map_err(|e| StoreError::Unavailable(format!("malformed row: {e}")))?;
    Ok(StoredItem {
        key,
        version: version as u64,
        payload,
    })
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            StoreError::Unavailable(format!("database error in {operation}: {}", db_err.message()))
        }
        sqlx::Error::PoolClosed => {
            StoreError::Unavailable(format!("connection pool closed in {operation}"))
        }
        other => StoreError::Unavailable(format!("{operation}: {other}")),
    }
}

fn runtime_handle() -> Result<tokio::runtime::Handle, StoreError> {
    tokio::runtime::Handle::try_current().map_err(|_| {
        StoreError::Unavailable(
            "PostgresItemStore requires an async runtime (tokio); call from within a runtime context"
                .to_string(),
        )
    })
}

// The ItemStore trait is synchronous; bridge to the async sqlx calls via the
// ambient tokio runtime, as callers run inside one.
impl ItemStore for PostgresItemStore {
    fn get(&self, table: &str, key: &str) -> Result<Option<StoredItem>, StoreError> {
        runtime_handle()?.block_on(self.get_item(table, key))
    }

    fn put(&self, table: &str, item: StoredItem) -> Result<(), StoreError> {
        runtime_handle()?.block_on(self.put_item(table, item))
    }

    fn put_if_version(
        &self,
        table: &str,
        item: StoredItem,
        expected_version: u64,
    ) -> Result<(), StoreError> {
        runtime_handle()?.block_on(self.put_item_if_version(table, item, expected_version))
    }

    fn delete(&self, table: &str, key: &str) -> Result<(), StoreError> {
        runtime_handle()?.block_on(self.delete_item(table, key))
    }

    fn scan(&self, table: &str) -> Result<Vec<StoredItem>, StoreError> {
        runtime_handle()?.block_on(self.scan_table(table))
    }

    fn query(
        &self,
        table: &str,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<StoredItem>, StoreError> {
        runtime_handle()?.block_on(self.query_attribute(table, attribute, value))
    }
}
