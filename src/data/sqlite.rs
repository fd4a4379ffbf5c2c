//! SQLite document store
//!
//! Documents from every collection share one table. The body is kept
//! as JSON text; the owner and collection are indexed columns.

use std::path::Path;
use std::str::FromStr;
use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{Map, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

use super::models::{Collection, Document, EntityId, NewDocument};
use super::store::DocumentStore;
use crate::error::AppError;

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: String,
    username: String,
    body: String,
}

impl TryFrom<DocumentRow> for Document {
    type Error = AppError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let fields: Map<String, Value> = serde_json::from_str(&row.body)
            .map_err(|e| AppError::Store(format!("document {} has invalid body: {e}", row.id)))?;
        Ok(Document::from_parts(row.id, row.username, fields))
    }
}

/// Document store backed by an SQLite connection pool
pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    /// Connect using a `sqlite:` connection string and run migrations
    pub async fn connect(url: &str, max_connections: u32) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Document store connected and migrated successfully");
        Ok(Self { pool })
    }

    /// Open (or create) a database file at `path`
    pub async fn open(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        let connection_string = format!("sqlite:{}?mode=rwc", path.display());
        Self::connect(&connection_string, 5).await
    }
}

#[async_trait]
impl DocumentStore for SqliteStore {
    async fn find(
        &self,
        collection: Collection,
        username: &str,
    ) -> Result<Vec<Document>, AppError> {
        let started = Instant::now();
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, username, body FROM documents
            WHERE collection = ? AND username = ?
            ORDER BY seq
            "#,
        )
        .bind(collection.name())
        .bind(username)
        .fetch_all(&self.pool)
        .await?;
        crate::metrics::observe_store_query("find", collection.name(), started.elapsed());

        rows.into_iter().map(Document::try_from).collect()
    }

    async fn find_one(
        &self,
        collection: Collection,
        username: &str,
    ) -> Result<Option<Document>, AppError> {
        let started = Instant::now();
        let row = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, username, body FROM documents
            WHERE collection = ? AND username = ?
            ORDER BY seq
            LIMIT 1
            "#,
        )
        .bind(collection.name())
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        crate::metrics::observe_store_query("find_one", collection.name(), started.elapsed());

        row.map(Document::try_from).transpose()
    }

    async fn exists(&self, collection: Collection, username: &str) -> Result<bool, AppError> {
        let started = Instant::now();
        let found: i64 = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM documents WHERE collection = ? AND username = ?)",
        )
        .bind(collection.name())
        .bind(username)
        .fetch_one(&self.pool)
        .await?;
        crate::metrics::observe_store_query("exists", collection.name(), started.elapsed());

        Ok(found != 0)
    }

    async fn insert(
        &self,
        collection: Collection,
        document: NewDocument,
    ) -> Result<Document, AppError> {
        let started = Instant::now();
        let body = serde_json::to_string(&document.fields)
            .map_err(|e| AppError::Internal(e.into()))?;
        let stored = document.with_id(EntityId::new());

        let result = sqlx::query(
            r#"
            INSERT INTO documents (id, collection, username, body, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&stored.id)
        .bind(collection.name())
        .bind(&stored.username)
        .bind(&body)
        .bind(Utc::now())
        .execute(&self.pool)
        .await;
        crate::metrics::observe_store_query("insert", collection.name(), started.elapsed());

        match result {
            Ok(_) => Ok(stored),
            Err(sqlx::Error::Database(error)) if error.is_unique_violation() => {
                Err(AppError::Conflict)
            }
            Err(error) => Err(error.into()),
        }
    }
}
