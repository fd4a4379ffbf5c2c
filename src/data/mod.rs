//! Data layer module
//!
//! Handles all document persistence:
//! - `DocumentStore` capability used by services
//! - SQLite-backed store
//! - In-memory store

mod memory;
mod models;
mod sqlite;
mod store;

use std::sync::Arc;

pub use memory::MemoryStore;
pub use models::*;
pub use sqlite::SqliteStore;
pub use store::DocumentStore;

#[cfg(test)]
pub use store::MockDocumentStore;

use crate::config::DatabaseConfig;
use crate::error::AppError;

/// Open the store selected by `database.url`
pub async fn connect_store(config: &DatabaseConfig) -> Result<Arc<dyn DocumentStore>, AppError> {
    if config.is_memory() {
        tracing::warn!("Using in-memory document store; data is lost on shutdown");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let store = SqliteStore::connect(&config.url, config.max_connections).await?;
    Ok(Arc::new(store))
}
