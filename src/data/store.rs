//! Document store capability
//!
//! Handlers and services only see this trait. The concrete store is
//! chosen at startup from `database.url`.

use async_trait::async_trait;

use super::models::{Collection, Document, NewDocument};
use crate::error::AppError;

/// Minimal document store used by the service
///
/// Every lookup is keyed by the owning `username`; there is no other
/// filter, so callers cannot widen a query past a single owner.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// All documents in `collection` owned by `username`, in insertion order
    async fn find(&self, collection: Collection, username: &str)
    -> Result<Vec<Document>, AppError>;

    /// The first document in `collection` owned by `username`
    async fn find_one(
        &self,
        collection: Collection,
        username: &str,
    ) -> Result<Option<Document>, AppError>;

    /// Whether `username` owns any document in `collection`
    async fn exists(&self, collection: Collection, username: &str) -> Result<bool, AppError>;

    /// Store a document and return it with its assigned identifier
    ///
    /// # Errors
    /// `AppError::Conflict` when `collection` allows one document per
    /// owner and `username` already has one.
    async fn insert(
        &self,
        collection: Collection,
        document: NewDocument,
    ) -> Result<Document, AppError>;
}
