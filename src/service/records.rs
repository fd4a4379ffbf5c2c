//! Record service
//!
//! Read-only access to the records external producers write for each user.

use std::sync::Arc;

use crate::auth::Identity;
use crate::data::{Collection, Document, DocumentStore};
use crate::error::AppError;

/// Record service
pub struct RecordService {
    store: Arc<dyn DocumentStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All records in `collection` owned by the caller
    ///
    /// The credential collection is never listed.
    pub async fn list_owned(
        &self,
        collection: Collection,
        identity: &Identity,
    ) -> Result<Vec<Document>, AppError> {
        if collection.view_segment().is_none() {
            return Err(AppError::Internal(anyhow::anyhow!(
                "collection {collection} is not viewable"
            )));
        }

        let records = self.store.find(collection, &identity.username).await?;
        tracing::debug!(
            username = %identity.username,
            collection = %collection,
            count = records.len(),
            "Listed owned records"
        );
        Ok(records)
    }
}
