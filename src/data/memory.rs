//! In-process document store
//!
//! Backs tests and `database.url = "memory"`. Contents are lost on exit.

use std::collections::HashMap;
use std::time::Instant;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::models::{Collection, Document, EntityId, NewDocument};
use super::store::DocumentStore;
use crate::error::AppError;

/// Document store held in memory
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        username: &str,
    ) -> Result<Vec<Document>, AppError> {
        let started = Instant::now();
        let guard = self.collections.read().await;
        let documents: Vec<Document> = guard
            .get(&collection)
            .map(|docs| {
                docs.iter()
                    .filter(|doc| doc.username == username)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        crate::metrics::observe_store_query("find", collection.name(), started.elapsed());
        Ok(documents)
    }

    async fn find_one(
        &self,
        collection: Collection,
        username: &str,
    ) -> Result<Option<Document>, AppError> {
        let started = Instant::now();
        let guard = self.collections.read().await;
        let document = guard
            .get(&collection)
            .and_then(|docs| docs.iter().find(|doc| doc.username == username))
            .cloned();

        crate::metrics::observe_store_query("find_one", collection.name(), started.elapsed());
        Ok(document)
    }

    async fn exists(&self, collection: Collection, username: &str) -> Result<bool, AppError> {
        Ok(self.find_one(collection, username).await?.is_some())
    }

    async fn insert(
        &self,
        collection: Collection,
        document: NewDocument,
    ) -> Result<Document, AppError> {
        let started = Instant::now();
        let mut guard = self.collections.write().await;
        let docs = guard.entry(collection).or_default();

        if collection.has_unique_owner() && docs.iter().any(|doc| doc.username == document.username)
        {
            return Err(AppError::Conflict);
        }

        let stored = document.with_id(EntityId::new());
        docs.push(stored.clone());

        crate::metrics::observe_store_query("insert", collection.name(), started.elapsed());
        Ok(stored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    #[tokio::test]
    async fn find_is_scoped_to_owner_and_ordered() {
        let store = MemoryStore::new();
        for (owner, n) in [("alice", 1), ("bob", 2), ("alice", 3)] {
            assert_ok!(
                store
                    .insert(
                        Collection::Capsules,
                        NewDocument::from_value(owner, json!({ "n": n })),
                    )
                    .await
            );
        }

        let alice = store.find(Collection::Capsules, "alice").await.unwrap();
        let numbers: Vec<i64> = alice
            .iter()
            .map(|doc| doc.fields["n"].as_i64().unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 3]);
        assert!(alice.iter().all(|doc| doc.username == "alice"));
    }

    #[tokio::test]
    async fn collections_are_isolated() {
        let store = MemoryStore::new();
        store
            .insert(Collection::Timelines, NewDocument::from_value("alice", json!({})))
            .await
            .unwrap();

        assert!(store.exists(Collection::Timelines, "alice").await.unwrap());
        assert!(!store.exists(Collection::Capsules, "alice").await.unwrap());
        assert!(store.find(Collection::Capsules, "alice").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn users_collection_rejects_second_owner_document() {
        let store = MemoryStore::new();
        let first = NewDocument::from_value("alice", json!({"password": "h1"}));
        let second = NewDocument::from_value("alice", json!({"password": "h2"}));

        assert_ok!(store.insert(Collection::Users, first).await);
        let error = assert_err!(store.insert(Collection::Users, second).await);
        assert!(matches!(error, AppError::Conflict));

        let stored = store
            .find_one(Collection::Users, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.fields["password"], "h1");
    }
}
