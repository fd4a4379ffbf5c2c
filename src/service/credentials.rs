//! Credential service
//!
//! Account creation and login for the per-user API.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::auth::{TokenSigner, hash_password, verify_password};
use crate::data::{Collection, DocumentStore, User};
use crate::error::AppError;
use crate::metrics::record_auth_event;

/// A freshly minted session token
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Credential service
pub struct CredentialService {
    store: Arc<dyn DocumentStore>,
    signer: Arc<TokenSigner>,
}

impl CredentialService {
    pub fn new(store: Arc<dyn DocumentStore>, signer: Arc<TokenSigner>) -> Self {
        Self { store, signer }
    }

    /// Create an account
    ///
    /// # Errors
    /// `AppError::Conflict` if the username is already registered,
    /// including when a concurrent signup wins the insert.
    pub async fn register(&self, username: &str, password: &str) -> Result<(), AppError> {
        if self.store.exists(Collection::Users, username).await? {
            record_auth_event("signup", "conflict");
            return Err(AppError::Conflict);
        }

        let password = password.to_owned();
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
            .await
            .map_err(|e| AppError::Internal(e.into()))??;

        let user = User {
            username: username.to_string(),
            password_hash,
        };
        if let Err(error) = self
            .store
            .insert(Collection::Users, user.into_document())
            .await
        {
            if matches!(error, AppError::Conflict) {
                record_auth_event("signup", "conflict");
            }
            return Err(error);
        }

        record_auth_event("signup", "created");
        tracing::info!(username = %username, "User registered");
        Ok(())
    }

    /// Verify credentials and issue a token
    ///
    /// Unknown usernames and wrong passwords both yield
    /// `AppError::InvalidCredentials`.
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<IssuedToken, AppError> {
        self.authenticate_at(username, password, Utc::now()).await
    }

    /// As [`authenticate`](Self::authenticate), issuing the token at `now`
    pub async fn authenticate_at(
        &self,
        username: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<IssuedToken, AppError> {
        let Some(document) = self.store.find_one(Collection::Users, username).await? else {
            record_auth_event("login", "unknown_user");
            tracing::debug!(username = %username, "Login for unknown user");
            return Err(AppError::InvalidCredentials);
        };
        let user = User::try_from(document)?;

        let password = password.to_owned();
        let matches =
            tokio::task::spawn_blocking(move || verify_password(&password, &user.password_hash))
                .await
                .map_err(|e| AppError::Internal(e.into()))?;
        if !matches {
            record_auth_event("login", "wrong_password");
            tracing::debug!(username = %username, "Login with wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let expires_at = self.signer.expiry_for(now)?;
        let token = self.signer.mint(username, now)?;
        record_auth_event("login", "success");
        tracing::info!(username = %username, "User logged in");

        Ok(IssuedToken { token, expires_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{SigningKey, TokenStatus};
    use crate::data::{MemoryStore, MockDocumentStore};
    use chrono::Duration;

    fn signer() -> Arc<TokenSigner> {
        Arc::new(TokenSigner::new(
            SigningKey::from_secret("credential-test-secret-32-bytes!"),
            Duration::hours(6),
        ))
    }

    fn service() -> (CredentialService, Arc<MemoryStore>, Arc<TokenSigner>) {
        let store = Arc::new(MemoryStore::new());
        let signer = signer();
        (
            CredentialService::new(store.clone(), signer.clone()),
            store,
            signer,
        )
    }

    #[tokio::test]
    async fn register_then_authenticate_returns_token_for_user() {
        let (service, _store, signer) = service();

        service.register("alice", "pw1").await.unwrap();
        let now = Utc::now();
        let issued = service.authenticate_at("alice", "pw1", now).await.unwrap();

        assert_eq!(issued.expires_at, now + Duration::hours(6));
        match signer.verify(&issued.token, now) {
            TokenStatus::Valid(claims) => assert_eq!(claims.username, "alice"),
            other => panic!("expected valid token, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_twice_keeps_first_credential() {
        let (service, store, _signer) = service();

        service.register("alice", "pw1").await.unwrap();
        let second = service.register("alice", "pw2").await;
        assert!(matches!(second, Err(AppError::Conflict)));

        let stored = store
            .find_one(Collection::Users, "alice")
            .await
            .unwrap()
            .unwrap();
        let user = User::try_from(stored).unwrap();
        assert!(verify_password("pw1", &user.password_hash));
        assert!(service.authenticate("alice", "pw1").await.is_ok());
        assert!(matches!(
            service.authenticate("alice", "pw2").await,
            Err(AppError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn stored_credential_is_not_plaintext() {
        let (service, store, _signer) = service();
        service.register("alice", "pw1").await.unwrap();

        let stored = store
            .find_one(Collection::Users, "alice")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(stored.fields["password"], "pw1");
    }

    #[tokio::test]
    async fn wrong_password_and_unknown_user_are_indistinguishable() {
        let (service, _store, _signer) = service();
        service.register("alice", "pw1").await.unwrap();

        let wrong = service.authenticate("alice", "x").await.unwrap_err();
        let unknown = service.authenticate("mallory", "pw1").await.unwrap_err();

        assert!(matches!(wrong, AppError::InvalidCredentials));
        assert!(matches!(unknown, AppError::InvalidCredentials));
        assert_eq!(wrong.to_string(), unknown.to_string());
    }

    #[tokio::test]
    async fn insert_race_surfaces_as_conflict() {
        let mut store = MockDocumentStore::new();
        store.expect_exists().returning(|_, _| Ok(false));
        store
            .expect_insert()
            .times(1)
            .returning(|_, _| Err(AppError::Conflict));

        let service = CredentialService::new(Arc::new(store), signer());
        let result = service.register("alice", "pw1").await;
        assert!(matches!(result, Err(AppError::Conflict)));
    }

    #[tokio::test]
    async fn store_failure_propagates_from_login() {
        let mut store = MockDocumentStore::new();
        store
            .expect_find_one()
            .returning(|_, _| Err(AppError::Store("connection reset".to_string())));

        let service = CredentialService::new(Arc::new(store), signer());
        let result = service.authenticate("alice", "pw1").await;
        assert!(matches!(result, Err(AppError::Store(_))));
    }
}
