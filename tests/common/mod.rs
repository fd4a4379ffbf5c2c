//! Common test utilities for E2E tests

use std::sync::Arc;

use chronoview::data::{Collection, Document, NewDocument, SqliteStore};
use chronoview::{AppState, auth, config};
use tempfile::TempDir;
use tokio::net::TcpListener;

pub const TEST_SECRET: &str = "test-secret-key-32-bytes-long!!!";

/// Test server instance
pub struct TestServer {
    pub addr: String,
    pub state: AppState,
    pub _temp_dir: TempDir,
    pub client: reqwest::Client,
}

impl TestServer {
    /// Create a new test server backed by a temporary SQLite file
    pub async fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir.path().join("test.db");

        let config = config::AppConfig {
            server: config::ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0, // Let OS assign port
            },
            database: config::DatabaseConfig {
                url: format!("sqlite:{}?mode=rwc", db_path.display()),
                max_connections: 5,
            },
            auth: config::AuthConfig {
                secret_key: Some(TEST_SECRET.to_string()),
                token_ttl_seconds: config::DEFAULT_TOKEN_TTL_SECONDS,
            },
            logging: config::LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        };

        let store = SqliteStore::open(&db_path).await.unwrap();
        let signer = auth::TokenSigner::new(
            auth::SigningKey::from_secret(TEST_SECRET),
            chrono::Duration::seconds(config.auth.token_ttl_seconds),
        );
        let state = AppState::from_parts(config, Arc::new(store), signer);

        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .unwrap();

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let addr_str = format!("http://{}", addr);

        let app = chronoview::build_router(state.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr: addr_str,
            state,
            _temp_dir: temp_dir,
            client,
        }
    }

    /// Get base URL for API requests
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.addr, path)
    }

    /// POST credentials to `/chrono/signup` or `/chrono/login`
    pub async fn post_credentials(
        &self,
        path: &str,
        username: &str,
        password: &str,
    ) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .expect("request succeeds")
    }

    /// Sign up and log in, returning the bearer token
    pub async fn register_and_login(&self, username: &str, password: &str) -> String {
        let signup = self
            .post_credentials("/chrono/signup", username, password)
            .await;
        assert_eq!(signup.status(), 201);

        let login = self
            .post_credentials("/chrono/login", username, password)
            .await;
        assert_eq!(login.status(), 200);
        let body: serde_json::Value = login.json().await.unwrap();
        body["token"].as_str().expect("token in body").to_string()
    }

    /// Insert a record as an external producer would
    pub async fn seed_record(
        &self,
        collection: Collection,
        username: &str,
        body: serde_json::Value,
    ) -> Document {
        self.state
            .store
            .insert(collection, NewDocument::from_value(username, body))
            .await
            .unwrap()
    }

    /// GET a view route with an optional raw Authorization header
    pub async fn get_view(&self, segment: &str, authorization: Option<&str>) -> reqwest::Response {
        let mut request = self
            .client
            .get(self.url(&format!("/chrono/view/{segment}")));
        if let Some(value) = authorization {
            request = request.header("Authorization", value);
        }
        request.send().await.expect("request succeeds")
    }
}
