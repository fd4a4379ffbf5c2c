//! Signup and login endpoints
//!
//! Both routes are public; they sit in front of the access gate.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use serde::{Deserialize, Serialize};

use crate::AppState;
use crate::api::AppJson;
use crate::error::AppError;
use crate::service::CredentialService;

/// Create authentication router
///
/// Routes:
/// - POST /signup - Create an account
/// - POST /login - Exchange credentials for a bearer token
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

/// Credentials request body
///
/// Fields are optional so a missing one becomes a 400 with a JSON
/// message instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CredentialsRequest {
    username: Option<String>,
    password: Option<String>,
}

impl CredentialsRequest {
    fn into_parts(self) -> Result<(String, String), AppError> {
        match (self.username, self.password) {
            (Some(username), Some(password)) => Ok((username, password)),
            _ => Err(AppError::Validation(
                "username and password are required".to_string(),
            )),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// POST /chrono/signup
async fn signup(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let (username, password) = body.into_parts()?;

    CredentialService::new(state.store.clone(), state.signer.clone())
        .register(&username, &password)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "User created successfully".to_string(),
        }),
    ))
}

/// POST /chrono/login
async fn login(
    State(state): State<AppState>,
    AppJson(body): AppJson<CredentialsRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let (username, password) = body.into_parts()?;

    let issued = CredentialService::new(state.store.clone(), state.signer.clone())
        .authenticate(&username, &password)
        .await?;

    Ok(Json(TokenResponse {
        token: issued.token,
    }))
}
