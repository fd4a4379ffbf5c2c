//! Authentication middleware
//!
//! Protects routes that require a bearer token.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, Request, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};

use super::token::{TokenSigner, TokenStatus};
use crate::AppState;
use crate::error::AppError;

/// Authenticated caller
///
/// The username is the only key used to scope data access.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub username: String,
}

/// Pull the token out of `Authorization: Bearer <token>`
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AppError> {
    let value = headers.get(AUTHORIZATION).ok_or(AppError::MissingToken)?;
    let value = value.to_str().map_err(|_| AppError::MalformedHeader)?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("Bearer") => Ok(token),
        _ => Err(AppError::MalformedHeader),
    }
}

/// Verify the request's bearer token as of `now`
///
/// Every decoding outcome other than `Valid` becomes
/// `InvalidOrExpiredToken`; the precise outcome is only logged.
pub fn authorize(
    headers: &HeaderMap,
    signer: &TokenSigner,
    now: DateTime<Utc>,
) -> Result<Identity, AppError> {
    let token = match extract_bearer_token(headers) {
        Ok(token) => token,
        Err(error) => {
            crate::metrics::record_auth_event("gate", "rejected_header");
            return Err(error);
        }
    };

    let status = signer.verify(token, now);
    crate::metrics::record_auth_event("gate", status.label());

    match status {
        TokenStatus::Valid(claims) => Ok(Identity {
            username: claims.username,
        }),
        other => {
            tracing::debug!(outcome = other.label(), "Rejected bearer token");
            Err(AppError::InvalidOrExpiredToken)
        }
    }
}

/// Middleware to require authentication
///
/// Verifies the bearer token and adds the `Identity` to request
/// extensions.
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/view/timelines", ...)
///     .layer(middleware::from_fn_with_state(state, require_auth));
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let identity = authorize(request.headers(), &state.signer, Utc::now())?;

    request.extensions_mut().insert(identity);

    Ok(next.run(request).await)
}

/// Extractor for current authenticated user
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(identity): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", identity.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Identity);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    /// Reuse the identity set by `require_auth`, or verify the header here
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(identity) = parts.extensions.get::<Identity>().cloned() {
            return Ok(CurrentUser(identity));
        }

        let state = AppState::from_ref(state);
        let identity = authorize(&parts.headers, &state.signer, Utc::now())?;
        parts.extensions.insert(identity.clone());

        Ok(CurrentUser(identity))
    }
}
