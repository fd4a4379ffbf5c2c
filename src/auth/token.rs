//! Session tokens
//!
//! HS256-signed JWTs carrying the username and an expiry.
//! No server-side session storage needed.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Symmetric signing secret
///
/// Built once at startup and shared read-only.
#[derive(Clone)]
pub struct SigningKey(Vec<u8>);

impl SigningKey {
    /// Use a configured secret
    pub fn from_secret(secret: &str) -> Self {
        Self(secret.as_bytes().to_vec())
    }

    /// Generate a random 32-byte secret
    pub fn generate() -> Self {
        use rand::RngCore;

        let mut bytes = vec![0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }
}

impl std::fmt::Debug for SigningKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(..)")
    }
}

/// Claims carried by a session token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub username: String,
    /// Issued at (unix seconds)
    pub iat: i64,
    /// Expiration (unix seconds)
    pub exp: i64,
}

/// Result of decoding a presented token
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    Valid(Claims),
    /// Signature checks out but `exp` has passed
    Expired,
    /// Not a JWT, bad JSON, or an unexpected `alg`
    Malformed,
    SignatureMismatch,
}

impl TokenStatus {
    /// Label used in logs and metrics
    pub fn label(&self) -> &'static str {
        match self {
            TokenStatus::Valid(_) => "valid",
            TokenStatus::Expired => "expired",
            TokenStatus::Malformed => "malformed",
            TokenStatus::SignatureMismatch => "signature_mismatch",
        }
    }
}

/// Mints and verifies session tokens with one key and lifetime
#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenSigner {
    pub fn new(key: SigningKey, ttl: Duration) -> Self {
        // Expiry is checked against the caller's clock in `verify`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(&key.0),
            decoding_key: DecodingKey::from_secret(&key.0),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Expiry of a token issued at `now`
    ///
    /// # Errors
    /// Returns error if `now + ttl` is outside the representable range.
    pub fn expiry_for(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, AppError> {
        now.checked_add_signed(self.ttl).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!(
                "token expiry overflows for ttl of {}s",
                self.ttl.num_seconds()
            ))
        })
    }

    /// Create a signed token for `username` issued at `now`
    pub fn mint(&self, username: &str, now: DateTime<Utc>) -> Result<String, AppError> {
        let claims = Claims {
            username: username.to_string(),
            iat: now.timestamp(),
            exp: self.expiry_for(now)?.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to sign token: {e}")))
    }

    /// Decode and check a token as of `now`
    ///
    /// The signature is checked before the claims are trusted. A token is
    /// expired once `now` reaches `exp`.
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> TokenStatus {
        let claims = match decode::<Claims>(token, &self.decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(error) => {
                return match error.kind() {
                    ErrorKind::InvalidSignature => TokenStatus::SignatureMismatch,
                    ErrorKind::ExpiredSignature => TokenStatus::Expired,
                    _ => TokenStatus::Malformed,
                };
            }
        };

        if now.timestamp() >= claims.exp {
            return TokenStatus::Expired;
        }

        TokenStatus::Valid(claims)
    }
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
