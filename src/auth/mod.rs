//! Username/password authentication
//!
//! Handles:
//! - Password hashing
//! - Session token minting and verification
//! - Signup/login routes
//! - Bearer-token access gate

mod middleware;
mod password;
mod routes;
pub mod token;

pub use middleware::{CurrentUser, Identity, authorize, require_auth};
pub use password::{hash_password, verify_password};
pub use routes::auth_router;
pub use token::{Claims, SigningKey, TokenSigner, TokenStatus};
