//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services only talk to the injected document store.

mod credentials;
mod records;

pub use credentials::{CredentialService, IssuedToken};
pub use records::RecordService;
