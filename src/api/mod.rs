//! API layer
//!
//! HTTP handlers for:
//! - Per-user record views
//! - Metrics (Prometheus)
//! - JSON body extraction

mod json;
pub mod metrics;
mod views;

pub use json::AppJson;
pub use metrics::{metrics_router, track_http_requests};
pub use views::views_router;
