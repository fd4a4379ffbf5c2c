//! Record view endpoints
//!
//! Each route lists the caller's documents from one collection.

use axum::{Json, Router, extract::State, middleware, routing::get};

use crate::AppState;
use crate::auth::{CurrentUser, require_auth};
use crate::data::{Collection, Document};
use crate::error::AppError;
use crate::service::RecordService;

/// Create view router
///
/// Routes (all behind `require_auth`):
/// - GET /view/timelines
/// - GET /view/file-versions
/// - GET /view/capsules
/// - GET /view/ebs-snapshots
/// - GET /view/ec2-instances
pub fn views_router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/view/timelines", get(view_timelines))
        .route("/view/file-versions", get(view_file_versions))
        .route("/view/capsules", get(view_capsules))
        .route("/view/ebs-snapshots", get(view_ebs_snapshots))
        .route("/view/ec2-instances", get(view_ec2_instances))
        .route_layer(middleware::from_fn_with_state(state, require_auth))
}

async fn list_owned(
    state: &AppState,
    collection: Collection,
    user: CurrentUser,
) -> Result<Json<Vec<Document>>, AppError> {
    let CurrentUser(identity) = user;
    let records = RecordService::new(state.store.clone())
        .list_owned(collection, &identity)
        .await?;
    Ok(Json(records))
}

/// GET /chrono/view/timelines
async fn view_timelines(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Document>>, AppError> {
    list_owned(&state, Collection::Timelines, user).await
}

/// GET /chrono/view/file-versions
async fn view_file_versions(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Document>>, AppError> {
    list_owned(&state, Collection::FileVersions, user).await
}

/// GET /chrono/view/capsules
async fn view_capsules(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Document>>, AppError> {
    list_owned(&state, Collection::Capsules, user).await
}

/// GET /chrono/view/ebs-snapshots
async fn view_ebs_snapshots(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Document>>, AppError> {
    list_owned(&state, Collection::EbsSnapshots, user).await
}

/// GET /chrono/view/ec2-instances
async fn view_ec2_instances(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<Document>>, AppError> {
    list_owned(&state, Collection::Ec2Instances, user).await
}
