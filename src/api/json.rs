//! JSON body extractor with `AppError` rejections
//!
//! `axum::Json` answers a bad body with a plain-text rejection. Wrapping it
//! keeps the `{"message": ...}` shape and the error counter for those cases.

use axum::extract::FromRequest;

use crate::error::AppError;

/// `axum::Json` whose rejection is an `AppError::Validation`
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
