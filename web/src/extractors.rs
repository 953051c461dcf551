//! Custom Axum extractors.
//!
//! Thin wrappers over `Json` and `Query` whose rejections render as
//! [`AppError`] bodies instead of axum's plain-text defaults.
//!
//! # Examples
//!
//! ```ignore
//! use cinema_booking_web::extractors::{ApiJson, ApiQuery};
//!
//! async fn handler(ApiJson(request): ApiJson<BookTicketRequest>) -> Result<Json<Value>, AppError> {
//!     // request is already deserialized; malformed bodies never reach here
//! }
//! ```

use crate::error::AppError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON body extractor rejecting with a `BAD_REQUEST` [`AppError`].
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Query string extractor rejecting with a `BAD_REQUEST` [`AppError`].
#[derive(Debug, Clone, Copy, Default, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(AppError))]
pub struct ApiQuery<T>(pub T);
