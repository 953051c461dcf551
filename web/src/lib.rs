//! Axum HTTP surface for the cinema booking engine.
//!
//! Handlers are thin: they extract the request, call one `BookingService`
//! use case and map the result to JSON. Booking errors become [`AppError`]
//! responses with a stable `code`:
//!
//! | error | status | code |
//! |---|---|---|
//! | validation | 422 | `VALIDATION_ERROR` |
//! | malformed JSON or query | 400 | `BAD_REQUEST` |
//! | already booked, sold out | 409 | `CONFLICT` |
//! | no tickets, attendees or ticket | 404 | `NOT_FOUND` |
//! | anything else | 500 | `INTERNAL_SERVER_ERROR` |
//!
//! # Example
//!
//! ```ignore
//! use cinema_booking_core::BookingService;
//! use cinema_booking_web::{AppState, build_router};
//!
//! let app = build_router(AppState::new(BookingService::fallback_only()));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
//! axum::serve(listener, app).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::AppError;
pub use middleware::{CORRELATION_ID_HEADER, CorrelationId, correlation_id_layer};
pub use routes::build_router;
pub use state::AppState;

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
