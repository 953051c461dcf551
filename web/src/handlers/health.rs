//! Liveness endpoints.
//!
//! Neither endpoint touches a store; `/health` only reports which backend the
//! next booking operation will use.

use crate::state::AppState;
use axum::{Json, extract::State, http::StatusCode};
use cinema_booking_core::BackendMode;
use serde::Serialize;

/// Root greeting.
#[derive(Debug, Serialize)]
pub struct RootResponse {
    /// Fixed greeting
    pub message: &'static str,
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Service status
    pub status: &'static str,
    /// Service version
    pub version: &'static str,
    /// Backend serving bookings
    pub backend: BackendMode,
}

/// Root endpoint.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/
/// # {"message":"Server is up and running"}
/// ```
#[allow(clippy::unused_async)]
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "Server is up and running",
    })
}

/// Health check endpoint.
///
/// Returns 200 OK in both modes; fallback mode is degraded but serving.
///
/// # Example
///
/// ```bash
/// curl http://localhost:8080/health
/// # {"status":"ok","version":"0.1.0","backend":"durable"}
/// ```
#[allow(clippy::unused_async)]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    (
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
            backend: state.service.backend_mode(),
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use cinema_booking_core::BookingService;

    #[tokio::test]
    async fn test_root_message() {
        let Json(body) = root().await;
        assert_eq!(body.message, "Server is up and running");
    }

    #[tokio::test]
    async fn test_health_reports_fallback_backend() {
        let state = AppState::new(BookingService::fallback_only());

        let (status, Json(body)) = health_check(State(state)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, "ok");
        assert_eq!(body.backend, BackendMode::Fallback);
    }
}
