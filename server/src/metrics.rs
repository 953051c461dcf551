//! Prometheus metrics for the booking server.
//!
//! # Exported Metrics
//!
//! - `booking_tickets_booked_total{backend}` - Tickets booked, by serving backend
//! - `booking_fallback_switches_total` - Switches from the durable store to memory
//! - `booking_seats_provisioned_total` - Showtimes whose seat batch was created

use axum::{Router, routing::get};
use metrics::describe_counter;
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and describe the booking metrics.
///
/// # Errors
///
/// Returns [`BuildError`] if a global recorder is already installed.
pub fn install() -> Result<PrometheusHandle, BuildError> {
    let handle = PrometheusBuilder::new().install_recorder()?;
    register_booking_metrics();
    Ok(handle)
}

/// Register descriptions for all booking metrics.
pub fn register_booking_metrics() {
    describe_counter!(
        "booking_tickets_booked_total",
        "Total number of tickets booked, by backend (durable, fallback)"
    );
    describe_counter!(
        "booking_fallback_switches_total",
        "Times the durable store failed and bookings moved to in-memory storage"
    );
    describe_counter!(
        "booking_seats_provisioned_total",
        "Showtimes whose seat inventory was provisioned"
    );

    tracing::info!("Booking metrics registered");
}

/// Router serving the rendered registry at `GET /metrics`.
pub fn router(handle: PrometheusHandle) -> Router {
    Router::new().route("/metrics", get(move || std::future::ready(handle.render())))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use axum_test::TestServer;

    #[tokio::test]
    async fn metrics_endpoint_renders_registry() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        metrics::with_local_recorder(&recorder, || {
            metrics::counter!("booking_fallback_switches_total").increment(1);
        });

        let server = TestServer::new(router(handle)).unwrap();
        let response = server.get("/metrics").await;

        response.assert_status_ok();
        assert!(response.text().contains("booking_fallback_switches_total 1"));
    }
}
