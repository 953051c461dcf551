//! End-to-end tests of the HTTP surface using `axum-test`.
//!
//! Runs the full router (middleware included) against a `BookingService`
//! backed by the fault-injectable durable double.

#![allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect

use axum::http::StatusCode;
use axum_test::TestServer;
use cinema_booking_core::BookingService;
use cinema_booking_testing::{FlakyDurableStore, test_clock};
use cinema_booking_web::{AppState, CORRELATION_ID_HEADER, build_router};
use serde_json::{Value, json};
use std::sync::Arc;

// ============================================================================
// Test Fixtures
// ============================================================================

fn server() -> (TestServer, Arc<FlakyDurableStore>) {
    let durable = Arc::new(FlakyDurableStore::new());
    let service = BookingService::new(durable.clone()).with_clock(Arc::new(test_clock()));
    let server = TestServer::new(build_router(AppState::new(service))).unwrap();
    (server, durable)
}

fn booking(name: &str, email: &str) -> Value {
    json!({
        "name": name,
        "email": email,
        "movie_title": "Dune",
        "showtime": "7PM",
    })
}

// ============================================================================
// Liveness
// ============================================================================

#[tokio::test]
async fn test_root_reports_running() {
    let (server, _) = server();

    let response = server.get("/").await;

    response.assert_status_ok();
    response.assert_json(&json!({"message": "Server is up and running"}));
}

#[tokio::test]
async fn test_health_reports_backend_mode() {
    let (server, durable) = server();

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["backend"], "durable");

    durable.fail_everything();
    server.post("/api/book-ticket").json(&booking("Ann", "ann@x.com")).await.assert_status_ok();

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["backend"], "fallback");
}

#[tokio::test]
async fn test_every_response_carries_correlation_id() {
    let (server, _) = server();

    let response = server.get("/api/view-ticket").add_query_param("email", "nobody@x.com").await;

    let header = response.header(CORRELATION_ID_HEADER);
    assert!(uuid::Uuid::parse_str(header.to_str().unwrap()).is_ok());
}

// ============================================================================
// Booking flow
// ============================================================================

#[tokio::test]
async fn test_book_ticket_returns_confirmation() {
    let (server, _) = server();

    let response = server.post("/api/book-ticket").json(&booking("Ann", "ann@x.com")).await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Ticket booked successfully",
        "ticket": {
            "name": "Ann",
            "email": "ann@x.com",
            "movie_title": "Dune",
            "showtime": "7PM",
            "seat_number": "A1",
            "status": "Confirmed",
        }
    }));
}

#[tokio::test]
async fn test_full_scenario_over_http() {
    let (server, _) = server();

    server.post("/api/book-ticket").json(&booking("Ann", "ann@x.com")).await.assert_status_ok();
    let bo: Value = server.post("/api/book-ticket").json(&booking("Bo", "bo@x.com")).await.json();
    assert_eq!(bo["ticket"]["seat_number"], "A2");

    let response = server
        .delete("/api/cancel-ticket")
        .json(&json!({"email": "ann@x.com", "showtime": "7PM"}))
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({"message": "Ticket successfully canceled."}));

    let response = server
        .get("/api/view-attendees")
        .add_query_param("movie_title", "Dune")
        .add_query_param("showtime", "7PM")
        .await;
    response.assert_status_ok();
    response.assert_json(&json!({"attendees": [{"name": "Bo", "seat_number": "A2"}]}));
}

#[tokio::test]
async fn test_view_ticket_lists_full_records() {
    let (server, _) = server();
    server.post("/api/book-ticket").json(&booking("Ann", "ann@x.com")).await.assert_status_ok();

    let body: Value = server
        .get("/api/view-ticket")
        .add_query_param("email", "ann@x.com")
        .await
        .json();

    let tickets = body["ticket"].as_array().unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0]["seat_number"], "A1");
    assert_eq!(tickets[0]["created_at"], "2025-01-01T00:00:00Z");
}

#[tokio::test]
async fn test_modify_seat_echoes_new_seat() {
    let (server, _) = server();
    server.post("/api/book-ticket").json(&booking("Ann", "ann@x.com")).await.assert_status_ok();

    let response = server
        .put("/api/modify-seat")
        .json(&json!({"email": "ann@x.com", "showtime": "7PM", "new_seat_number": "B4"}))
        .await;

    response.assert_status_ok();
    response.assert_json(&json!({
        "message": "Seat updated successfully",
        "new_seat_number": "B4",
    }));
}

// ============================================================================
// Error mapping
// ============================================================================

#[tokio::test]
async fn test_duplicate_booking_is_conflict() {
    let (server, _) = server();
    server.post("/api/book-ticket").json(&booking("Ann", "ann@x.com")).await.assert_status_ok();

    let response = server.post("/api/book-ticket").json(&booking("Ann", "ann@x.com")).await;

    response.assert_status(StatusCode::CONFLICT);
    response.assert_json(&json!({
        "code": "CONFLICT",
        "message": "Email ann@x.com already booked for showtime 7PM",
    }));
}

#[tokio::test]
async fn test_blank_field_is_validation_error() {
    let (server, _) = server();

    let response = server.post("/api/book-ticket").json(&booking("  ", "ann@x.com")).await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "name is required");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (server, _) = server();

    let response = server
        .post("/api/book-ticket")
        .json(&json!({"name": "Ann"}))
        .await;

    response.assert_status_bad_request();
    let body: Value = response.json();
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_missing_records_are_not_found() {
    let (server, _) = server();

    server
        .get("/api/view-ticket")
        .add_query_param("email", "nobody@x.com")
        .await
        .assert_status_not_found();
    server
        .get("/api/view-attendees")
        .add_query_param("movie_title", "Dune")
        .add_query_param("showtime", "7PM")
        .await
        .assert_status_not_found();
    server
        .delete("/api/cancel-ticket")
        .json(&json!({"email": "nobody@x.com", "showtime": "7PM"}))
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_missing_query_parameter_is_bad_request() {
    let (server, _) = server();

    server.get("/api/view-attendees").add_query_param("movie_title", "Dune").await.assert_status_bad_request();
}
