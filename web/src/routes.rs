//! Router configuration.

use crate::handlers::{health_check, root, tickets};
use crate::middleware::correlation_id_layer;
use crate::state::AppState;
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

/// Build the booking router.
///
/// Every route runs inside the correlation-id span, and `TraceLayer` logs
/// each request and response.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/book-ticket", post(tickets::book_ticket))
        .route("/view-ticket", get(tickets::view_ticket))
        .route("/view-attendees", get(tickets::view_attendees))
        .route("/cancel-ticket", delete(tickets::cancel_ticket))
        .route("/modify-seat", put(tickets::modify_seat));

    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", api_routes)
        .layer(correlation_id_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
