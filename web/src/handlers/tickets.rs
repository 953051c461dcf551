//! Ticket booking endpoints.
//!
//! - POST `/api/book-ticket` - book a ticket and allocate a seat
//! - GET `/api/view-ticket?email=` - tickets held by an email
//! - GET `/api/view-attendees?movie_title=&showtime=` - attendees of a showtime
//! - DELETE `/api/cancel-ticket` - cancel a ticket
//! - PUT `/api/modify-seat` - move a ticket to another seat

use crate::WebResult;
use crate::extractors::{ApiJson, ApiQuery};
use crate::middleware::CorrelationId;
use crate::state::AppState;
use axum::{Json, extract::State};
use cinema_booking_core::{
    Attendee, BookTicketRequest, CancelTicketRequest, ModifySeatRequest, Ticket, TicketConfirmation,
};
use serde::{Deserialize, Serialize};

// ============================================================================
// Request / Response Types
// ============================================================================

/// Query for `GET /api/view-ticket`.
#[derive(Debug, Deserialize)]
pub struct ViewTicketQuery {
    /// Ticket holder email
    pub email: String,
}

/// Query for `GET /api/view-attendees`.
#[derive(Debug, Deserialize)]
pub struct ViewAttendeesQuery {
    /// Movie title
    pub movie_title: String,
    /// Showtime
    pub showtime: String,
}

/// Response for a successful booking.
#[derive(Debug, Serialize)]
pub struct BookTicketResponse {
    /// Fixed success message
    pub message: &'static str,
    /// The issued ticket
    pub ticket: TicketConfirmation,
}

/// Response listing an email's tickets.
#[derive(Debug, Serialize)]
pub struct ViewTicketResponse {
    /// All tickets held by the email
    pub ticket: Vec<Ticket>,
}

/// Response listing a showtime's attendees.
#[derive(Debug, Serialize)]
pub struct ViewAttendeesResponse {
    /// Name and seat of each attendee
    pub attendees: Vec<Attendee>,
}

/// Response carrying only a message.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    /// Fixed success message
    pub message: &'static str,
}

/// Response for a seat change.
#[derive(Debug, Serialize)]
pub struct ModifySeatResponse {
    /// Fixed success message
    pub message: &'static str,
    /// Seat label as submitted
    pub new_seat_number: String,
}

// ============================================================================
// Handlers
// ============================================================================

/// Book a ticket.
///
/// # Example
///
/// ```bash
/// curl -X POST http://localhost:8080/api/book-ticket \
///   -H 'Content-Type: application/json' \
///   -d '{"name":"Ann","email":"ann@x.com","movie_title":"Dune","showtime":"7PM"}'
/// # {"message":"Ticket booked successfully","ticket":{...,"seat_number":"A1","status":"Confirmed"}}
/// ```
///
/// # Errors
///
/// 422 on invalid fields, 409 if already booked or sold out.
pub async fn book_ticket(
    State(state): State<AppState>,
    correlation_id: CorrelationId,
    ApiJson(request): ApiJson<BookTicketRequest>,
) -> WebResult<Json<BookTicketResponse>> {
    let ticket = state.service.book_ticket(request).await?;

    tracing::debug!(%correlation_id, seat = %ticket.seat_number, "Booking confirmed");

    Ok(Json(BookTicketResponse {
        message: "Ticket booked successfully",
        ticket,
    }))
}

/// List the tickets held by an email.
///
/// # Errors
///
/// 422 on a blank email, 404 if the email holds no tickets.
pub async fn view_ticket(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ViewTicketQuery>,
) -> WebResult<Json<ViewTicketResponse>> {
    let ticket = state.service.view_ticket(&query.email).await?;
    Ok(Json(ViewTicketResponse { ticket }))
}

/// List the attendees of a showtime.
///
/// # Errors
///
/// 422 on blank fields, 404 if nobody is booked.
pub async fn view_attendees(
    State(state): State<AppState>,
    ApiQuery(query): ApiQuery<ViewAttendeesQuery>,
) -> WebResult<Json<ViewAttendeesResponse>> {
    let attendees = state
        .service
        .view_attendees(&query.movie_title, &query.showtime)
        .await?;
    Ok(Json(ViewAttendeesResponse { attendees }))
}

/// Cancel a ticket.
///
/// # Errors
///
/// 422 on invalid fields, 404 if no such ticket exists.
pub async fn cancel_ticket(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<CancelTicketRequest>,
) -> WebResult<Json<MessageResponse>> {
    state.service.cancel_ticket(request).await?;
    Ok(Json(MessageResponse {
        message: "Ticket successfully canceled.",
    }))
}

/// Move a ticket to another seat.
///
/// # Errors
///
/// 422 on invalid fields, 404 if no such ticket exists.
pub async fn modify_seat(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ModifySeatRequest>,
) -> WebResult<Json<ModifySeatResponse>> {
    let new_seat_number = request.new_seat_number.clone();
    state.service.modify_seat(request).await?;
    Ok(Json(ModifySeatResponse {
        message: "Seat updated successfully",
        new_seat_number,
    }))
}
