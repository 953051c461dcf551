//! Domain types for movie ticket booking.
//!
//! Tickets are identified by their `(email, showtime)` pair rather than a
//! surrogate key. Seats are identified by `(movie_title, showtime, seat_number)`
//! and are provisioned in one batch per showtime.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of seats provisioned for a showtime on its first booking.
pub const DEFAULT_SEATS_PER_SHOWTIME: u32 = 50;

/// Largest configurable seat count per showtime.
pub const MAX_SEATS_PER_SHOWTIME: u32 = 10_000;

/// Prefix of generated seat labels (`A1`, `A2`, ...).
pub const SEAT_PREFIX: &str = "A";

// ============================================================================
// Seat numbers
// ============================================================================

/// Label of a seat within a showtime.
///
/// Provisioned seats carry a 1-based index and render as `A{index}`. A seat
/// label supplied by a caller (see [`ModifySeatRequest`]) is kept verbatim and
/// need not follow that format.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeatNumber(String);

impl SeatNumber {
    /// Create a seat number from an arbitrary label.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// Create the seat number for a 1-based provisioning index.
    #[must_use]
    pub fn from_index(index: u32) -> Self {
        Self(format!("{SEAT_PREFIX}{index}"))
    }

    /// The provisioning index encoded in the label, if it has the generated shape.
    #[must_use]
    pub fn index(&self) -> Option<u32> {
        self.0.strip_prefix(SEAT_PREFIX)?.parse().ok()
    }

    /// The label as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeatNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Tickets
// ============================================================================

/// Booking status of a ticket.
///
/// Cancellation deletes the ticket, so `Confirmed` is the only live status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Seat allocated and ticket issued
    Confirmed,
}

impl TicketStatus {
    /// Database/string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Confirmed => "Confirmed",
        }
    }

    /// Parse from the string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Confirmed" => Some(Self::Confirmed),
            _ => None,
        }
    }
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A booked ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Attendee name
    pub name: String,
    /// Attendee email (half of the dedup key)
    pub email: String,
    /// Movie title
    pub movie_title: String,
    /// Showtime (half of the dedup key)
    pub showtime: String,
    /// Assigned seat
    pub seat_number: SeatNumber,
    /// Booking status
    pub status: TicketStatus,
    /// When the ticket was booked
    pub created_at: DateTime<Utc>,
    /// When the ticket was last changed
    pub updated_at: DateTime<Utc>,
}

impl Ticket {
    /// Build a confirmed ticket for a validated booking request.
    #[must_use]
    pub fn confirmed(request: &BookTicketRequest, seat_number: SeatNumber, now: DateTime<Utc>) -> Self {
        Self {
            name: request.name.clone(),
            email: request.email.clone(),
            movie_title: request.movie_title.clone(),
            showtime: request.showtime.clone(),
            seat_number,
            status: TicketStatus::Confirmed,
            created_at: now,
            updated_at: now,
        }
    }

    /// The confirmation handed back to the booker.
    #[must_use]
    pub fn confirmation(&self) -> TicketConfirmation {
        TicketConfirmation {
            name: self.name.clone(),
            email: self.email.clone(),
            movie_title: self.movie_title.clone(),
            showtime: self.showtime.clone(),
            seat_number: self.seat_number.clone(),
            status: self.status,
        }
    }

    /// The attendee projection of this ticket.
    #[must_use]
    pub fn attendee(&self) -> Attendee {
        Attendee {
            name: self.name.clone(),
            seat_number: self.seat_number.clone(),
        }
    }
}

/// A provisioned seat for one showtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    /// Movie title
    pub movie_title: String,
    /// Showtime
    pub showtime: String,
    /// Seat label
    pub seat_number: SeatNumber,
    /// Whether a ticket holds this seat
    pub is_booked: bool,
    /// When the seat was provisioned
    pub created_at: DateTime<Utc>,
    /// When the seat last flipped
    pub updated_at: DateTime<Utc>,
}

// ============================================================================
// Requests
// ============================================================================

/// Request to book a ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookTicketRequest {
    /// Attendee name
    pub name: String,
    /// Attendee email
    pub email: String,
    /// Movie title
    pub movie_title: String,
    /// Showtime
    pub showtime: String,
}

impl BookTicketRequest {
    /// Convenience constructor.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        movie_title: impl Into<String>,
        showtime: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            movie_title: movie_title.into(),
            showtime: showtime.into(),
        }
    }
}

/// Request to cancel a ticket.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelTicketRequest {
    /// Ticket holder email
    pub email: String,
    /// Showtime of the ticket
    pub showtime: String,
}

impl CancelTicketRequest {
    /// Convenience constructor.
    #[must_use]
    pub fn new(email: impl Into<String>, showtime: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            showtime: showtime.into(),
        }
    }
}

/// Request to move a ticket to another seat.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModifySeatRequest {
    /// Ticket holder email
    pub email: String,
    /// Showtime of the ticket
    pub showtime: String,
    /// Seat label to move to
    pub new_seat_number: String,
}

impl ModifySeatRequest {
    /// Convenience constructor.
    #[must_use]
    pub fn new(
        email: impl Into<String>,
        showtime: impl Into<String>,
        new_seat_number: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            showtime: showtime.into(),
            new_seat_number: new_seat_number.into(),
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Confirmation returned after a successful booking.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketConfirmation {
    /// Attendee name
    pub name: String,
    /// Attendee email
    pub email: String,
    /// Movie title
    pub movie_title: String,
    /// Showtime
    pub showtime: String,
    /// Assigned seat
    pub seat_number: SeatNumber,
    /// Booking status
    pub status: TicketStatus,
}

/// Attendee of a showtime.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    /// Attendee name
    pub name: String,
    /// Seat held by the attendee
    pub seat_number: SeatNumber,
}

/// Backend that serves the next operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Durable store is in use
    Durable,
    /// Volatile in-process store is in use
    Fallback,
}

impl BackendMode {
    /// Label used in logs and metrics.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Durable => "durable",
            Self::Fallback => "fallback",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;

    #[test]
    fn seat_number_from_index() {
        let seat = SeatNumber::from_index(7);
        assert_eq!(seat.as_str(), "A7");
        assert_eq!(seat.index(), Some(7));
    }

    #[test]
    fn custom_seat_label_has_no_index() {
        assert_eq!(SeatNumber::new("B12").index(), None);
        assert_eq!(SeatNumber::new("A").index(), None);
    }

    #[test]
    fn ticket_status_parse() {
        assert_eq!(TicketStatus::parse("Confirmed"), Some(TicketStatus::Confirmed));
        assert_eq!(TicketStatus::parse("Cancelled"), None);
    }

    #[test]
    fn confirmation_serializes_snake_case() {
        let request = BookTicketRequest::new("Ann", "ann@x.com", "Dune", "7PM");
        let ticket = Ticket::confirmed(&request, SeatNumber::from_index(1), Utc::now());
        let json = serde_json::to_value(ticket.confirmation()).unwrap();

        assert_eq!(json["movie_title"], "Dune");
        assert_eq!(json["seat_number"], "A1");
        assert_eq!(json["status"], "Confirmed");
    }

    #[test]
    fn backend_mode_serializes_lowercase() {
        let json = serde_json::to_value(BackendMode::Fallback).unwrap();
        assert_eq!(json, "fallback");
    }
}
