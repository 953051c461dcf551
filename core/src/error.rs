//! Error types for the booking engine.
//!
//! Two layers: [`StoreError`] is what a storage backend reports, and
//! [`BookingError`] is what a use case surfaces to its caller. Only
//! [`StoreError::Database`] counts as a durability fault; the orchestrator
//! absorbs it by switching to the fallback store.

use thiserror::Error;

/// Errors reported by a storage backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A ticket already exists for this `(email, showtime)` pair.
    #[error("Ticket already exists for {email} at {showtime}")]
    Duplicate {
        /// Ticket holder email
        email: String,
        /// Showtime
        showtime: String,
    },

    /// Every provisioned seat of the showtime is booked.
    #[error("No free seats for {movie_title} at {showtime}")]
    SoldOut {
        /// Movie title
        movie_title: String,
        /// Showtime
        showtime: String,
    },

    /// No ticket exists for this `(email, showtime)` pair.
    #[error("Ticket not found for {email} at {showtime}")]
    NotFound {
        /// Ticket holder email
        email: String,
        /// Showtime
        showtime: String,
    },

    /// The backend itself failed (connection, query, pool timeout).
    #[error("Database error: {0}")]
    Database(String),
}

impl StoreError {
    /// Whether this error means the backend can no longer be trusted.
    #[must_use]
    pub const fn is_durability_fault(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

/// Errors surfaced by booking use cases.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// A required field is missing or malformed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// The email already holds a ticket for this showtime.
    #[error("Email {email} already booked for showtime {showtime}")]
    AlreadyBooked {
        /// Ticket holder email
        email: String,
        /// Showtime
        showtime: String,
    },

    /// The showtime is sold out.
    #[error("No available seats for {movie_title} at {showtime}")]
    NoAvailableSeats {
        /// Movie title
        movie_title: String,
        /// Showtime
        showtime: String,
    },

    /// The email holds no tickets.
    #[error("No tickets found for {email}")]
    NoTicketsFound {
        /// Email that was looked up
        email: String,
    },

    /// Nobody holds a ticket for this showtime.
    #[error("No attendees found for {movie_title} at {showtime}")]
    NoAttendeesFound {
        /// Movie title
        movie_title: String,
        /// Showtime
        showtime: String,
    },

    /// No ticket exists for the `(email, showtime)` pair.
    #[error("Ticket not found for {email} at {showtime}")]
    TicketNotFound {
        /// Ticket holder email
        email: String,
        /// Showtime
        showtime: String,
    },

    /// The active backend failed and no further fallback exists.
    #[error("Storage failure: {0}")]
    Durability(String),
}

impl From<StoreError> for BookingError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate { email, showtime } => Self::AlreadyBooked { email, showtime },
            StoreError::SoldOut {
                movie_title,
                showtime,
            } => Self::NoAvailableSeats {
                movie_title,
                showtime,
            },
            StoreError::NotFound { email, showtime } => Self::TicketNotFound { email, showtime },
            StoreError::Database(reason) => Self::Durability(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_database_errors_are_durability_faults() {
        assert!(StoreError::Database("connection reset".to_string()).is_durability_fault());
        assert!(!StoreError::NotFound {
            email: "a@b.co".to_string(),
            showtime: "7PM".to_string(),
        }
        .is_durability_fault());
    }

    #[test]
    fn duplicate_maps_to_already_booked() {
        let err = BookingError::from(StoreError::Duplicate {
            email: "ann@x.com".to_string(),
            showtime: "7PM".to_string(),
        });
        assert_eq!(
            err,
            BookingError::AlreadyBooked {
                email: "ann@x.com".to_string(),
                showtime: "7PM".to_string(),
            }
        );
        assert_eq!(err.to_string(), "Email ann@x.com already booked for showtime 7PM");
    }

    #[test]
    fn sold_out_maps_to_no_available_seats() {
        let err = BookingError::from(StoreError::SoldOut {
            movie_title: "Dune".to_string(),
            showtime: "7PM".to_string(),
        });
        assert!(matches!(err, BookingError::NoAvailableSeats { .. }));
    }
}
