//! # Cinema Booking Core
//!
//! Booking, seat allocation and store failover for movie showtimes.
//!
//! ## Core Concepts
//!
//! - **Ticket**: at most one per `(email, showtime)`; cancellation deletes it
//! - **Seat inventory**: 50 seats per `(movie, showtime)`, provisioned on the
//!   first booking and allocated lowest-number-first
//! - **Durable backend**: the primary store (`PostgreSQL` in production)
//! - **Fallback store**: a volatile in-process map used once the durable
//!   backend has failed
//! - **Availability monitor**: one-way flag selecting between the two
//!
//! ## Example
//!
//! ```ignore
//! use cinema_booking_core::{BookTicketRequest, BookingService};
//! use cinema_booking_postgres::PostgresBookingStore;
//! use std::sync::Arc;
//!
//! let durable = Arc::new(PostgresBookingStore::from_pool(pool));
//! let service = BookingService::new(durable);
//!
//! let confirmation = service
//!     .book_ticket(BookTicketRequest::new("Ann", "ann@x.com", "Dune", "7PM"))
//!     .await?;
//! ```

pub mod availability;
pub mod error;
pub mod memory;
pub mod service;
pub mod store;
pub mod types;
pub mod validation;

pub use availability::AvailabilityMonitor;
pub use error::{BookingError, StoreError};
pub use memory::InMemoryBookingStore;
pub use service::BookingService;
pub use store::{BookingBackend, SeatInventory, StoreFuture, TicketStore};
pub use types::{
    Attendee, BackendMode, BookTicketRequest, CancelTicketRequest, DEFAULT_SEATS_PER_SHOWTIME,
    MAX_SEATS_PER_SHOWTIME, ModifySeatRequest, Seat, SeatNumber, Ticket, TicketConfirmation,
    TicketStatus,
};

/// Environment module - Dependency injection traits
///
/// External dependencies the engine needs beyond its stores are abstracted
/// behind traits so tests can substitute deterministic implementations.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```ignore
    /// // Test - fixed time for deterministic tests
    /// struct FixedClock { time: DateTime<Utc> }
    /// impl Clock for FixedClock {
    ///     fn now(&self) -> DateTime<Utc> {
    ///         self.time
    ///     }
    /// }
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Production clock backed by the system time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}
