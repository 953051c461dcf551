//! # Cinema Booking Testing
//!
//! Testing utilities for the cinema booking engine.
//!
//! This crate provides:
//! - Mock implementations of the environment traits
//! - [`FlakyDurableStore`], a durable-backend double with fault injection
//! - Request builders for common booking scenarios
//!
//! ## Example
//!
//! ```ignore
//! use cinema_booking_core::BookingService;
//! use cinema_booking_testing::{FlakyDurableStore, helpers, test_clock};
//! use std::sync::Arc;
//!
//! #[tokio::test]
//! async fn failover_is_invisible() {
//!     let durable = Arc::new(FlakyDurableStore::new());
//!     let service = BookingService::new(durable.clone()).with_clock(Arc::new(test_clock()));
//!
//!     durable.fail_everything();
//!     let confirmation = service.book_ticket(helpers::book_request(1)).await.unwrap();
//!     assert_eq!(confirmation.seat_number.as_str(), "A1");
//! }
//! ```

use chrono::{DateTime, Utc};
use cinema_booking_core::environment::Clock;

pub mod durable_mocks;

pub use durable_mocks::FlakyDurableStore;
pub use mocks::{FixedClock, test_clock};

/// Mock implementations of environment traits.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use cinema_booking_testing::mocks::FixedClock;
    /// use cinema_booking_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2);
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    ///
    /// # Panics
    ///
    /// Panics if the hardcoded timestamp fails to parse.
    #[must_use]
    #[allow(clippy::expect_used)]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(
            DateTime::parse_from_rfc3339("2025-01-01T00:00:00Z")
                .expect("hardcoded timestamp should always parse")
                .with_timezone(&Utc),
        )
    }
}

/// Request builders and test setup.
pub mod helpers {
    use cinema_booking_core::{BookTicketRequest, CancelTicketRequest, ModifySeatRequest};

    /// Movie used by the builders.
    pub const MOVIE: &str = "Dune";

    /// Showtime used by the builders.
    pub const SHOWTIME: &str = "7PM";

    /// Email of the `n`th patron.
    #[must_use]
    pub fn patron_email(n: usize) -> String {
        format!("patron{n}@example.com")
    }

    /// Booking for the `n`th patron of [`MOVIE`] at [`SHOWTIME`].
    #[must_use]
    pub fn book_request(n: usize) -> BookTicketRequest {
        BookTicketRequest::new(format!("Patron {n}"), patron_email(n), MOVIE, SHOWTIME)
    }

    /// Cancellation of the `n`th patron's [`SHOWTIME`] ticket.
    #[must_use]
    pub fn cancel_request(n: usize) -> CancelTicketRequest {
        CancelTicketRequest::new(patron_email(n), SHOWTIME)
    }

    /// Seat change for the `n`th patron's [`SHOWTIME`] ticket.
    #[must_use]
    pub fn modify_request(n: usize, new_seat: &str) -> ModifySeatRequest {
        ModifySeatRequest::new(patron_email(n), SHOWTIME, new_seat)
    }

    /// Install a test-writer tracing subscriber once per process.
    ///
    /// Honors `RUST_LOG`; later calls are no-ops.
    pub fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "cinema_booking=debug".into()),
            )
            .with_test_writer()
            .try_init();
    }
}
