//! Application state for Axum handlers.

use cinema_booking_core::BookingService;

/// Application state shared across all HTTP handlers.
///
/// Cloned per request; the service keeps its stores behind `Arc`s.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Booking use cases
    pub service: BookingService,
}

impl AppState {
    /// Create application state around a booking service.
    #[must_use]
    pub const fn new(service: BookingService) -> Self {
        Self { service }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_is_clone() {
        // Axum requires Clone state
        fn assert_clone<T: Clone>() {}
        assert_clone::<AppState>();
    }
}
