//! Storage traits for seats and tickets.
//!
//! The booking algorithm is written once against [`BookingBackend`]. Two
//! implementations exist:
//!
//! - **`PostgresBookingStore`** (in `cinema-booking-postgres`): the durable backend
//! - **[`InMemoryBookingStore`](crate::memory::InMemoryBookingStore)**: the volatile
//!   fallback used once the durable backend is judged unavailable
//!
//! # Dyn Compatibility
//!
//! Methods return `Pin<Box<dyn Future>>` instead of using `async fn` so the
//! orchestrator can hold backends as `Arc<dyn BookingBackend>`.

use crate::error::StoreError;
use crate::types::{Attendee, SeatNumber, Ticket};
use chrono::{DateTime, Utc};
use std::future::Future;
use std::pin::Pin;

/// Boxed future returned by storage operations.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, StoreError>> + Send + 'a>>;

/// Per-showtime seat inventory.
pub trait SeatInventory: Send + Sync {
    /// Create `size` free seats (`A1..A{size}`) unless the showtime already has seats.
    ///
    /// Returns `true` when this call created the batch. Redundant calls are no-ops.
    ///
    /// # Errors
    ///
    /// - `Database`: backend failure
    fn provision_if_absent<'a>(
        &'a self,
        movie_title: &'a str,
        showtime: &'a str,
        size: u32,
    ) -> StoreFuture<'a, bool>;

    /// Claim the lowest-numbered free seat of the showtime.
    ///
    /// The pick and the claim are one atomic step: concurrent callers never
    /// receive the same seat. A claim whose ticket cannot be stored is handed
    /// back with [`SeatInventory::release_seat`].
    ///
    /// # Errors
    ///
    /// - `SoldOut`: no free seat left
    /// - `Database`: backend failure
    fn allocate_next<'a>(&'a self, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, SeatNumber>;

    /// Record a seat as booked once its ticket exists.
    ///
    /// Idempotent; a seat already claimed by [`SeatInventory::allocate_next`]
    /// only has its `updated_at` refreshed.
    ///
    /// # Errors
    ///
    /// - `Database`: backend failure
    fn mark_booked<'a>(
        &'a self,
        movie_title: &'a str,
        showtime: &'a str,
        seat_number: &'a SeatNumber,
    ) -> StoreFuture<'a, ()>;

    /// Return a claimed seat whose ticket was rejected.
    ///
    /// # Errors
    ///
    /// - `Database`: backend failure
    fn release_seat<'a>(
        &'a self,
        movie_title: &'a str,
        showtime: &'a str,
        seat_number: &'a SeatNumber,
    ) -> StoreFuture<'a, ()>;
}

/// Ticket records keyed by `(email, showtime)`.
pub trait TicketStore: Send + Sync {
    /// Whether `email` already holds a ticket for this movie and showtime.
    ///
    /// # Errors
    ///
    /// - `Database`: backend failure
    fn exists<'a>(&'a self, email: &'a str, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, bool>;

    /// Insert a new ticket. Never overwrites an existing `(email, showtime)` pair.
    ///
    /// # Errors
    ///
    /// - `Duplicate`: the pair is already taken
    /// - `Database`: backend failure
    fn create<'a>(&'a self, ticket: &'a Ticket) -> StoreFuture<'a, ()>;

    /// All tickets held by `email`, in no particular order.
    ///
    /// # Errors
    ///
    /// - `Database`: backend failure
    fn find_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Vec<Ticket>>;

    /// Name and seat of every ticket for the movie and showtime.
    ///
    /// # Errors
    ///
    /// - `Database`: backend failure
    fn find_attendees<'a>(&'a self, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, Vec<Attendee>>;

    /// Delete the ticket for `(email, showtime)`.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such ticket
    /// - `Database`: backend failure
    fn delete<'a>(&'a self, email: &'a str, showtime: &'a str) -> StoreFuture<'a, ()>;

    /// Replace the seat of the ticket for `(email, showtime)`.
    ///
    /// Only the seat label and `updated_at` change. The new seat is **not**
    /// checked against the seat inventory, the old seat is not released and
    /// the new one is not marked booked, so two tickets may end up naming the
    /// same seat.
    ///
    /// # Errors
    ///
    /// - `NotFound`: no such ticket
    /// - `Database`: backend failure
    fn update_seat<'a>(
        &'a self,
        email: &'a str,
        showtime: &'a str,
        new_seat: &'a SeatNumber,
        updated_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()>;
}

/// A complete storage backend: seats plus tickets.
pub trait BookingBackend: SeatInventory + TicketStore {}

impl<T> BookingBackend for T where T: SeatInventory + TicketStore + ?Sized {}
