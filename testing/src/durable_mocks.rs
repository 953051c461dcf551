//! In-memory stand-in for the durable backend.
//!
//! [`FlakyDurableStore`] reproduces the durable semantics (seat inventory,
//! numeric allocation order, unique `(email, showtime)` tickets) without a
//! database, and can be told to fail so failover can be exercised.

#![allow(clippy::unwrap_used)] // Test infrastructure uses unwrap for simplicity
#![allow(clippy::missing_panics_doc)] // Panics only on a poisoned lock

use chrono::{DateTime, Utc};
use cinema_booking_core::store::{SeatInventory, StoreFuture, TicketStore};
use cinema_booking_core::{Attendee, Seat, SeatNumber, StoreError, Ticket};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Which calls should fail.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Fault {
    Healthy,
    Everything,
    Operation(&'static str),
}

#[derive(Debug, Default)]
struct DurableState {
    seats: HashMap<(String, String), Vec<Seat>>,
    tickets: HashMap<(String, String), Ticket>,
}

/// Durable-backend double with fault injection.
///
/// Operation names accepted by [`FlakyDurableStore::fail_operation`] are the
/// trait method names: `provision_if_absent`, `allocate_next`, `mark_booked`,
/// `release_seat`, `exists`, `create`, `find_by_email`, `find_attendees`,
/// `delete`, `update_seat`.
///
/// # Example
///
/// ```
/// use cinema_booking_testing::FlakyDurableStore;
///
/// let store = FlakyDurableStore::new();
/// store.fail_everything();
/// assert_eq!(store.calls(), 0);
/// store.recover();
/// ```
#[derive(Debug)]
pub struct FlakyDurableStore {
    state: RwLock<DurableState>,
    fault: RwLock<Fault>,
    calls: AtomicUsize,
}

impl FlakyDurableStore {
    /// Create a healthy, empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(DurableState::default()),
            fault: RwLock::new(Fault::Healthy),
            calls: AtomicUsize::new(0),
        }
    }

    /// Make every call fail with a database error.
    pub fn fail_everything(&self) {
        *self.fault.write().unwrap() = Fault::Everything;
    }

    /// Make only calls to the named operation fail.
    pub fn fail_operation(&self, operation: &'static str) {
        *self.fault.write().unwrap() = Fault::Operation(operation);
    }

    /// Stop failing.
    pub fn recover(&self) {
        *self.fault.write().unwrap() = Fault::Healthy;
    }

    /// Number of calls that reached the store, failed ones included.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Seats of a showtime in allocation order.
    #[must_use]
    pub fn seats(&self, movie_title: &str, showtime: &str) -> Vec<Seat> {
        self.state
            .read()
            .unwrap()
            .seats
            .get(&(movie_title.to_string(), showtime.to_string()))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of stored tickets.
    #[must_use]
    pub fn ticket_count(&self) -> usize {
        self.state.read().unwrap().tickets.len()
    }

    /// Mark a seat booked without a ticket, to stage sold-out showtimes.
    pub fn book_seat_directly(&self, movie_title: &str, showtime: &str, seat_number: &SeatNumber) {
        let mut state = self.state.write().unwrap();
        if let Some(seats) = state
            .seats
            .get_mut(&(movie_title.to_string(), showtime.to_string()))
        {
            for seat in seats.iter_mut().filter(|seat| &seat.seat_number == seat_number) {
                seat.is_booked = true;
            }
        }
    }

    fn enter(&self, operation: &'static str) -> Result<(), StoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failing = match &*self.fault.read().unwrap() {
            Fault::Healthy => false,
            Fault::Everything => true,
            Fault::Operation(name) => *name == operation,
        };
        if failing {
            return Err(StoreError::Database(format!("injected failure in {operation}")));
        }
        Ok(())
    }
}

impl Default for FlakyDurableStore {
    fn default() -> Self {
        Self::new()
    }
}

fn key(a: &str, b: &str) -> (String, String) {
    (a.to_string(), b.to_string())
}

impl SeatInventory for FlakyDurableStore {
    fn provision_if_absent<'a>(
        &'a self,
        movie_title: &'a str,
        showtime: &'a str,
        size: u32,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            self.enter("provision_if_absent")?;
            let mut state = self.state.write().unwrap();
            let seats = state.seats.entry(key(movie_title, showtime)).or_default();
            if !seats.is_empty() {
                return Ok(false);
            }
            let now = Utc::now();
            seats.extend((1..=size).map(|index| Seat {
                movie_title: movie_title.to_string(),
                showtime: showtime.to_string(),
                seat_number: SeatNumber::from_index(index),
                is_booked: false,
                created_at: now,
                updated_at: now,
            }));
            Ok(true)
        })
    }

    fn allocate_next<'a>(&'a self, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, SeatNumber> {
        Box::pin(async move {
            self.enter("allocate_next")?;
            let mut state = self.state.write().unwrap();
            state
                .seats
                .get_mut(&key(movie_title, showtime))
                .and_then(|seats| seats.iter_mut().find(|seat| !seat.is_booked))
                .map(|seat| {
                    seat.is_booked = true;
                    seat.updated_at = Utc::now();
                    seat.seat_number.clone()
                })
                .ok_or_else(|| StoreError::SoldOut {
                    movie_title: movie_title.to_string(),
                    showtime: showtime.to_string(),
                })
        })
    }

    fn mark_booked<'a>(
        &'a self,
        movie_title: &'a str,
        showtime: &'a str,
        seat_number: &'a SeatNumber,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.enter("mark_booked")?;
            let mut state = self.state.write().unwrap();
            if let Some(seat) = state
                .seats
                .get_mut(&key(movie_title, showtime))
                .and_then(|seats| seats.iter_mut().find(|seat| &seat.seat_number == seat_number))
            {
                seat.is_booked = true;
                seat.updated_at = Utc::now();
            }
            Ok(())
        })
    }

    fn release_seat<'a>(
        &'a self,
        movie_title: &'a str,
        showtime: &'a str,
        seat_number: &'a SeatNumber,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.enter("release_seat")?;
            let mut state = self.state.write().unwrap();
            if let Some(seat) = state
                .seats
                .get_mut(&key(movie_title, showtime))
                .and_then(|seats| seats.iter_mut().find(|seat| &seat.seat_number == seat_number))
            {
                seat.is_booked = false;
                seat.updated_at = Utc::now();
            }
            Ok(())
        })
    }
}

impl TicketStore for FlakyDurableStore {
    fn exists<'a>(&'a self, email: &'a str, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            self.enter("exists")?;
            let state = self.state.read().unwrap();
            Ok(state
                .tickets
                .get(&key(email, showtime))
                .is_some_and(|ticket| ticket.movie_title == movie_title))
        })
    }

    fn create<'a>(&'a self, ticket: &'a Ticket) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.enter("create")?;
            let mut state = self.state.write().unwrap();
            let ticket_key = key(&ticket.email, &ticket.showtime);
            if state.tickets.contains_key(&ticket_key) {
                return Err(StoreError::Duplicate {
                    email: ticket.email.clone(),
                    showtime: ticket.showtime.clone(),
                });
            }
            state.tickets.insert(ticket_key, ticket.clone());
            Ok(())
        })
    }

    fn find_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Vec<Ticket>> {
        Box::pin(async move {
            self.enter("find_by_email")?;
            let state = self.state.read().unwrap();
            Ok(state
                .tickets
                .values()
                .filter(|ticket| ticket.email == email)
                .cloned()
                .collect())
        })
    }

    fn find_attendees<'a>(&'a self, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, Vec<Attendee>> {
        Box::pin(async move {
            self.enter("find_attendees")?;
            let state = self.state.read().unwrap();
            Ok(state
                .tickets
                .values()
                .filter(|ticket| ticket.movie_title == movie_title && ticket.showtime == showtime)
                .map(Ticket::attendee)
                .collect())
        })
    }

    fn delete<'a>(&'a self, email: &'a str, showtime: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.enter("delete")?;
            let mut state = self.state.write().unwrap();
            state
                .tickets
                .remove(&key(email, showtime))
                .map(|_| ())
                .ok_or_else(|| StoreError::NotFound {
                    email: email.to_string(),
                    showtime: showtime.to_string(),
                })
        })
    }

    fn update_seat<'a>(
        &'a self,
        email: &'a str,
        showtime: &'a str,
        new_seat: &'a SeatNumber,
        updated_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            self.enter("update_seat")?;
            let mut state = self.state.write().unwrap();
            let ticket = state
                .tickets
                .get_mut(&key(email, showtime))
                .ok_or_else(|| StoreError::NotFound {
                    email: email.to_string(),
                    showtime: showtime.to_string(),
                })?;
            ticket.seat_number = new_seat.clone();
            ticket.updated_at = updated_at;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn provisioning_happens_once() {
        let store = FlakyDurableStore::new();

        assert!(store.provision_if_absent("Dune", "7PM", 3).await.unwrap());
        assert!(!store.provision_if_absent("Dune", "7PM", 3).await.unwrap());
        assert_eq!(store.seats("Dune", "7PM").len(), 3);
    }

    #[tokio::test]
    async fn allocation_follows_numeric_order() {
        let store = FlakyDurableStore::new();
        store.provision_if_absent("Dune", "7PM", 12).await.unwrap();
        for index in 1..=9 {
            store.book_seat_directly("Dune", "7PM", &SeatNumber::from_index(index));
        }

        let next = store.allocate_next("Dune", "7PM").await.unwrap();
        assert_eq!(next.as_str(), "A10");
    }

    #[tokio::test]
    async fn allocation_claims_the_seat() {
        let store = FlakyDurableStore::new();
        store.provision_if_absent("Dune", "7PM", 2).await.unwrap();

        let first = store.allocate_next("Dune", "7PM").await.unwrap();
        let second = store.allocate_next("Dune", "7PM").await.unwrap();
        assert_eq!((first.as_str(), second.as_str()), ("A1", "A2"));
        assert!(store.allocate_next("Dune", "7PM").await.is_err());

        store.release_seat("Dune", "7PM", &first).await.unwrap();
        assert_eq!(store.allocate_next("Dune", "7PM").await.unwrap(), first);
    }

    #[tokio::test]
    async fn injected_faults_are_database_errors() {
        let store = FlakyDurableStore::new();
        store.fail_operation("create");

        assert!(store.exists("ann@x.com", "Dune", "7PM").await.is_ok());
        let ticket = Ticket::confirmed(
            &cinema_booking_core::BookTicketRequest::new("Ann", "ann@x.com", "Dune", "7PM"),
            SeatNumber::from_index(1),
            Utc::now(),
        );
        let err = store.create(&ticket).await.unwrap_err();
        assert!(err.is_durability_fault());
        assert_eq!(store.calls(), 2);
    }
}
