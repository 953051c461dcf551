//! Volatile fallback store.
//!
//! Holds every ticket in one map keyed by `(email, showtime)` behind a single
//! mutex. Each operation takes the lock for its whole critical section.
//!
//! The fallback does not model a seat inventory. Its [`SeatInventory`] face
//! hands out labels from a per-showtime counter (`A1`, `A2`, ...). Labels are
//! never reused after a cancellation. A label whose ticket was rejected goes
//! back to the counter only if no later label was issued in between;
//! otherwise it is skipped. There is no capacity limit, and all of it is lost
//! with the process. Seat uniqueness here is therefore weaker than on the
//! durable path.

use crate::error::StoreError;
use crate::store::{SeatInventory, StoreFuture, TicketStore};
use crate::types::{Attendee, SeatNumber, Ticket};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use tokio::sync::Mutex;

/// `(email, showtime)`
type TicketKey = (String, String);

/// `(movie_title, showtime)`
type ShowKey = (String, String);

#[derive(Debug, Default)]
struct MemoryState {
    tickets: HashMap<TicketKey, Ticket>,
    issued_labels: HashMap<ShowKey, u32>,
}

/// In-process ticket store used when the durable backend is unavailable.
#[derive(Debug, Default)]
pub struct InMemoryBookingStore {
    state: Mutex<MemoryState>,
}

impl InMemoryBookingStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live tickets.
    pub async fn len(&self) -> usize {
        self.state.lock().await.tickets.len()
    }

    /// Whether no tickets are held.
    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.tickets.is_empty()
    }
}

fn ticket_key(email: &str, showtime: &str) -> TicketKey {
    (email.to_string(), showtime.to_string())
}

impl SeatInventory for InMemoryBookingStore {
    fn provision_if_absent<'a>(
        &'a self,
        _movie_title: &'a str,
        _showtime: &'a str,
        _size: u32,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async { Ok::<_, StoreError>(false) })
    }

    fn allocate_next<'a>(&'a self, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, SeatNumber> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            let issued = state
                .issued_labels
                .entry((movie_title.to_string(), showtime.to_string()))
                .or_insert(0);
            *issued += 1;
            Ok::<_, StoreError>(SeatNumber::from_index(*issued))
        })
    }

    fn mark_booked<'a>(
        &'a self,
        _movie_title: &'a str,
        _showtime: &'a str,
        _seat_number: &'a SeatNumber,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async { Ok::<_, StoreError>(()) })
    }

    fn release_seat<'a>(
        &'a self,
        movie_title: &'a str,
        showtime: &'a str,
        seat_number: &'a SeatNumber,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if let Some(issued) = state
                .issued_labels
                .get_mut(&(movie_title.to_string(), showtime.to_string()))
            {
                if SeatNumber::from_index(*issued) == *seat_number {
                    *issued -= 1;
                }
            }
            Ok::<_, StoreError>(())
        })
    }
}

impl TicketStore for InMemoryBookingStore {
    fn exists<'a>(&'a self, email: &'a str, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok::<_, StoreError>(state
                .tickets
                .get(&ticket_key(email, showtime))
                .is_some_and(|ticket| ticket.movie_title == movie_title))
        })
    }

    fn create<'a>(&'a self, ticket: &'a Ticket) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            match state.tickets.entry(ticket_key(&ticket.email, &ticket.showtime)) {
                Entry::Occupied(_) => Err(StoreError::Duplicate {
                    email: ticket.email.clone(),
                    showtime: ticket.showtime.clone(),
                }),
                Entry::Vacant(slot) => {
                    slot.insert(ticket.clone());
                    tracing::debug!(
                        email = %ticket.email,
                        showtime = %ticket.showtime,
                        seat = %ticket.seat_number,
                        "Ticket stored in memory"
                    );
                    Ok(())
                }
            }
        })
    }

    fn find_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Vec<Ticket>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok::<_, StoreError>(state
                .tickets
                .values()
                .filter(|ticket| ticket.email == email)
                .cloned()
                .collect())
        })
    }

    fn find_attendees<'a>(&'a self, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, Vec<Attendee>> {
        Box::pin(async move {
            let state = self.state.lock().await;
            Ok::<_, StoreError>(state
                .tickets
                .values()
                .filter(|ticket| ticket.movie_title == movie_title && ticket.showtime == showtime)
                .map(Ticket::attendee)
                .collect())
        })
    }

    fn delete<'a>(&'a self, email: &'a str, showtime: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let mut state = self.state.lock().await;
            if state.tickets.remove(&ticket_key(email, showtime)).is_none() {
                return Err(StoreError::NotFound {
                    email: email.to_string(),
                    showtime: showtime.to_string(),
                });
            }
            tracing::debug!(email, showtime, "Ticket removed from memory");
            Ok(())
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
            let mut state = self.state.lock().await;
            let Some(ticket) = state.tickets.get_mut(&ticket_key(email, showtime)) else {
                return Err(StoreError::NotFound {
                    email: email.to_string(),
                    showtime: showtime.to_string(),
                });
            };
            ticket.seat_number = new_seat.clone();
            ticket.updated_at = updated_at;
            tracing::debug!(email, showtime, seat = %new_seat, "Seat modified in memory");
            Ok(())
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use crate::types::BookTicketRequest;
    use std::sync::Arc;

    fn ticket(name: &str, email: &str, movie: &str, showtime: &str, seat: u32) -> Ticket {
        Ticket::confirmed(
            &BookTicketRequest::new(name, email, movie, showtime),
            SeatNumber::from_index(seat),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn create_rejects_existing_key() {
        let store = InMemoryBookingStore::new();
        store.create(&ticket("Ann", "ann@x.com", "Dune", "7PM", 1)).await.unwrap();

        let err = store
            .create(&ticket("Ann", "ann@x.com", "Alien", "7PM", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { .. }));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn labels_count_up_per_showtime_and_are_not_reused() {
        let store = InMemoryBookingStore::new();

        assert_eq!(store.allocate_next("Dune", "7PM").await.unwrap().as_str(), "A1");
        assert_eq!(store.allocate_next("Dune", "7PM").await.unwrap().as_str(), "A2");
        assert_eq!(store.allocate_next("Dune", "9PM").await.unwrap().as_str(), "A1");

        store.create(&ticket("Ann", "ann@x.com", "Dune", "7PM", 1)).await.unwrap();
        store.delete("ann@x.com", "7PM").await.unwrap();
        assert_eq!(store.allocate_next("Dune", "7PM").await.unwrap().as_str(), "A3");
    }

    #[tokio::test]
    async fn released_label_returns_only_when_latest() {
        let store = InMemoryBookingStore::new();

        let first = store.allocate_next("Dune", "7PM").await.unwrap();
        store.release_seat("Dune", "7PM", &first).await.unwrap();
        assert_eq!(store.allocate_next("Dune", "7PM").await.unwrap(), first);

        let second = store.allocate_next("Dune", "7PM").await.unwrap();
        store.release_seat("Dune", "7PM", &first).await.unwrap();
        assert_eq!(second.as_str(), "A2");
        assert_eq!(store.allocate_next("Dune", "7PM").await.unwrap().as_str(), "A3");
    }

    #[tokio::test]
    async fn exists_requires_matching_movie() {
        let store = InMemoryBookingStore::new();
        store.create(&ticket("Ann", "ann@x.com", "Dune", "7PM", 1)).await.unwrap();

        assert!(store.exists("ann@x.com", "Dune", "7PM").await.unwrap());
        assert!(!store.exists("ann@x.com", "Alien", "7PM").await.unwrap());
    }

    #[tokio::test]
    async fn delete_and_update_report_missing_tickets() {
        let store = InMemoryBookingStore::new();

        let err = store.delete("ghost@x.com", "7PM").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));

        let err = store
            .update_seat("ghost@x.com", "7PM", &SeatNumber::new("B2"), Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_seat_changes_only_seat_and_timestamp() {
        let store = InMemoryBookingStore::new();
        let original = ticket("Ann", "ann@x.com", "Dune", "7PM", 1);
        store.create(&original).await.unwrap();

        let later = original.updated_at + chrono::Duration::minutes(5);
        store
            .update_seat("ann@x.com", "7PM", &SeatNumber::new("B12"), later)
            .await
            .unwrap();

        let tickets = store.find_by_email("ann@x.com").await.unwrap();
        let updated = &tickets[0];
        assert_eq!(updated.seat_number.as_str(), "B12");
        assert_eq!(updated.updated_at, later);
        assert_eq!(updated.name, original.name);
        assert_eq!(updated.movie_title, original.movie_title);
        assert_eq!(updated.status, original.status);
        assert_eq!(updated.created_at, original.created_at);
    }

    #[tokio::test]
    async fn concurrent_creates_for_one_key_admit_exactly_one() {
        let store = Arc::new(InMemoryBookingStore::new());

        let handles: Vec<_> = (0..16)
            .map(|i| {
                let store = Arc::clone(&store);
                tokio::spawn(async move {
                    store
                        .create(&ticket(&format!("Ann {i}"), "ann@x.com", "Dune", "7PM", i + 1))
                        .await
                })
            })
            .collect();

        let mut successes = 0;
        for handle in handles {
            if handle.await.unwrap().is_ok() {
                successes += 1;
            }
        }

        assert_eq!(successes, 1);
        assert_eq!(store.len().await, 1);
    }
}
