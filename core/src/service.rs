//! Booking orchestrator.
//!
//! Every use case runs through one dispatch rule:
//!
//! 1. While the [`AvailabilityMonitor`] reports the durable backend as
//!    available, run the operation against it.
//! 2. If that run fails with a durability fault, mark the backend unavailable
//!    and run the same operation once against the in-memory fallback.
//! 3. Once unavailable (or when no durable backend was ever connected), go
//!    straight to the fallback.
//!
//! Domain outcomes such as [`BookingError::AlreadyBooked`] are returned as-is
//! and never trigger a fallback.
//!
//! A durable run that fails part-way is not rolled back before the fallback
//! run. A booking whose ticket insert succeeded but whose seat flip failed
//! therefore exists in both stores.

use crate::availability::AvailabilityMonitor;
use crate::environment::{Clock, SystemClock};
use crate::error::{BookingError, StoreError};
use crate::memory::InMemoryBookingStore;
use crate::store::BookingBackend;
use crate::types::{
    Attendee, BackendMode, BookTicketRequest, CancelTicketRequest, DEFAULT_SEATS_PER_SHOWTIME,
    ModifySeatRequest, SeatNumber, Ticket, TicketConfirmation,
};
use crate::validation::require;
use std::future::Future;
use std::sync::Arc;

/// Orchestrates bookings across the durable backend and the fallback store.
///
/// Cheap to clone; all state lives behind `Arc`s.
///
/// # Example
///
/// ```
/// use cinema_booking_core::{BookTicketRequest, BookingService};
///
/// # async fn example() -> Result<(), cinema_booking_core::BookingError> {
/// let service = BookingService::fallback_only();
///
/// let confirmation = service
///     .book_ticket(BookTicketRequest::new("Ann", "ann@x.com", "Dune", "7PM"))
///     .await?;
/// assert_eq!(confirmation.seat_number.as_str(), "A1");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BookingService {
    durable: Option<Arc<dyn BookingBackend>>,
    fallback: Arc<InMemoryBookingStore>,
    monitor: Arc<AvailabilityMonitor>,
    clock: Arc<dyn Clock>,
    seats_per_showtime: u32,
}

impl BookingService {
    /// Service backed by a connected durable store.
    #[must_use]
    pub fn new(durable: Arc<dyn BookingBackend>) -> Self {
        Self {
            durable: Some(durable),
            fallback: Arc::new(InMemoryBookingStore::new()),
            monitor: Arc::new(AvailabilityMonitor::available()),
            clock: Arc::new(SystemClock),
            seats_per_showtime: DEFAULT_SEATS_PER_SHOWTIME,
        }
    }

    /// Service for a process that could not reach its durable store.
    #[must_use]
    pub fn fallback_only() -> Self {
        Self {
            durable: None,
            fallback: Arc::new(InMemoryBookingStore::new()),
            monitor: Arc::new(AvailabilityMonitor::unavailable()),
            clock: Arc::new(SystemClock),
            seats_per_showtime: DEFAULT_SEATS_PER_SHOWTIME,
        }
    }

    /// Use the given availability monitor instead of a fresh one.
    #[must_use]
    pub fn with_monitor(mut self, monitor: Arc<AvailabilityMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Use the given fallback store instead of a fresh one.
    #[must_use]
    pub fn with_fallback(mut self, fallback: Arc<InMemoryBookingStore>) -> Self {
        self.fallback = fallback;
        self
    }

    /// Use the given clock for ticket timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Number of seats provisioned for a showtime on its first booking.
    #[must_use]
    pub fn with_seats_per_showtime(mut self, seats: u32) -> Self {
        self.seats_per_showtime = seats;
        self
    }

    /// The availability monitor driving backend selection.
    #[must_use]
    pub fn monitor(&self) -> &Arc<AvailabilityMonitor> {
        &self.monitor
    }

    /// Backend the next operation will use.
    #[must_use]
    pub fn backend_mode(&self) -> BackendMode {
        if self.active_durable().is_some() {
            BackendMode::Durable
        } else {
            BackendMode::Fallback
        }
    }

    /// Book a ticket and allocate the lowest free seat.
    ///
    /// # Errors
    ///
    /// - `Validation`: a field is blank or the email is malformed
    /// - `AlreadyBooked`: the email holds a ticket for this showtime
    /// - `NoAvailableSeats`: every seat of the showtime is booked
    #[tracing::instrument(skip(self, request), fields(email = %request.email, showtime = %request.showtime))]
    pub async fn book_ticket(&self, request: BookTicketRequest) -> Result<TicketConfirmation, BookingError> {
        let request = request.normalized();
        request.validate()?;

        let request = &request;
        let (ticket, backend) = self
            .dispatch("book_ticket", |store| self.book_on(store, request))
            .await?;

        tracing::info!(
            movie_title = %ticket.movie_title,
            seat = %ticket.seat_number,
            backend = backend.as_str(),
            "Ticket booked"
        );
        metrics::counter!("booking_tickets_booked_total", "backend" => backend.as_str()).increment(1);

        Ok(ticket.confirmation())
    }

    /// All tickets held by an email.
    ///
    /// # Errors
    ///
    /// - `Validation`: the email is blank
    /// - `NoTicketsFound`: the email holds no tickets
    pub async fn view_ticket(&self, email: &str) -> Result<Vec<Ticket>, BookingError> {
        let email = email.trim();
        require("email", email)?;

        let (tickets, _) = self
            .dispatch("view_ticket", |store| async move { store.find_by_email(email).await })
            .await?;

        if tickets.is_empty() {
            return Err(BookingError::NoTicketsFound {
                email: email.to_string(),
            });
        }
        Ok(tickets)
    }

    /// Name and seat of everyone booked for a showtime.
    ///
    /// # Errors
    ///
    /// - `Validation`: a field is blank
    /// - `NoAttendeesFound`: nobody is booked
    pub async fn view_attendees(&self, movie_title: &str, showtime: &str) -> Result<Vec<Attendee>, BookingError> {
        let (movie_title, showtime) = (movie_title.trim(), showtime.trim());
        require("movie_title", movie_title)?;
        require("showtime", showtime)?;

        let (attendees, _) = self
            .dispatch("view_attendees", |store| async move {
                store.find_attendees(movie_title, showtime).await
            })
            .await?;

        if attendees.is_empty() {
            return Err(BookingError::NoAttendeesFound {
                movie_title: movie_title.to_string(),
                showtime: showtime.to_string(),
            });
        }
        Ok(attendees)
    }

    /// Cancel a ticket by deleting it.
    ///
    /// The seat it held is not released in the inventory.
    ///
    /// # Errors
    ///
    /// - `Validation`: a field is blank or the email is malformed
    /// - `TicketNotFound`: no ticket for `(email, showtime)`
    #[tracing::instrument(skip(self, request), fields(email = %request.email, showtime = %request.showtime))]
    pub async fn cancel_ticket(&self, request: CancelTicketRequest) -> Result<(), BookingError> {
        let request = request.normalized();
        request.validate()?;

        let request = &request;
        let ((), backend) = self
            .dispatch("cancel_ticket", |store| async move {
                store.delete(&request.email, &request.showtime).await
            })
            .await?;

        tracing::info!(backend = backend.as_str(), "Ticket cancelled");
        Ok(())
    }

    /// Move a ticket to another seat.
    ///
    /// Only the seat label changes. Whether the target seat is free is not
    /// checked in either backend, so this can double-assign a seat.
    ///
    /// # Errors
    ///
    /// - `Validation`: a field is blank or the email is malformed
    /// - `TicketNotFound`: no ticket for `(email, showtime)`
    #[tracing::instrument(skip(self, request), fields(email = %request.email, showtime = %request.showtime))]
    pub async fn modify_seat(&self, request: ModifySeatRequest) -> Result<(), BookingError> {
        let request = request.normalized();
        request.validate()?;

        let new_seat = SeatNumber::new(request.new_seat_number.as_str());
        let now = self.clock.now();
        let (request, new_seat) = (&request, &new_seat);
        let ((), backend) = self
            .dispatch("modify_seat", |store| async move {
                store
                    .update_seat(&request.email, &request.showtime, new_seat, now)
                    .await
            })
            .await?;

        tracing::info!(seat = %new_seat, backend = backend.as_str(), "Seat modified");
        Ok(())
    }

    /// The booking algorithm, identical for both backends.
    ///
    /// A ticket insert rejected as a duplicate hands its claimed seat back.
    async fn book_on(&self, store: Arc<dyn BookingBackend>, request: &BookTicketRequest) -> Result<Ticket, StoreError> {
        if store
            .exists(&request.email, &request.movie_title, &request.showtime)
            .await?
        {
            return Err(StoreError::Duplicate {
                email: request.email.clone(),
                showtime: request.showtime.clone(),
            });
        }

        if store
            .provision_if_absent(&request.movie_title, &request.showtime, self.seats_per_showtime)
            .await?
        {
            metrics::counter!("booking_seats_provisioned_total").increment(1);
        }

        let seat = store.allocate_next(&request.movie_title, &request.showtime).await?;
        let ticket = Ticket::confirmed(request, seat, self.clock.now());
        if let Err(err) = store.create(&ticket).await {
            if matches!(err, StoreError::Duplicate { .. }) {
                store
                    .release_seat(&ticket.movie_title, &ticket.showtime, &ticket.seat_number)
                    .await?;
            }
            return Err(err);
        }
        store
            .mark_booked(&ticket.movie_title, &ticket.showtime, &ticket.seat_number)
            .await?;

        Ok(ticket)
    }

    fn active_durable(&self) -> Option<Arc<dyn BookingBackend>> {
        self.durable
            .as_ref()
            .filter(|_| self.monitor.is_available())
            .map(Arc::clone)
    }

    /// Run `operation` on the durable backend, failing over to the fallback once.
    async fn dispatch<T, F, Fut>(&self, name: &'static str, operation: F) -> Result<(T, BackendMode), BookingError>
    where
        F: Fn(Arc<dyn BookingBackend>) -> Fut,
        Fut: Future<Output = Result<T, StoreError>>,
    {
        if let Some(durable) = self.active_durable() {
            match operation(durable).await {
                Err(StoreError::Database(reason)) => self.fail_over(name, &reason),
                result => return result.map(|value| (value, BackendMode::Durable)).map_err(Into::into),
            }
        }

        let fallback: Arc<dyn BookingBackend> = self.fallback.clone();
        operation(fallback)
            .await
            .map(|value| (value, BackendMode::Fallback))
            .map_err(Into::into)
    }

    fn fail_over(&self, operation: &'static str, reason: &str) {
        if self.monitor.mark_unavailable() {
            tracing::warn!(
                operation,
                error = reason,
                "Durable store failed, switching to in-memory storage for the rest of this process"
            );
            metrics::counter!("booking_fallback_switches_total").increment(1);
        } else {
            tracing::warn!(operation, error = reason, "Durable store failed, retrying in memory");
        }
    }
}

impl std::fmt::Debug for BookingService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingService")
            .field("has_durable", &self.durable.is_some())
            .field("monitor", &self.monitor)
            .field("seats_per_showtime", &self.seats_per_showtime)
            .finish_non_exhaustive()
    }
}
