//! Durable booking store over a `PostgreSQL` pool.

use crate::config::ConnectionSettings;
use crate::error::{PostgresError, database, is_unique_violation};
use crate::schema;
use chrono::{DateTime, Utc};
use cinema_booking_core::store::{SeatInventory, StoreFuture, TicketStore};
use cinema_booking_core::{Attendee, SeatNumber, StoreError, Ticket, TicketStatus};
use sqlx::{PgPool, Row};

/// `PostgreSQL` implementation of the seat inventory and ticket store.
///
/// Every sqlx error surfaces as [`StoreError::Database`] except unique
/// violations on ticket insert, which surface as [`StoreError::Duplicate`].
///
/// # Example
///
/// ```no_run
/// use cinema_booking_postgres::PostgresBookingStore;
///
/// # async fn example(pool: sqlx::PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let store = PostgresBookingStore::from_pool(pool);
/// store.bootstrap_schema().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct PostgresBookingStore {
    pool: PgPool,
}

impl PostgresBookingStore {
    /// Wrap an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect a new pool from settings.
    ///
    /// # Errors
    ///
    /// Returns a [`PostgresError`] if the settings are invalid or the
    /// database is unreachable.
    pub async fn connect(settings: &ConnectionSettings) -> Result<Self, PostgresError> {
        Ok(Self::from_pool(settings.connect().await?))
    }

    /// Underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Create the tables if they are missing.
    ///
    /// # Errors
    ///
    /// Returns [`PostgresError::Schema`] if a statement fails.
    pub async fn bootstrap_schema(&self) -> Result<(), PostgresError> {
        schema::bootstrap(&self.pool).await
    }

    fn row_to_ticket(row: &sqlx::postgres::PgRow) -> Result<Ticket, StoreError> {
        let status: String = row.try_get("status").map_err(|e| database(&e))?;
        let status = TicketStatus::parse(&status)
            .ok_or_else(|| StoreError::Database(format!("Invalid ticket status: {status}")))?;
        let seat_number: String = row.try_get("seat_number").map_err(|e| database(&e))?;

        Ok(Ticket {
            name: row.try_get("name").map_err(|e| database(&e))?,
            email: row.try_get("email").map_err(|e| database(&e))?,
            movie_title: row.try_get("movie_title").map_err(|e| database(&e))?,
            showtime: row.try_get("showtime").map_err(|e| database(&e))?,
            seat_number: SeatNumber::new(seat_number),
            status,
            created_at: row.try_get("created_at").map_err(|e| database(&e))?,
            updated_at: row.try_get("updated_at").map_err(|e| database(&e))?,
        })
    }
}

impl SeatInventory for PostgresBookingStore {
    #[tracing::instrument(skip(self))]
    fn provision_if_absent<'a>(
        &'a self,
        movie_title: &'a str,
        showtime: &'a str,
        size: u32,
    ) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let (existing,): (i64,) =
                sqlx::query_as("SELECT COUNT(*) FROM seats WHERE movie_title = $1 AND showtime = $2")
                    .bind(movie_title)
                    .bind(showtime)
                    .fetch_one(&self.pool)
                    .await
                    .map_err(|e| database(&e))?;
            if existing > 0 {
                return Ok(false);
            }

            let last = i32::try_from(size)
                .map_err(|_| StoreError::Database(format!("seat count {size} exceeds the seat_index range")))?;
            let indexes: Vec<i32> = (1..=last).collect();
            let labels: Vec<String> = (1..=size)
                .map(|index| SeatNumber::from_index(index).as_str().to_string())
                .collect();

            // Concurrent provisioners collide on the unique key; the loser inserts nothing.
            let inserted = sqlx::query(
                r"
                INSERT INTO seats (movie_title, showtime, seat_number, seat_index, is_booked)
                SELECT $1, $2, label, idx, FALSE
                FROM UNNEST($3::TEXT[], $4::INTEGER[]) AS batch(label, idx)
                ON CONFLICT (movie_title, showtime, seat_number) DO NOTHING
                ",
            )
            .bind(movie_title)
            .bind(showtime)
            .bind(&labels)
            .bind(&indexes)
            .execute(&self.pool)
            .await
            .map_err(|e| database(&e))?
            .rows_affected();

            tracing::info!(seats = inserted, "Seats provisioned");
            Ok(inserted > 0)
        })
    }

    #[tracing::instrument(skip(self))]
    fn allocate_next<'a>(&'a self, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, SeatNumber> {
        Box::pin(async move {
            // Row locks skipped by concurrent claimers send each caller to the next free seat.
            let seat: Option<(String,)> = sqlx::query_as(
                r"
                UPDATE seats
                SET is_booked = TRUE, updated_at = now()
                WHERE id = (
                    SELECT id
                    FROM seats
                    WHERE movie_title = $1 AND showtime = $2 AND is_booked = FALSE
                    ORDER BY seat_index ASC
                    LIMIT 1
                    FOR UPDATE SKIP LOCKED
                )
                RETURNING seat_number
                ",
            )
            .bind(movie_title)
            .bind(showtime)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| database(&e))?;

            seat.map(|(label,)| SeatNumber::new(label))
                .ok_or_else(|| StoreError::SoldOut {
                    movie_title: movie_title.to_string(),
                    showtime: showtime.to_string(),
                })
        })
    }

    #[tracing::instrument(skip(self), fields(seat = %seat_number))]
    fn mark_booked<'a>(
        &'a self,
        movie_title: &'a str,
        showtime: &'a str,
        seat_number: &'a SeatNumber,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            sqlx::query(
                r"
                UPDATE seats
                SET is_booked = TRUE, updated_at = now()
                WHERE movie_title = $1 AND showtime = $2 AND seat_number = $3
                ",
            )
            .bind(movie_title)
            .bind(showtime)
            .bind(seat_number.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| database(&e))?;

            Ok(())
        })
    }

    #[tracing::instrument(skip(self), fields(seat = %seat_number))]
    fn release_seat<'a>(
        &'a self,
        movie_title: &'a str,
        showtime: &'a str,
        seat_number: &'a SeatNumber,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let released = sqlx::query(
                r"
                UPDATE seats
                SET is_booked = FALSE, updated_at = now()
                WHERE movie_title = $1 AND showtime = $2 AND seat_number = $3 AND is_booked = TRUE
                ",
            )
            .bind(movie_title)
            .bind(showtime)
            .bind(seat_number.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| database(&e))?
            .rows_affected();

            tracing::debug!(released, "Seat claim returned");
            Ok(())
        })
    }
}

impl TicketStore for PostgresBookingStore {
    #[tracing::instrument(skip(self))]
    fn exists<'a>(&'a self, email: &'a str, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, bool> {
        Box::pin(async move {
            let (found,): (bool,) = sqlx::query_as(
                r"
                SELECT EXISTS (
                    SELECT 1 FROM tickets
                    WHERE email = $1 AND movie_title = $2 AND showtime = $3
                )
                ",
            )
            .bind(email)
            .bind(movie_title)
            .bind(showtime)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| database(&e))?;

            Ok(found)
        })
    }

    #[tracing::instrument(skip(self, ticket), fields(email = %ticket.email, showtime = %ticket.showtime))]
    fn create<'a>(&'a self, ticket: &'a Ticket) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let result = sqlx::query(
                r"
                INSERT INTO tickets (
                    name, email, movie_title, showtime, seat_number, status, created_at, updated_at
                ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                ",
            )
            .bind(&ticket.name)
            .bind(&ticket.email)
            .bind(&ticket.movie_title)
            .bind(&ticket.showtime)
            .bind(ticket.seat_number.as_str())
            .bind(ticket.status.as_str())
            .bind(ticket.created_at)
            .bind(ticket.updated_at)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => Ok(()),
                Err(e) if is_unique_violation(&e) => Err(StoreError::Duplicate {
                    email: ticket.email.clone(),
                    showtime: ticket.showtime.clone(),
                }),
                Err(e) => Err(database(&e)),
            }
        })
    }

    #[tracing::instrument(skip(self))]
    fn find_by_email<'a>(&'a self, email: &'a str) -> StoreFuture<'a, Vec<Ticket>> {
        Box::pin(async move {
            let rows = sqlx::query(
                r"
                SELECT name, email, movie_title, showtime, seat_number, status, created_at, updated_at
                FROM tickets
                WHERE email = $1
                ",
            )
            .bind(email)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database(&e))?;

            rows.iter().map(Self::row_to_ticket).collect()
        })
    }

    #[tracing::instrument(skip(self))]
    fn find_attendees<'a>(&'a self, movie_title: &'a str, showtime: &'a str) -> StoreFuture<'a, Vec<Attendee>> {
        Box::pin(async move {
            let rows: Vec<(String, String)> = sqlx::query_as(
                r"
                SELECT name, seat_number
                FROM tickets
                WHERE movie_title = $1 AND showtime = $2
                ",
            )
            .bind(movie_title)
            .bind(showtime)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| database(&e))?;

            Ok(rows
                .into_iter()
                .map(|(name, seat_number)| Attendee {
                    name,
                    seat_number: SeatNumber::new(seat_number),
                })
                .collect())
        })
    }

    #[tracing::instrument(skip(self))]
    fn delete<'a>(&'a self, email: &'a str, showtime: &'a str) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let deleted = sqlx::query("DELETE FROM tickets WHERE email = $1 AND showtime = $2")
                .bind(email)
                .bind(showtime)
                .execute(&self.pool)
                .await
                .map_err(|e| database(&e))?
                .rows_affected();

            if deleted == 0 {
                return Err(StoreError::NotFound {
                    email: email.to_string(),
                    showtime: showtime.to_string(),
                });
            }
            Ok(())
        })
    }

    #[tracing::instrument(skip(self), fields(seat = %new_seat))]
    fn update_seat<'a>(
        &'a self,
        email: &'a str,
        showtime: &'a str,
        new_seat: &'a SeatNumber,
        updated_at: DateTime<Utc>,
    ) -> StoreFuture<'a, ()> {
        Box::pin(async move {
            let updated = sqlx::query(
                r"
                UPDATE tickets
                SET seat_number = $3, updated_at = $4
                WHERE email = $1 AND showtime = $2
                ",
            )
            .bind(email)
            .bind(showtime)
            .bind(new_seat.as_str())
            .bind(updated_at)
            .execute(&self.pool)
            .await
            .map_err(|e| database(&e))?
            .rows_affected();

            if updated == 0 {
                return Err(StoreError::NotFound {
                    email: email.to_string(),
                    showtime: showtime.to_string(),
                });
            }
            Ok(())
        })
    }
}
