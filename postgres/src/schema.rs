//! Idempotent schema bootstrap.
//!
//! Every statement is `IF NOT EXISTS`, so running this on each startup is safe.

use crate::error::PostgresError;
use sqlx::PgPool;

/// Statements creating the booking tables and their indexes.
pub const STATEMENTS: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS tickets (
        id BIGSERIAL PRIMARY KEY,
        name TEXT NOT NULL,
        email TEXT NOT NULL,
        movie_title TEXT NOT NULL,
        showtime TEXT NOT NULL,
        seat_number TEXT NOT NULL,
        status TEXT NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT tickets_email_showtime_key UNIQUE (email, showtime)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_tickets_showing ON tickets(movie_title, showtime)",
    r"
    CREATE TABLE IF NOT EXISTS seats (
        id BIGSERIAL PRIMARY KEY,
        movie_title TEXT NOT NULL,
        showtime TEXT NOT NULL,
        seat_number TEXT NOT NULL,
        seat_index INTEGER NOT NULL,
        is_booked BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT seats_showing_seat_key UNIQUE (movie_title, showtime, seat_number)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_seats_free ON seats(movie_title, showtime, is_booked, seat_index)",
];

/// Create the `tickets` and `seats` tables if they are missing.
///
/// # Errors
///
/// Returns [`PostgresError::Schema`] on the first statement that fails.
pub async fn bootstrap(pool: &PgPool) -> Result<(), PostgresError> {
    let mut conn = pool.acquire().await.map_err(PostgresError::Schema)?;

    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(&mut *conn)
            .await
            .map_err(PostgresError::Schema)?;
    }

    tracing::info!(statements = STATEMENTS.len(), "Booking schema ready");
    Ok(())
}
