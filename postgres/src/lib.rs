//! `PostgreSQL` backend for the cinema booking engine.
//!
//! This crate provides [`PostgresBookingStore`], the durable implementation of
//! the `SeatInventory` and `TicketStore` traits from `cinema-booking-core`.
//! It supports:
//!
//! - Connection settings from discrete fields or a `DATABASE_URL`
//! - Idempotent schema bootstrap (`CREATE TABLE IF NOT EXISTS`)
//! - Unique constraints on tickets and seats, with violations reported as
//!   duplicates rather than faults
//!
//! # Example
//!
//! ```ignore
//! use cinema_booking_postgres::{ConnectionSettings, PostgresBookingStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresBookingStore::connect(&ConnectionSettings::default()).await?;
//!     store.bootstrap_schema().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod schema;
pub mod store;

pub use config::ConnectionSettings;
pub use error::PostgresError;
pub use store::PostgresBookingStore;
