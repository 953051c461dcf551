//! Configuration management for the booking server.
//!
//! Loads configuration from environment variables with sensible defaults.
//! Unparseable numeric values fall back to their defaults, as does a seat
//! count outside `1..=MAX_SEATS_PER_SHOWTIME`.

use cinema_booking_core::{DEFAULT_SEATS_PER_SHOWTIME, MAX_SEATS_PER_SHOWTIME};
use cinema_booking_postgres::ConnectionSettings;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server configuration
    pub server: ServerConfig,
    /// `PostgreSQL` connection settings
    pub database: ConnectionSettings,
    /// Booking engine configuration
    pub booking: BookingConfig,
}

/// Server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Graceful shutdown timeout in seconds
    pub shutdown_timeout: u64,
}

/// Booking engine configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookingConfig {
    /// Seats provisioned per showtime on its first booking
    pub seats_per_showtime: u32,
}

impl Config {
    /// Load configuration from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let number = |key: &str, default| parsed(lookup(key), default);
        let defaults = ConnectionSettings::default();

        Self {
            server: ServerConfig {
                host: text("HOST", "0.0.0.0"),
                port: parsed(lookup("PORT"), 8080),
                shutdown_timeout: number("SHUTDOWN_TIMEOUT", 30),
            },
            database: ConnectionSettings {
                url: lookup("DATABASE_URL").filter(|url| !url.trim().is_empty()),
                host: text("DATABASE_HOST", &defaults.host),
                port: parsed(lookup("DATABASE_PORT"), defaults.port),
                user: text("DATABASE_USER", &defaults.user),
                password: text("DATABASE_PASSWORD", &defaults.password),
                database: text("DATABASE_NAME", &defaults.database),
                ssl_mode: text("DATABASE_SSL_MODE", &defaults.ssl_mode),
                timezone: text("DATABASE_TIMEZONE", &defaults.timezone),
                max_connections: parsed(lookup("DATABASE_MAX_CONNECTIONS"), defaults.max_connections),
                connect_timeout: Duration::from_secs(number("DATABASE_CONNECT_TIMEOUT", 5)),
                statement_timeout: Duration::from_secs(number("DATABASE_STATEMENT_TIMEOUT", 30)),
            },
            booking: BookingConfig {
                seats_per_showtime: Some(parsed(lookup("SEATS_PER_SHOWTIME"), DEFAULT_SEATS_PER_SHOWTIME))
                    .filter(|seats| (1..=MAX_SEATS_PER_SHOWTIME).contains(seats))
                    .unwrap_or(DEFAULT_SEATS_PER_SHOWTIME),
            },
        }
    }

    /// Address the HTTP listener binds to.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn parsed<T: FromStr>(value: Option<String>, default: T) -> T {
    value.and_then(|s| s.trim().parse().ok()).unwrap_or(default)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)] // Test code can use unwrap/expect
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_when_nothing_is_set() {
        let config = config_from(&[]);

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.server.shutdown_timeout, 30);
        assert_eq!(config.database, ConnectionSettings::default());
        assert_eq!(config.booking.seats_per_showtime, 50);
    }

    #[test]
    fn discrete_database_fields_are_read() {
        let config = config_from(&[
            ("DATABASE_HOST", "db"),
            ("DATABASE_PORT", "6543"),
            ("DATABASE_NAME", "cinema"),
            ("DATABASE_SSL_MODE", "require"),
            ("DATABASE_TIMEZONE", "Asia/Kolkata"),
            ("DATABASE_STATEMENT_TIMEOUT", "5"),
        ]);

        assert_eq!(config.database.url, None);
        assert_eq!(config.database.host, "db");
        assert_eq!(config.database.port, 6543);
        assert_eq!(config.database.database, "cinema");
        assert_eq!(config.database.ssl_mode, "require");
        assert_eq!(config.database.timezone, "Asia/Kolkata");
        assert_eq!(config.database.statement_timeout, Duration::from_secs(5));
    }

    #[test]
    fn database_url_is_kept_when_present() {
        let config = config_from(&[("DATABASE_URL", "postgres://u:p@h/db")]);
        assert_eq!(config.database.url.as_deref(), Some("postgres://u:p@h/db"));

        let blank = config_from(&[("DATABASE_URL", "  ")]);
        assert_eq!(blank.database.url, None);
    }

    #[test]
    fn unparseable_numbers_fall_back_to_defaults() {
        let config = config_from(&[("PORT", "eighty"), ("SEATS_PER_SHOWTIME", "-3")]);

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.booking.seats_per_showtime, 50);
    }

    #[test]
    fn out_of_range_seat_counts_fall_back_to_default() {
        assert_eq!(config_from(&[("SEATS_PER_SHOWTIME", "0")]).booking.seats_per_showtime, 50);
        assert_eq!(
            config_from(&[("SEATS_PER_SHOWTIME", "4294967295")]).booking.seats_per_showtime,
            50
        );
        assert_eq!(
            config_from(&[("SEATS_PER_SHOWTIME", "10000")]).booking.seats_per_showtime,
            MAX_SEATS_PER_SHOWTIME
        );
    }

    #[test]
    fn seat_count_is_configurable() {
        let config = config_from(&[("SEATS_PER_SHOWTIME", "120"), ("PORT", "9000")]);

        assert_eq!(config.booking.seats_per_showtime, 120);
        assert_eq!(config.bind_address(), "0.0.0.0:9000");
    }
}
