//! Connection settings for the booking database.

use crate::error::PostgresError;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::PgPool;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Everything needed to build a connection pool.
///
/// When `url` is set it replaces the discrete host, port, credential, database
/// and SSL fields. Time zone and statement timeout always come from the fields.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    /// Full connection string, overriding the discrete fields
    pub url: Option<String>,
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Role name
    pub user: String,
    /// Role password
    pub password: String,
    /// Database name
    pub database: String,
    /// libpq `sslmode` value (`disable`, `prefer`, `require`, ...)
    pub ssl_mode: String,
    /// Session `TimeZone`
    pub timezone: String,
    /// Pool size
    pub max_connections: u32,
    /// Time allowed to acquire a connection
    pub connect_timeout: Duration,
    /// Server-side `statement_timeout`
    pub statement_timeout: Duration,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            url: None,
            host: "localhost".to_string(),
            port: 5432,
            user: "postgres".to_string(),
            password: "postgres".to_string(),
            database: "movie_tickets".to_string(),
            ssl_mode: "disable".to_string(),
            timezone: "UTC".to_string(),
            max_connections: 10,
            connect_timeout: Duration::from_secs(5),
            statement_timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for ConnectionSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionSettings")
            .field("url", &self.url.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("database", &self.database)
            .field("ssl_mode", &self.ssl_mode)
            .field("timezone", &self.timezone)
            .field("max_connections", &self.max_connections)
            .field("connect_timeout", &self.connect_timeout)
            .field("statement_timeout", &self.statement_timeout)
            .finish_non_exhaustive()
    }
}

impl ConnectionSettings {
    /// Settings pointing at a connection string, other fields defaulted.
    #[must_use]
    pub fn from_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Self::default()
        }
    }

    /// Build the sqlx connect options.
    ///
    /// # Errors
    ///
    /// Returns [`PostgresError::InvalidSettings`] if the URL or SSL mode cannot be parsed.
    pub fn connect_options(&self) -> Result<PgConnectOptions, PostgresError> {
        let options = match &self.url {
            Some(url) => PgConnectOptions::from_str(url)
                .map_err(|e| PostgresError::InvalidSettings(format!("DATABASE_URL: {e}")))?,
            None => {
                let ssl_mode = PgSslMode::from_str(&self.ssl_mode)
                    .map_err(|e| PostgresError::InvalidSettings(format!("sslmode: {e}")))?;
                PgConnectOptions::new()
                    .host(&self.host)
                    .port(self.port)
                    .username(&self.user)
                    .password(&self.password)
                    .database(&self.database)
                    .ssl_mode(ssl_mode)
            }
        };

        Ok(options.options([
            ("TimeZone", self.timezone.clone()),
            (
                "statement_timeout",
                format!("{}", self.statement_timeout.as_millis()),
            ),
        ]))
    }

    /// Connect a pool with these settings.
    ///
    /// # Errors
    ///
    /// Returns [`PostgresError::InvalidSettings`] for unparseable settings and
    /// [`PostgresError::Connect`] if no connection can be established.
    pub async fn connect(&self) -> Result<PgPool, PostgresError> {
        let options = self.connect_options()?;

        let pool = PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.connect_timeout)
            .connect_with(options)
            .await
            .map_err(PostgresError::Connect)?;

        tracing::info!(
            host = %self.display_host(),
            max_connections = self.max_connections,
            "Connected to PostgreSQL"
        );

        Ok(pool)
    }

    /// Host for log lines, without credentials.
    fn display_host(&self) -> String {
        match &self.url {
            Some(_) => "DATABASE_URL".to_string(),
            None => format!("{}:{}/{}", self.host, self.port, self.database),
        }
    }
}
