use std::time::Duration;

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use tracing::{info, warn};

use crate::config::DatabaseConfig;

/// Connects to the configured database, retrying a fixed number of times.
pub async fn connect(cfg: &DatabaseConfig) -> Result<DatabaseConnection> {
    let shown = redact_dsn(&cfg.dsn);
    let delay = Duration::from_millis(cfg.connect_retry_delay_ms);
    let attempts = cfg.connect_retries.max(1);

    let mut opts = ConnectOptions::new(cfg.dsn.clone());
    opts.max_connections(cfg.max_connections).sqlx_logging(false);

    let mut attempt = 1;
    loop {
        match Database::connect(opts.clone()).await {
            Ok(db) => {
                info!(dsn = %shown, attempt, "Connected to database");
                return Ok(db);
            }
            Err(e) if attempt < attempts => {
                warn!(dsn = %shown, attempt, error = %e, "Database not reachable, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => {
                return Err(e).with_context(|| {
                    format!("could not connect to {shown} after {attempts} attempts")
                });
            }
        }
    }
}

/// Masks the password of a URL-style DSN for logging.
///
/// A DSN with an `@` that does not parse as a URL is hidden entirely.
pub fn redact_dsn(dsn: &str) -> String {
    if !dsn.contains('@') {
        return dsn.to_owned();
    }
    let Ok(mut parsed) = url::Url::parse(dsn) else {
        return "***".to_owned();
    };
    if parsed.password().is_some() && parsed.set_password(Some("***")).is_err() {
        return "***".to_owned();
    }
    parsed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_is_masked() {
        assert_eq!(
            redact_dsn("postgres://app:s3cret@db:5432/tickets"),
            "postgres://app:***@db:5432/tickets"
        );
    }

    #[test]
    fn dsn_without_password_is_unchanged() {
        assert_eq!(redact_dsn("sqlite::memory:"), "sqlite::memory:");
        assert_eq!(
            redact_dsn("sqlite://ticketdesk.db?mode=rwc"),
            "sqlite://ticketdesk.db?mode=rwc"
        );
        assert_eq!(redact_dsn("postgres://app@db/t"), "postgres://app@db/t");
    }

    #[test]
    fn at_sign_outside_credentials_is_not_treated_as_credentials() {
        let dsn = "postgres://db:5432/tickets?application_name=a@b";
        assert_eq!(redact_dsn(dsn), dsn);

        assert_eq!(
            redact_dsn("postgres://app:s3cret@db:5432/tickets?application_name=a@b"),
            "postgres://app:***@db:5432/tickets?application_name=a@b"
        );
    }

    #[test]
    fn unparseable_dsn_with_at_sign_is_hidden() {
        assert_eq!(redact_dsn("not a url @ all"), "***");
    }

    #[tokio::test]
    async fn connects_to_in_memory_sqlite() {
        let cfg = DatabaseConfig {
            dsn: "sqlite::memory:".to_owned(),
            max_connections: 1,
            connect_retries: 1,
            connect_retry_delay_ms: 0,
        };
        let db = connect(&cfg).await.unwrap();
        db.ping().await.unwrap();
    }

    #[tokio::test]
    async fn gives_up_after_configured_attempts() {
        let cfg = DatabaseConfig {
            dsn: "unknown-scheme://nowhere".to_owned(),
            max_connections: 1,
            connect_retries: 2,
            connect_retry_delay_ms: 1,
        };
        let err = connect(&cfg).await.unwrap_err();
        assert!(err.to_string().contains("after 2 attempts"));
    }
}
