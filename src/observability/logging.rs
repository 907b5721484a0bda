//! # Structured Logging
//!
//! Span macro and subscriber setup on top of the tracing ecosystem.
//! Secret values are never recorded; spans and events carry secret names,
//! property selectors, offsets and counts only.

use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::config::LoggingConfig;
use crate::errors::{Error, Result};

/// Create a tracing span for one vault operation.
///
/// ```rust,ignore
/// let span = vault_span!("get_secret", "db-credentials");
/// let span = vault_span!("get_secret", "db-credentials", property = "password");
/// ```
#[macro_export]
macro_rules! vault_span {
    ($operation:expr, $key:expr) => {
        tracing::debug_span!(
            "vault_operation",
            operation = %$operation,
            key = %$key
        )
    };
    ($operation:expr, $key:expr, $($field:tt)*) => {
        tracing::debug_span!(
            "vault_operation",
            operation = %$operation,
            key = %$key,
            $($field)*
        )
    };
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set. A subscriber that is
/// already installed (a host process, or another test) is left in place.
pub fn init_logging(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .map_err(|e| {
            Error::config_with_source(
                format!("Invalid log filter '{}'", config.level),
                Box::new(e),
            )
        })?;

    let installed = if config.json {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder()
                .with_env_filter(filter)
                .json()
                .finish(),
        )
    } else {
        tracing::subscriber::set_global_default(
            FmtSubscriber::builder().with_env_filter(filter).finish(),
        )
    };

    if installed.is_err() {
        tracing::debug!("Global subscriber already set; keeping it");
    }
    Ok(())
}

/// Log the store configuration at client construction
pub fn log_store_info(server: &str, namespace: &str, read_roles: usize, write_roles: usize) {
    tracing::info!(
        server = %server,
        namespace = %namespace,
        default_read_roles = read_roles,
        default_write_roles = write_roles,
        "PrivX secrets provider configured"
    );
}
