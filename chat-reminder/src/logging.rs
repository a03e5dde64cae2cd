//! Logging setup
//!
//! Hosts call [`init_logging`] once at startup. `RUST_LOG` overrides the
//! default filter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{ReminderError, Result};

/// Install the global tracing subscriber.
///
/// `verbose` selects debug output for this crate, which includes one line
/// per dispatch decision.
pub fn init_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "chat_reminder=debug,info"
    } else {
        "chat_reminder=info,warn"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| ReminderError::Init(format!("Failed to initialize logging: {}", e)))?;

    tracing::info!("Logging initialized (verbose: {})", verbose);
    Ok(())
}
