//! Tracing subscriber setup.
//!
//! Defaults to info level for storecart crates if `RUST_LOG` is not set.

use tracing_subscriber::layer::{Identity, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry};

use crate::config::LogFormat;

const DEFAULT_FILTER: &str = "storecart=info,storecart_cli=info";

/// Build the `EnvFilter` from `RUST_LOG`, falling back to the default.
#[must_use]
pub fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into())
}

/// Install the global subscriber.
///
/// `extra` is layered directly on the registry so binaries can add an
/// error-tracking layer. Pass `Identity::new()` when there is none.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init<L>(format: LogFormat, extra: L)
where
    L: Layer<Registry> + Send + Sync + 'static,
{
    let json = format == LogFormat::Json;

    tracing_subscriber::registry()
        .with(extra)
        .with(env_filter())
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(tracing_subscriber::fmt::layer))
        .init();
}

/// Install the global subscriber with no extra layers.
///
/// # Panics
///
/// Panics if a global subscriber is already installed.
pub fn init_default(format: LogFormat) {
    init(format, Identity::new());
}
