//! storecart CLI - Drive the cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! cart show
//!
//! # Add one unit of product 3
//! cart add 3
//!
//! # Set product 3 to 2 units
//! cart update 3 2
//!
//! # Remove product 3
//! cart remove 3
//!
//! # Use another catalog API and data directory
//! cart --api-url http://localhost:4000 --data-dir /tmp/cart show
//! ```
//!
//! # Commands
//!
//! - `show` - Print the cart
//! - `add` - Add one unit of a product
//! - `remove` - Remove a product's line
//! - `update` - Set a product's quantity
//!
//! Failed operations are reported as notices in the log and leave the cart
//! unchanged; they do not change the exit status.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use storecart::{CartConfig, LogFormat, ProductId, telemetry};
use tracing_subscriber::Registry;
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "cart")]
#[command(author, version, about = "Storefront cart tools")]
struct Cli {
    /// Catalog API base URL (overrides `CART_API_URL`)
    #[arg(long, global = true)]
    api_url: Option<Url>,

    /// Directory holding the persisted cart (overrides `CART_DATA_DIR`)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage key prefix (overrides `CART_NAMESPACE`)
    #[arg(long, global = true)]
    namespace: Option<String>,

    /// Start from an empty cart if the stored one is corrupt
    #[arg(long, global = true)]
    reset: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the cart
    Show,
    /// Add one unit of a product
    Add {
        /// Product ID
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product ID
        id: ProductId,
    },
    /// Set the quantity of a product already in the cart
    Update {
        /// Product ID
        id: ProductId,

        /// New quantity (zero or negative is ignored)
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

impl Cli {
    /// Apply command-line overrides on top of the environment configuration.
    fn apply(&self, config: &mut CartConfig) {
        if let Some(api_url) = &self.api_url {
            config.catalog.api_url = api_url.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.data_dir = data_dir.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
    }
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match CartConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            telemetry::init_default(LogFormat::Pretty);
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };
    cli.apply(&mut config);

    // Initialize Sentry (must be done before tracing subscriber)
    let sentry_guard = init_sentry(&config);
    telemetry::init(
        config.log_format,
        sentry_guard
            .is_some()
            .then(|| {
                sentry_tracing::layer::<Registry>().event_filter(sentry_event_filter)
            }),
    );

    if let Err(e) = commands::run(cli.command.into(), &config, cli.reset).await {
        tracing::error!("Command failed: {e}");
        drop(sentry_guard);
        std::process::exit(1);
    }
}

impl From<Commands> for commands::Command {
    fn from(command: Commands) -> Self {
        match command {
            Commands::Show => Self::Show,
            Commands::Add { id } => Self::Add(id),
            Commands::Remove { id } => Self::Remove(id),
            Commands::Update { id, amount } => Self::Update(id, amount),
        }
    }
}
