//! RocketShoes CLI - Drive the cart from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart with line totals
//! rs-cart show
//!
//! # Show the stock ledger
//! rs-cart stock
//!
//! # Add one unit of product 3
//! rs-cart add 3
//!
//! # Set product 3 to four units
//! rs-cart set 3 4
//!
//! # Remove product 3
//! rs-cart remove 3
//! ```
//!
//! # Commands
//!
//! - `show` - List cart lines and subtotal
//! - `stock` - List available amounts
//! - `add`, `remove`, `set` - Mutate the cart (exit code 1 when rejected, logged as a warning)
//!
//! Configuration comes from the environment; see `rocketshoes_cart::config`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use rocketshoes_cart::CartConfig;
use rocketshoes_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "rs-cart")]
#[command(author, version, about = "RocketShoes cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show cart contents
    Show,
    /// Show the stock snapshot
    Stock,
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
    /// Set the amount of a product already in the cart
    Set {
        /// Product ID
        id: ProductId,

        /// New amount (values below 1 are ignored)
        #[arg(allow_hyphen_values = true)]
        amount: i32,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &CartConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR => sentry_tracing::EventFilter::Event,
        tracing::Level::WARN | tracing::Level::INFO | tracing::Level::DEBUG => {
            sentry_tracing::EventFilter::Breadcrumb
        }
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// Initialize tracing with `EnvFilter` and Sentry integration.
fn init_tracing() {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "rocketshoes_cli=info,rocketshoes_cart=info,rocketshoes::notify=warn".into()
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = CartConfig::from_env();

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    init_tracing();

    let result = match config {
        Ok(config) => run(cli, &config).await,
        Err(e) => Err(e.into()),
    };

    result.unwrap_or_else(|e| {
        tracing::error!("Command failed: {e}");
        ExitCode::FAILURE
    })
}

async fn run(cli: Cli, config: &CartConfig) -> Result<ExitCode, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Show => commands::cart::show(config),
        Commands::Stock => commands::cart::stock(config).await,
        Commands::Add { id } => commands::cart::add(config, id).await,
        Commands::Remove { id } => commands::cart::remove(config, id),
        Commands::Set { id, amount } => commands::cart::set(config, id, amount).await,
    }
}
