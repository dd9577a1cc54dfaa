//! RocketShoes CLI - a shopping cart backed by the catalog/stock API.
//!
//! # Usage
//!
//! ```bash
//! # Show the cart
//! rocketshoes list
//!
//! # Add one unit of product 3
//! rocketshoes add 3
//!
//! # Set product 3 to 2 units (checked against stock)
//! rocketshoes update 3 2
//!
//! # Remove product 3
//! rocketshoes remove 3
//!
//! # Show totals
//! rocketshoes summary
//! ```
//!
//! Logs go to stderr; set `RUST_LOG` to change the level.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use rocketshoes_core::ProductId;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::cart::{CommandError, Session};

#[derive(Parser)]
#[command(name = "rocketshoes")]
#[command(author, version, about = "RocketShoes shopping cart")]
struct Cli {
    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the cart
    List,
    /// Add one unit of a product
    Add {
        /// Product id
        id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        id: ProductId,
    },
    /// Set the amount of a product in the cart
    Update {
        /// Product id
        id: ProductId,

        /// New amount (at least 1, at most the current stock)
        amount: u32,
    },
    /// Show cart totals
    Summary,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Defaults to warnings only so command output stays readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "warn".into());

    let json_layer = cli.json_logs.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!cli.json_logs)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();

    if let Err(e) = run(cli.command).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands) -> Result<(), CommandError> {
    let mut session = Session::open().await?;
    match command {
        Commands::List => session.list().await,
        Commands::Add { id } => session.add(id).await?,
        Commands::Remove { id } => session.remove(id).await?,
        Commands::Update { id, amount } => session.update(id, amount).await?,
        Commands::Summary => session.summary().await,
    }
    Ok(())
}
