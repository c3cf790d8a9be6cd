//! RocketShoes cart CLI.
//!
//! # Usage
//!
//! ```bash
//! rocketshoes-cart list
//! rocketshoes-cart add 5
//! rocketshoes-cart update 5 3
//! rocketshoes-cart remove 5
//! ```
//!
//! Configuration comes from `ROCKETSHOES_*` environment variables (see
//! `CartConfig`). The resulting cart is printed to stdout as JSON.

use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use rocketshoes_cart::{
    CartConfig, CartStore, HttpCatalogClient, Notification, Notifier, ProductId, SqliteStorage,
    UpdateProductAmount, notify_outcome,
};

#[derive(Parser)]
#[command(name = "rocketshoes-cart")]
#[command(author, version, about = "RocketShoes shopping cart")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the current cart
    List,
    /// Add one unit of a product
    Add {
        /// Product id
        product_id: ProductId,
    },
    /// Remove a product from the cart
    Remove {
        /// Product id
        product_id: ProductId,
    },
    /// Set the amount of a product already in the cart
    Update {
        /// Product id
        product_id: ProductId,

        /// New amount
        #[arg(allow_negative_numbers = true)]
        amount: i64,
    },
}

/// Writes notifications to stderr, one per line.
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: &Notification) {
        eprintln!("{}", notification.message);
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CartConfig::from_env();
    rocketshoes_observability::init_with_format(config.log_format);

    match run(cli, config).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: CartConfig) -> anyhow::Result<ExitCode> {
    let storage = match &config.storage_url {
        Some(url) => SqliteStorage::new(url.clone()),
        None => SqliteStorage::default_location()?,
    };
    let catalog =
        HttpCatalogClient::from_config(&config).context("failed to build catalog client")?;

    tracing::info!(
        "using storefront API at {} and local storage at {}",
        catalog.api_url(),
        storage.url()
    );

    let store = CartStore::load(storage, catalog)
        .await
        .context("failed to load cart from local storage")?;

    let outcome = match cli.command {
        Commands::List => Ok(store.cart()),
        Commands::Add { product_id } => store.add_product(product_id).await,
        Commands::Remove { product_id } => store.remove_product(product_id).await,
        Commands::Update { product_id, amount } => {
            store
                .update_product_amount(UpdateProductAmount { product_id, amount })
                .await
        }
    };

    match notify_outcome(&ConsoleNotifier, outcome) {
        Some(cart) => {
            let json = serde_json::to_string_pretty(&cart).context("failed to render cart")?;
            println!("{json}");
            Ok(ExitCode::SUCCESS)
        }
        None => Ok(ExitCode::FAILURE),
    }
}
