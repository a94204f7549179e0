use std::{error::Error, path::PathBuf};

use clap::{Parser, Subcommand};
use storefront_app::{config::AppConfig, context::AppContext, observability::init_logging};

mod cart;
mod catalog;
mod checkout;

/// Used when no storage directory is configured, so the cart survives between runs.
const DEFAULT_STORAGE_DIR: &str = ".storefront";

#[derive(Debug, Parser)]
#[command(name = "storefront-cli", about = "Storefront CLI", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AppConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Catalog(catalog::CatalogCommand),
    Cart(cart::CartCommand),
    Checkout(checkout::CheckoutArgs),
}

impl Cli {
    pub(crate) async fn run(self) -> Result<(), String> {
        let mut config = self.config;

        init_logging(&config.logging).map_err(|error| report(&error))?;

        config
            .storage
            .storage_dir
            .get_or_insert_with(|| PathBuf::from(DEFAULT_STORAGE_DIR));

        let ctx = AppContext::from_config(&config)
            .await
            .map_err(|error| report(&error))?;

        match self.command {
            Commands::Catalog(command) => catalog::run(&ctx, command).await,
            Commands::Cart(command) => cart::run(&ctx, command).await,
            Commands::Checkout(args) => checkout::run(&ctx, args).await,
        }
    }
}

/// Error message followed by its sources.
pub(crate) fn report(error: &dyn Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();

    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }

    message
}
