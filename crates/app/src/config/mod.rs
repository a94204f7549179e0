//! Application configuration module

use clap::Parser;

use crate::config::{logging::LoggingConfig, pricing::PricingConfig, storage::StorageConfig};

pub mod logging;
pub mod pricing;
pub mod storage;

pub use logging::LogFormat;
pub use storage::CartBackend;

/// Storefront configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "storefront", about = "Storefront client", long_about = None)]
pub struct AppConfig {
    /// Local storage and mock backend settings.
    #[command(flatten)]
    pub storage: StorageConfig,

    /// Tax and shipping settings.
    #[command(flatten)]
    pub pricing: PricingConfig,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// In-memory configuration with default pricing, for tests and embedding.
    pub fn in_memory() -> Self {
        Self {
            storage: StorageConfig::default(),
            pricing: PricingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}
