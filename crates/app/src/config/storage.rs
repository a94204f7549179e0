//! Storage Config

use std::path::PathBuf;

use clap::Args;

/// Where carts are persisted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum CartBackend {
    /// Single cart in local storage.
    #[default]
    Local,

    /// Carts in the remote document store, looked up by user.
    Remote,
}

/// Local storage and mock backend settings.
#[derive(Debug, Clone, Default, Args)]
pub struct StorageConfig {
    /// Directory for file-backed local storage; in-memory when omitted
    #[arg(long, env = "STOREFRONT_STORAGE_DIR")]
    pub storage_dir: Option<PathBuf>,

    /// Cart persistence backend (local, remote)
    #[arg(long, env = "STOREFRONT_CART_BACKEND", value_enum, default_value_t = CartBackend::Local)]
    pub cart_backend: CartBackend,

    /// Artificial latency added to every document store call, in milliseconds
    #[arg(long, env = "STOREFRONT_REMOTE_LATENCY_MS", default_value_t = 0_u64)]
    pub remote_latency_ms: u64,

    /// YAML fixture used to seed the catalog; the bundled sample when omitted
    #[arg(long, env = "STOREFRONT_FIXTURE")]
    pub fixture: Option<PathBuf>,
}
