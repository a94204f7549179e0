//! Catalog

pub mod errors;
pub mod favorites;
pub mod query;
pub mod recently_viewed;
pub mod repository;
pub mod service;

pub use errors::CatalogServiceError;
pub use favorites::FavoritesService;
pub use query::{CategorySummary, ProductPage, ProductQuery, ProductSort};
pub use recently_viewed::RecentlyViewedService;
pub use repository::{MockProductsRepository, ProductsRepository, RemoteProductsRepository};
pub use service::*;
