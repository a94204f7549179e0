//! Facades
//!
//! The layer a UI binds to. Each facade forwards to services, publishes a
//! [`ViewState`] on a watch channel and reports failures as readable
//! messages through the [`Notifier`].

pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod messages;
pub mod notifications;
pub mod state;

pub use auth::AuthFacade;
pub use cart::CartFacade;
pub use catalog::CatalogFacade;
pub use checkout::CheckoutFacade;
pub use messages::UserFacingError;
pub use notifications::{Notification, NotificationLevel, Notifier};
pub use state::{ViewState, ViewStore};
