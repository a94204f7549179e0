//! Authentication and users

pub mod errors;
pub mod models;
pub mod provider;
pub mod repository;
pub mod service;

pub use errors::AuthError;
pub use models::NewUser;
pub use provider::{AuthProvider, LocalAuthProvider, MIN_PASSWORD_LEN, MockAuthProvider};
pub use repository::{MockUsersRepository, RemoteUsersRepository, UsersRepository};
pub use service::AuthService;
