//! Storefront client: services, adapters and facades over the storefront domain.

pub mod config;
pub mod context;
pub mod domain;
pub mod facades;
pub mod observability;
pub mod storage;

#[cfg(test)]
mod test;
