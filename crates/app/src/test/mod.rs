//! Shared test setup.

mod context;
pub(crate) mod helpers;

pub(crate) use context::TestContext;
