//! Testing utilities and helpers
//!
//! - **[`mocks`]**: Mock implementations of the auth traits
//!
//! Enabled for this crate's own tests and, through the `test-utils` feature,
//! for downstream test suites.

pub mod mocks;

pub use mocks::MockRefreshClient;
