//! Authentication primitives shared across TradePort crates.
//!
//! # Safety and Quality
//!
//! The crate has no I/O of its own beyond credential storage: HTTP lives in
//! `tradeport-infra`, which plugs into the [`auth::RefreshClient`] seam.
//!
//! # Features
//!
//! - `keychain`: platform keychain credential store
//! - `test-utils`: mock refresh client for downstream test suites

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod auth;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;
