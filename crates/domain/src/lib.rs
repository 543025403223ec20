//! # TradePort Domain
//!
//! Shared domain types for the TradePort marketplace client.
//!
//! This crate contains:
//! - Domain error types and Result definitions
//! - Configuration structures
//! - Storage keys and endpoint constants
//!
//! ## Architecture
//! - No dependencies on other TradePort crates
//! - Only external dependencies allowed
//! - Pure data structures, no I/O

pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
