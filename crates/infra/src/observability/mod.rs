//! Observability infrastructure
//!
//! Structured logging through `tracing`. Library code only emits events;
//! binaries and test harnesses call [`init_tracing`] once at startup.

pub mod logging;

pub use logging::{build_filter, init_tracing};
