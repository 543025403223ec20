//! HTTP transport
//!
//! Thin wrapper over `reqwest` that owns the cookie jar and logs every
//! exchange. Authentication and retry decisions live in [`crate::api`].

pub mod client;

pub use client::{HttpClient, HttpClientBuilder};
