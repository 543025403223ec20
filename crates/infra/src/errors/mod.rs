//! Conversions between transport, API and domain errors.

mod conversions;
