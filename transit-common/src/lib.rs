//! Shared error types and utilities for the transit-route toolkit

pub mod error;

pub use error::{suggest_closest, Error, Result};
