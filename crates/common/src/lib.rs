//! Shared error definitions and utilities used across all skillsync crates.

pub mod error;
pub mod time;

pub use error::{Context, Error, FromMessage, Result};
