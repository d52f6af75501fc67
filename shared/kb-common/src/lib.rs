//! Lorekeep Common Library
//!
//! Shared types and utilities used by the server and future API clients.

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;
