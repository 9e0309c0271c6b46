//! # WDSP Common Library
//!
//! Shared code for the WDSP services:
//! - Common error type
//! - TOML configuration file resolution and loading
//! - Logging configuration section

pub mod config;
pub mod error;

pub use error::{Error, Result};
