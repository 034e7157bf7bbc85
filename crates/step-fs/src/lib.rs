//! File access layer for step configuration
//!
//! Provides format-detected document loading and safe, locked writes.

pub mod config;
pub mod error;
pub mod io;

pub use config::{ConfigStore, DocumentFormat};
pub use error::{Error, Result};
