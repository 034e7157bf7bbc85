//! Shared test utilities for the step-config workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`workspace`]: [`TestWorkspace`] temporary pipeline directory with
//!   configuration documents, a shared-environment directory and a secrets
//!   directory
//! - [`fixtures`]: ready-made metadata and configuration documents

pub mod fixtures;
pub mod workspace;

pub use workspace::TestWorkspace;
