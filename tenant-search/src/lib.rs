//! # Tenant Search
//!
//! Operator CLI for the tenant search façade. Runs single operations against
//! a tenant's logical index on OpenSearch and prints the outcome as JSON.
//!
//! ## Modules
//!
//! - [`cli`]: Command line definition
//! - [`commands`]: Runs a command against a logical index
//! - [`config`]: Configuration and dependency initialization
//! - [`errors`]: Error types for the CLI

pub mod cli;
pub mod commands;
pub mod config;
pub mod errors;

pub use cli::{Args, Command};
pub use config::Dependencies;
pub use errors::CliError;
