//! Interface definitions for the search backend.
//!
//! This module defines the abstract `BackendClient` trait that allows for
//! dependency injection and swappable backend implementations.

mod backend_client;

pub use backend_client::BackendClient;
