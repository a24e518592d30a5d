//! OpenSearch implementation of the backend client.
//!
//! This module provides a concrete implementation of `BackendClient`
//! using OpenSearch as the backend.

mod client;

pub use client::OpenSearchClient;
