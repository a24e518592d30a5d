//! This module defines the core data structures exchanged with callers of the
//! tenant search façade.

pub mod batch;
pub mod error;
pub mod indexed_object;
pub mod search_request;
pub mod search_result;
pub mod settings;
