//! Query translation: structured search requests to backend query DSL, and
//! backend responses back to query results.

pub mod compiler;
pub mod facets;

pub use compiler::{parse_hits, CompiledQuery, QueryCompiler};
pub use facets::parse_facets;
