//! Command line definition.

use clap::{Parser, Subcommand};

/// Tenant search operator CLI
#[derive(Parser, Debug)]
#[command(name = "tenant-search")]
#[command(author, version, about = "Run tenant search operations against OpenSearch", long_about = None)]
pub struct Args {
    /// Tenant owning the index
    #[arg(short, long, env = "TENANT_ID")]
    pub tenant: String,

    /// Logical index name
    #[arg(short, long)]
    pub index: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Command {
    /// Insert an object, or replace it when --object-id is given
    Put {
        /// Id of the object to replace
        #[arg(long)]
        object_id: Option<String>,
        /// Object body as a JSON object
        body: String,
    },
    /// Read one object
    Get { object_id: String },
    /// Read several objects
    GetMany {
        #[arg(required = true)]
        object_ids: Vec<String>,
    },
    /// Delete one object
    Delete { object_id: String },
    /// Run a search request given as JSON
    Query {
        /// Search request, e.g. '{"query": "shoe", "hitsPerPage": 5}'
        #[arg(default_value = "{}")]
        request: String,
    },
    /// Apply a JSON array of batch operations
    Batch { requests: String },
    /// Declare searchable fields and facets from a JSON settings object
    SaveSettings { settings: String },
    /// Show the settings in effect
    GetSettings,
    /// Point another logical index of the same tenant at this index's storage
    Move { destination: String },
    /// Delete the index and its storage
    Drop,
    /// Show document count and backing generations
    Stats,
}
