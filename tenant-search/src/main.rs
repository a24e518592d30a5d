//! Tenant Search Main Entry Point
//!
//! Runs one tenant search operation against OpenSearch and prints the result
//! as JSON on stdout.

use clap::Parser;
use dotenv::dotenv;
use serde_json::json;
use std::env;
use tenant_search::{commands, Args, CliError, Dependencies};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize tracing/logging.
///
/// Logs go to stderr so stdout only carries command output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("tenant_search=info,tenant_search_repository=info"));

    let json_logs = env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json"));

    if json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .init();

        info!(
            service_name = "tenant-search",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with JSON format"
        );
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .pretty(),
            )
            .init();

        info!(
            service_name = "tenant-search",
            service_version = env!("CARGO_PKG_VERSION"),
            "Tracing initialized with console output"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    // Load environment variables from .env file
    dotenv().ok();

    let args = Args::parse();

    init_tracing();

    let deps = match Dependencies::new().await {
        Ok(deps) => {
            info!("Dependencies initialized successfully");
            deps
        }
        Err(e) => {
            error!(error = %e, "Failed to initialize dependencies");
            return Err(e);
        }
    };

    let index = deps.service.index(&args.tenant, &args.index);
    match commands::run(&index, args.command).await {
        Ok(output) => {
            let rendered =
                serde_json::to_string_pretty(&output).map_err(|e| CliError::output(e.to_string()))?;
            println!("{}", rendered);
            Ok(())
        }
        Err(e) => {
            // Catalogued not-found outcomes are printed in their tagged form
            if let Some(domain) = e.search_error().and_then(|s| s.domain_error()) {
                println!("{}", json!({ "error": e.to_string(), "domainError": domain }));
            }
            error!(error = %e, "Command failed");
            Err(e)
        }
    }
}
