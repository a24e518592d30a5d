//! Command execution.
//!
//! Every command runs against one logical index and renders its outcome as
//! JSON.

use serde_json::{json, Value};
use tenant_search_repository::TenantIndex;
use tenant_search_shared::{BatchRequest, SearchRequest, SettingsSpec};
use tracing::info;

use crate::cli::Command;
use crate::CliError;

fn parse_argument<T: serde::de::DeserializeOwned>(argument: &str, raw: &str) -> Result<T, CliError> {
    serde_json::from_str(raw).map_err(|e| CliError::invalid_argument(argument, e))
}

fn render<T: serde::Serialize>(value: &T) -> Result<Value, CliError> {
    serde_json::to_value(value).map_err(|e| CliError::output(e.to_string()))
}

/// Run `command` against `index`.
pub async fn run(index: &TenantIndex, command: Command) -> Result<Value, CliError> {
    info!(index = %index.physical_index_id(), command = ?command, "Running command");

    match command {
        Command::Put { object_id, body } => {
            let body: Value = parse_argument("body", &body)?;
            let object = index
                .create_or_upsert_object(object_id.as_deref(), body)
                .await?;
            Ok(json!({ "objectID": object.object_id }))
        }
        Command::Get { object_id } => Ok(index.get_object(&object_id).await?),
        Command::GetMany { object_ids } => {
            let objects = index.get_many_objects(&object_ids).await?;
            Ok(json!({ "results": objects }))
        }
        Command::Delete { object_id } => {
            index.delete_object(&object_id).await?;
            Ok(json!({ "deleted": object_id }))
        }
        Command::Query { request } => {
            let request: SearchRequest = parse_argument("request", &request)?;
            render(&index.query(&request).await?)
        }
        Command::Batch { requests } => {
            let requests: Vec<BatchRequest> = parse_argument("requests", &requests)?;
            render(&index.batch(&requests).await?)
        }
        Command::SaveSettings { settings } => {
            let settings: SettingsSpec = parse_argument("settings", &settings)?;
            render(&index.save_settings(&settings).await?)
        }
        Command::GetSettings => render(&index.get_settings().await?),
        Command::Move { destination } => {
            index.move_to(&destination).await?;
            Ok(json!({ "moved": index.physical_index_id(), "to": destination }))
        }
        Command::Drop => {
            index.drop_index().await?;
            Ok(json!({ "dropped": index.physical_index_id() }))
        }
        Command::Stats => render(&index.stats().await?),
    }
}
