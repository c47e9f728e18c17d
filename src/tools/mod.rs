pub mod create_note;
pub mod edit_note;
pub mod privacy;
pub mod reset_key;
pub mod upload;

pub use create_note::CreateNote;
pub use edit_note::EditNote;
pub use privacy::SetNotePrivacy;
pub use reset_key::ResetApiKey;
pub use upload::{UploadFile, UploadFileViaUrl};

use anyhow::Result;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use thiserror::Error;

/// Tool trait for agent-invoked note operations.
///
/// Not object-safe (associated types). The dispatcher calls tools by
/// concrete type, not `dyn Tool`.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    type Input: DeserializeOwned + JsonSchema + Send;

    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// Run the operation and return a human-readable summary.
    async fn run(&self, input: Self::Input) -> Result<String>;
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    InvalidArguments(serde_json::Error),
    #[error("{0:#}")]
    Failed(anyhow::Error),
}

/// Decode `raw` as the tool's input and run it.
///
/// Malformed arguments are rejected before any network call.
pub async fn invoke<T: Tool>(tool: &T, raw: &[u8]) -> Result<String, ToolError> {
    let input: T::Input = serde_json::from_slice(raw).map_err(ToolError::InvalidArguments)?;

    log::info!("Running tool {}", tool.name());
    tool.run(input).await.map_err(|err| {
        log::error!("Tool {} failed: {:#}", tool.name(), err);
        ToolError::Failed(err)
    })
}

/// JSON schema of a tool's input, advertised to the agent.
pub fn input_schema<T: Tool>() -> Map<String, Value> {
    match serde_json::to_value(schemars::schema_for!(T::Input)) {
        Ok(Value::Object(schema)) => schema,
        _ => Map::new(),
    }
}

pub(crate) fn success_text(headline: &str, details: &str) -> String {
    format!("{}\n\nResponse details:\n{}", headline, details)
}
