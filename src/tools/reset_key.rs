use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

use super::{success_text, Tool};
use crate::mowen::MowenClient;

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct ResetApiKeyArgs {}

/// Rotates the API key. The running client keeps the old key, so every
/// later call fails until the server is restarted with the new one.
pub struct ResetApiKey {
    client: Arc<MowenClient>,
}

impl ResetApiKey {
    pub fn new(client: Arc<MowenClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for ResetApiKey {
    type Input = ResetApiKeyArgs;

    fn name(&self) -> &str {
        "reset_api_key"
    }

    fn description(&self) -> &str {
        "Reset the Mowen API key. The current key stops working immediately."
    }


    async fn run(&self, _args: ResetApiKeyArgs) -> Result<String> {
        log::warn!("ResetApiKey: rotating the API key");

        let response = self
            .client
            .reset_api_key()
            .await
            .context("failed to reset API key")?;

        Ok(success_text(
            "API key reset successfully!\n\nWarning: the previous key is no longer valid.",
            &response.summary(),
        ))
    }
}
