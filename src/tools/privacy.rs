use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

use super::{success_text, Tool};
use crate::mowen::MowenClient;
use crate::requests::{NotePrivacy, NoteSetRequest};

#[derive(Debug, Deserialize, JsonSchema)]
pub struct SetNotePrivacyArgs {
    pub note_id: String,
    /// `public`, `private` or `rule`.
    pub privacy_type: String,
    /// Forbid sharing (rule only).
    #[serde(default)]
    pub no_share: Option<bool>,
    /// Unix timestamp when public access ends, 0 for never (rule only).
    #[serde(default)]
    pub expire_at: Option<i64>,
}

pub struct SetNotePrivacy {
    client: Arc<MowenClient>,
}

impl SetNotePrivacy {
    pub fn new(client: Arc<MowenClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for SetNotePrivacy {
    type Input = SetNotePrivacyArgs;

    fn name(&self) -> &str {
        "set_note_privacy"
    }

    fn description(&self) -> &str {
        "Set who can see a Mowen note"
    }


    async fn run(&self, args: SetNotePrivacyArgs) -> Result<String> {
        let privacy = NotePrivacy::from_args(&args.privacy_type, args.no_share, args.expire_at);
        log::info!("SetNotePrivacy: {} -> {}", args.note_id, privacy.type_name());

        let request = NoteSetRequest::privacy(args.note_id, privacy);
        let response = self
            .client
            .set_note(&request)
            .await
            .context("failed to set note privacy")?;

        Ok(success_text("Note privacy updated successfully!", &response.summary()))
    }
}
