use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

use super::{success_text, Tool};
use crate::mowen::MowenClient;
use crate::paragraph::{null_as_default, Paragraph};
use crate::requests::NoteCreateRequest;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateNoteArgs {
    /// Rich-text paragraphs of the note body.
    pub paragraphs: Vec<Paragraph>,
    /// Publish the note right away.
    #[serde(default, deserialize_with = "null_as_default")]
    pub auto_publish: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub tags: Vec<String>,
}

/// Creates a new note.
pub struct CreateNote {
    client: Arc<MowenClient>,
}

impl CreateNote {
    pub fn new(client: Arc<MowenClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for CreateNote {
    type Input = CreateNoteArgs;

    fn name(&self) -> &str {
        "create_note"
    }

    fn description(&self) -> &str {
        "Create a new Mowen note from rich-text paragraphs"
    }


    async fn run(&self, args: CreateNoteArgs) -> Result<String> {
        log::info!("CreateNote: {} paragraph(s)", args.paragraphs.len());

        let request = NoteCreateRequest::new(&args.paragraphs, args.auto_publish, args.tags);
        let response = self
            .client
            .create_note(&request)
            .await
            .context("failed to create note")?;

        Ok(success_text("Note created successfully!", &response.summary()))
    }
}
