use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

use super::{success_text, Tool};
use crate::mowen::MowenClient;
use crate::paragraph::Paragraph;
use crate::requests::NoteEditRequest;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct EditNoteArgs {
    /// Id of the note to edit.
    pub note_id: String,
    /// New rich-text paragraphs; the old body is discarded.
    pub paragraphs: Vec<Paragraph>,
}

/// Replaces the body of an existing note. There is no partial edit.
pub struct EditNote {
    client: Arc<MowenClient>,
}

impl EditNote {
    pub fn new(client: Arc<MowenClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for EditNote {
    type Input = EditNoteArgs;

    fn name(&self) -> &str {
        "edit_note"
    }

    fn description(&self) -> &str {
        "Replace the content of an existing Mowen note with new rich-text paragraphs"
    }


    async fn run(&self, args: EditNoteArgs) -> Result<String> {
        log::info!("EditNote: {} ({} paragraph(s))", args.note_id, args.paragraphs.len());

        let request = NoteEditRequest::new(args.note_id, &args.paragraphs);
        let response = self
            .client
            .edit_note(&request)
            .await
            .context("failed to edit note")?;

        Ok(success_text("Note edited successfully!", &response.summary()))
    }
}
