use schemars::{JsonSchema, Schema, SchemaGenerator};
use serde::{Deserialize, Deserializer};
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::atom::{self, Atom};

/// Treat an explicit `null` like an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A run of text with optional styling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct TextRun {
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub bold: bool,
    #[serde(default, deserialize_with = "null_as_default")]
    pub highlight: bool,
    /// Link target URL.
    #[serde(default)]
    pub link: Option<String>,
}

#[cfg(test)]
impl TextRun {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

/// A file embedded in a note body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct FileNode {
    /// `image`, `audio` or `pdf`; becomes the atom type as-is.
    pub file_type: String,
    /// `local` or `url`.
    pub source_type: String,
    /// File id or URL. Sent as the `uuid` attribute.
    pub source_path: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub metadata: BTreeMap<String, String>,
}

/// One author-facing paragraph.
///
/// Decoded from `{type?, texts?, note_id?, file?}`. A missing or unrecognized
/// `type` is a plain paragraph.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawParagraph")]
pub enum Paragraph {
    Plain(Vec<TextRun>),
    Quote(Vec<TextRun>),
    NoteReference(String),
    /// `None` when the caller said `file` but sent no file; such paragraphs
    /// are dropped from the document.
    FileReference(Option<FileNode>),
}

#[derive(Deserialize, JsonSchema)]
struct RawParagraph {
    /// `quote`, `note` or `file`; omit for a plain paragraph.
    #[serde(default, rename = "type", deserialize_with = "null_as_default")]
    kind: String,
    #[serde(default, deserialize_with = "null_as_default")]
    texts: Vec<TextRun>,
    /// Referenced note id (type `note` only).
    #[serde(default, deserialize_with = "null_as_default")]
    note_id: String,
    /// Embedded file (type `file` only).
    #[serde(default)]
    file: Option<FileNode>,
}

impl From<RawParagraph> for Paragraph {
    fn from(raw: RawParagraph) -> Self {
        match raw.kind.as_str() {
            "quote" => Paragraph::Quote(raw.texts),
            "note" => Paragraph::NoteReference(raw.note_id),
            "file" => Paragraph::FileReference(raw.file),
            _ => Paragraph::Plain(raw.texts),
        }
    }
}

impl JsonSchema for Paragraph {
    fn schema_name() -> Cow<'static, str> {
        "Paragraph".into()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        RawParagraph::json_schema(generator)
    }
}

/// Convert text runs into `text` atoms, one per run, in order.
///
/// Marks are appended bold, highlight, link. The renderer depends on that
/// order.
pub fn convert_texts(runs: &[TextRun]) -> Vec<Atom> {
    runs.iter()
        .map(|run| {
            let mut marks = Vec::new();
            if run.bold {
                marks.push(Atom::new(atom::BOLD));
            }
            if run.highlight {
                marks.push(Atom::new(atom::HIGHLIGHT));
            }
            if let Some(href) = run.link.as_deref().filter(|href| !href.is_empty()) {
                marks.push(Atom::new(atom::LINK).with_attr(atom::ATTR_HREF, href));
            }

            let mut text = Atom::text(run.text.clone());
            if !marks.is_empty() {
                text.marks = Some(marks);
            }
            text
        })
        .collect()
}

/// Build the `doc` atom for a note body.
pub fn convert_paragraphs(paragraphs: &[Paragraph]) -> Atom {
    let mut content = Vec::with_capacity(paragraphs.len());

    for paragraph in paragraphs {
        match paragraph {
            Paragraph::Quote(runs) => content.push(
                Atom::new(atom::PARAGRAPH)
                    .with_attr(atom::ATTR_BLOCKQUOTE, "true")
                    .with_content(convert_texts(runs)),
            ),
            Paragraph::NoteReference(note_id) => {
                content.push(Atom::new(atom::NOTE).with_attr(atom::ATTR_UUID, note_id.as_str()))
            }
            Paragraph::FileReference(Some(file)) => content.push(convert_file(file)),
            Paragraph::FileReference(None) => {
                log::warn!("Skipping file paragraph without a file");
            }
            Paragraph::Plain(runs) => {
                content.push(Atom::new(atom::PARAGRAPH).with_content(convert_texts(runs)))
            }
        }
    }

    Atom::new(atom::DOC).with_content(content)
}

fn convert_file(file: &FileNode) -> Atom {
    let mut node = Atom::new(file.file_type.as_str())
        .with_attr(atom::ATTR_UUID, file.source_path.as_str())
        .with_attr(atom::ATTR_SOURCE_TYPE, file.source_type.as_str());

    // Metadata overrides the seeded attributes on collision.
    for (key, value) in &file.metadata {
        node = node.with_attr(key.as_str(), value.as_str());
    }
    node
}
