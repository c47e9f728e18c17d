use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DOC: &str = "doc";
pub const PARAGRAPH: &str = "paragraph";
pub const TEXT: &str = "text";
pub const NOTE: &str = "note";
pub const BOLD: &str = "bold";
pub const HIGHLIGHT: &str = "highlight";
pub const LINK: &str = "link";

pub const ATTR_BLOCKQUOTE: &str = "blockquote";
pub const ATTR_UUID: &str = "uuid";
pub const ATTR_SOURCE_TYPE: &str = "sourceType";
pub const ATTR_HREF: &str = "href";

/// A node of the Mowen rich-document tree.
///
/// The same shape is used for containers (`doc`, `paragraph`), leaves
/// (`text`, `note`, file nodes) and marks (`bold`, `highlight`, `link`).
/// Empty fields are left off the wire entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Atom {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content: Vec<Atom>,
    /// `None` when the text carries no styling; never `Some(vec![])`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Vec<Atom>>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
}

impl Atom {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// A `text` leaf. The content is kept verbatim, empty strings included.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            kind: TEXT.to_string(),
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(key.into(), value.into());
        self
    }

    pub fn with_content(mut self, content: Vec<Atom>) -> Self {
        self.content = content;
        self
    }
}

#[cfg(test)]
impl Atom {
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).map(String::as_str)
    }
}
