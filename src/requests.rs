use serde::{Deserialize, Serialize, Serializer};

use crate::atom::Atom;
use crate::paragraph::{convert_paragraphs, Paragraph};

/// Settings category for note privacy. The only one the backend defines.
pub const PRIVACY_SECTION: u32 = 1;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSettings {
    #[serde(rename = "autoPublish", default, skip_serializing_if = "is_false")]
    pub auto_publish: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteCreateRequest {
    pub body: Atom,
    #[serde(default)]
    pub settings: CreateSettings,
}

impl NoteCreateRequest {
    pub fn new(paragraphs: &[Paragraph], auto_publish: bool, tags: Vec<String>) -> Self {
        Self {
            body: convert_paragraphs(paragraphs),
            settings: CreateSettings { auto_publish, tags },
        }
    }
}

/// Replaces the whole body of an existing note.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteEditRequest {
    #[serde(rename = "noteId")]
    pub note_id: String,
    pub body: Atom,
}

impl NoteEditRequest {
    pub fn new(note_id: impl Into<String>, paragraphs: &[Paragraph]) -> Self {
        Self {
            note_id: note_id.into(),
            body: convert_paragraphs(paragraphs),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrivacyRule {
    #[serde(rename = "noShare", skip_serializing_if = "Option::is_none")]
    pub no_share: Option<bool>,
    /// Unix timestamp as a base-10 string.
    #[serde(rename = "expireAt", skip_serializing_if = "Option::is_none")]
    pub expire_at: Option<String>,
}

/// Who can see a note.
///
/// Types the backend may add later pass through as `Other`; the backend
/// decides whether they are valid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NotePrivacy {
    Public,
    Private,
    Rule(PrivacyRule),
    Other(String),
}

impl NotePrivacy {
    /// Rule fields are only read when `privacy_type` is `rule`.
    pub fn from_args(privacy_type: &str, no_share: Option<bool>, expire_at: Option<i64>) -> Self {
        match privacy_type {
            "public" => NotePrivacy::Public,
            "private" => NotePrivacy::Private,
            "rule" => NotePrivacy::Rule(PrivacyRule {
                no_share,
                expire_at: expire_at.map(|ts| ts.to_string()),
            }),
            other => NotePrivacy::Other(other.to_string()),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            NotePrivacy::Public => "public",
            NotePrivacy::Private => "private",
            NotePrivacy::Rule(_) => "rule",
            NotePrivacy::Other(name) => name,
        }
    }
}

impl Serialize for NotePrivacy {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Wire<'a> {
            #[serde(rename = "type")]
            kind: &'a str,
            #[serde(skip_serializing_if = "Option::is_none")]
            rule: Option<&'a PrivacyRule>,
        }

        let rule = match self {
            NotePrivacy::Rule(rule) => Some(rule),
            _ => None,
        };
        Wire {
            kind: self.type_name(),
            rule,
        }
        .serialize(serializer)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteSettings {
    pub privacy: NotePrivacy,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NoteSetRequest {
    #[serde(rename = "noteId")]
    pub note_id: String,
    pub section: u32,
    pub settings: NoteSettings,
}

impl NoteSetRequest {
    pub fn privacy(note_id: impl Into<String>, privacy: NotePrivacy) -> Self {
        Self {
            note_id: note_id.into(),
            section: PRIVACY_SECTION,
            settings: NoteSettings { privacy },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct KeyResetRequest {}

/// First leg of a local upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadPrepareRequest {
    pub file_type: i32,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UploadUrlRequest {
    pub url: String,
    pub file_type: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

fn is_false(value: &bool) -> bool {
    !*value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paragraph::TextRun;
    use serde_json::json;

    #[test]
    fn test_create_request_round_trip() {
        let paragraphs = vec![Paragraph::Plain(vec![TextRun::plain("hi")])];
        let request = NoteCreateRequest::new(&paragraphs, true, vec!["rust".into(), "notes".into()]);

        let encoded = serde_json::to_string(&request).unwrap();
        let decoded: NoteCreateRequest = serde_json::from_str(&encoded).unwrap();

        assert_eq!(decoded.body.kind, "doc");
        assert!(decoded.settings.auto_publish);
        assert_eq!(decoded.settings.tags, vec!["rust", "notes"]);
        assert_eq!(decoded, request);
    }

    #[test]
    fn test_create_request_default_settings_round_trip() {
        let request = NoteCreateRequest::new(&[], false, vec![]);
        let encoded = serde_json::to_value(&request).unwrap();
        assert_eq!(encoded["settings"], json!({}));

        let decoded: NoteCreateRequest = serde_json::from_value(encoded).unwrap();
        assert!(!decoded.settings.auto_publish);
        assert!(decoded.settings.tags.is_empty());
    }

    #[test]
    fn test_edit_request_shape() {
        let request = NoteEditRequest::new("n1", &[Paragraph::NoteReference("n2".into())]);
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["noteId"], "n1");
        assert_eq!(json["body"]["content"][0]["attrs"]["uuid"], "n2");
    }

    #[test]
    fn test_rule_privacy_with_all_fields() {
        let privacy = NotePrivacy::from_args("rule", Some(true), Some(1_700_000_000));
        let request = NoteSetRequest::privacy("n1", privacy);
        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(
            json,
            json!({
                "noteId": "n1",
                "section": 1,
                "settings": {
                    "privacy": {
                        "type": "rule",
                        "rule": { "noShare": true, "expireAt": "1700000000" }
                    }
                }
            })
        );
    }

    #[test]
    fn test_rule_privacy_omits_absent_fields() {
        let privacy = NotePrivacy::from_args("rule", None, None);
        let json = serde_json::to_value(&privacy).unwrap();
        assert_eq!(json, json!({ "type": "rule", "rule": {} }));
    }

    #[test]
    fn test_rule_fields_ignored_for_public() {
        let privacy = NotePrivacy::from_args("public", Some(true), Some(5));
        assert_eq!(privacy, NotePrivacy::Public);
        assert_eq!(serde_json::to_value(&privacy).unwrap(), json!({ "type": "public" }));
    }

    #[test]
    fn test_unknown_privacy_type_passes_through() {
        let privacy = NotePrivacy::from_args("friends", None, None);
        assert_eq!(serde_json::to_value(&privacy).unwrap(), json!({ "type": "friends" }));
    }

    #[test]
    fn test_upload_url_request_omits_missing_name() {
        let request = UploadUrlRequest {
            url: "https://x/cat.png".into(),
            file_type: 1,
            file_name: None,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({ "url": "https://x/cat.png", "file_type": 1 })
        );
    }

    #[test]
    fn test_key_reset_request_is_empty_object() {
        assert_eq!(serde_json::to_string(&KeyResetRequest::default()).unwrap(), "{}");
    }
}
