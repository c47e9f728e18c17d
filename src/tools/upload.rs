use anyhow::{Context, Result};
use schemars::JsonSchema;
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;

use super::{success_text, Tool};
use crate::mowen::MowenClient;
use crate::requests::UploadUrlRequest;
use crate::upload::LocalUploadRequest;

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadFileArgs {
    /// Path of the file to upload.
    pub file_path: PathBuf,
    /// 1 image, 2 audio, 3 PDF.
    pub file_type: i32,
    pub file_name: String,
}

/// Uploads a file from the local disk.
pub struct UploadFile {
    client: Arc<MowenClient>,
}

impl UploadFile {
    pub fn new(client: Arc<MowenClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for UploadFile {
    type Input = UploadFileArgs;

    fn name(&self) -> &str {
        "upload_file"
    }

    fn description(&self) -> &str {
        "Upload a local image, audio or PDF file to Mowen"
    }


    async fn run(&self, args: UploadFileArgs) -> Result<String> {
        log::info!("UploadFile: {}", args.file_path.display());

        let request = LocalUploadRequest {
            file_path: args.file_path,
            file_type: args.file_type,
            file_name: args.file_name,
        };
        let response = self
            .client
            .upload_file(request)
            .await
            .context("failed to upload file")?;

        Ok(success_text("File uploaded successfully!", &response.summary()))
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct UploadFileViaUrlArgs {
    pub file_url: String,
    /// 1 image, 2 audio, 3 PDF.
    pub file_type: i32,
    #[serde(default)]
    pub file_name: Option<String>,
}

/// Lets the backend fetch a file from a URL.
pub struct UploadFileViaUrl {
    client: Arc<MowenClient>,
}

impl UploadFileViaUrl {
    pub fn new(client: Arc<MowenClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl Tool for UploadFileViaUrl {
    type Input = UploadFileViaUrlArgs;

    fn name(&self) -> &str {
        "upload_file_via_url"
    }

    fn description(&self) -> &str {
        "Upload an image, audio or PDF file to Mowen from a URL"
    }


    async fn run(&self, args: UploadFileViaUrlArgs) -> Result<String> {
        log::info!("UploadFileViaUrl: {}", args.file_url);

        let request = UploadUrlRequest {
            url: args.file_url,
            file_type: args.file_type,
            file_name: args.file_name.filter(|name| !name.is_empty()),
        };
        let response = self
            .client
            .upload_via_url(&request)
            .await
            .context("failed to upload file via URL")?;

        Ok(success_text("File uploaded via URL successfully!", &response.summary()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mowen::UPLOAD_URL_ENDPOINT;
    use crate::test_support::FakeServer;
    use crate::tools::invoke;
    use serde_json::json;
    use std::io::Write;

    #[tokio::test]
    async fn test_upload_file_runs_both_legs() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"%PDF-1.4").unwrap();

        let server = FakeServer::start_with(|base| {
            vec![
                (
                    200,
                    json!({
                        "data": {
                            "upload_url": format!("{}/oss", base),
                            "form_data": { "token": "t" }
                        }
                    })
                    .to_string(),
                ),
                (200, r#"{"file":{"fileId":"pdf-1"}}"#.to_string()),
            ]
        })
        .await;
        let tool = UploadFile::new(Arc::new(server.client()));

        let raw = json!({
            "file_path": file.path(),
            "file_type": 3,
            "file_name": "doc.pdf"
        })
        .to_string();
        let text = invoke(&tool, raw.as_bytes()).await.unwrap();

        assert!(text.starts_with("File uploaded successfully!"));
        assert!(text.contains("pdf-1"));
        assert_eq!(server.requests().len(), 2);
        assert!(server.requests()[1].body_text().contains("%PDF-1.4"));
    }

    #[tokio::test]
    async fn test_upload_file_reports_missing_field() {
        let server = FakeServer::start(vec![(200, r#"{"data":{"upload_url":"x"}}"#.to_string())]).await;
        let tool = UploadFile::new(Arc::new(server.client()));

        let raw = br#"{"file_path": "/tmp/none", "file_type": 1, "file_name": "a.png"}"#;
        let err = invoke(&tool, raw).await.unwrap_err();

        assert_eq!(
            err.to_string(),
            "failed to upload file: invalid prepare response: missing field `form_data`"
        );
        assert_eq!(server.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_upload_via_url_omits_empty_name() {
        let server = FakeServer::start(vec![(200, r#"{"file":{"fileId":"img"}}"#.to_string())]).await;
        let tool = UploadFileViaUrl::new(Arc::new(server.client()));

        let raw = br#"{"file_url": "https://example.com/a.png", "file_type": 1, "file_name": ""}"#;
        let text = invoke(&tool, raw).await.unwrap();
        assert!(text.starts_with("File uploaded via URL successfully!"));

        let sent = &server.requests()[0];
        assert_eq!(sent.path, UPLOAD_URL_ENDPOINT);
        assert_eq!(
            sent.body_json(),
            json!({ "url": "https://example.com/a.png", "file_type": 1 })
        );
    }
}
