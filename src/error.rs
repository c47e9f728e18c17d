use std::path::PathBuf;
use thiserror::Error;

use crate::response::FieldError;

/// Failure of a single JSON call to the Mowen API.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("failed to serialize request body")]
    Encode(#[source] serde_json::Error),
    #[error("failed to send request to {endpoint}")]
    Transport {
        endpoint: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("API request failed with status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("failed to decode response from {endpoint}")]
    Decode {
        endpoint: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure of the two-phase local file upload.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload prepare request failed")]
    Prepare(#[source] ApiError),
    #[error("invalid prepare response")]
    MalformedPrepare(#[source] FieldError),
    #[error("failed to open file {}", path.display())]
    OpenFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("file upload request failed")]
    Transfer(#[source] ApiError),
    #[error("upload already failed: {0}")]
    AlreadyFailed(String),
}
