use anyhow::{Context, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::Form;
use reqwest::StatusCode;
use serde::Serialize;
use std::time::Duration;

use crate::config::MowenConfig;
use crate::error::{ApiError, UploadError};
use crate::requests::{
    KeyResetRequest, NoteCreateRequest, NoteEditRequest, NoteSetRequest, UploadPrepareRequest,
    UploadUrlRequest,
};
use crate::response::ApiResponse;
use crate::upload::{LocalUpload, LocalUploadRequest, UploadState};

pub const DEFAULT_BASE_URL: &str = "https://open.mowen.cn";

pub const NOTE_CREATE_ENDPOINT: &str = "/api/open/api/v1/note/create";
pub const NOTE_EDIT_ENDPOINT: &str = "/api/open/api/v1/note/edit";
pub const NOTE_SET_ENDPOINT: &str = "/api/open/api/v1/note/set";
pub const KEY_RESET_ENDPOINT: &str = "/api/open/api/v1/auth/key/reset";
pub const UPLOAD_PREPARE_ENDPOINT: &str = "/api/open/api/v1/upload/prepare";
pub const UPLOAD_URL_ENDPOINT: &str = "/api/open/api/v1/upload/url";

/// Shared HTTP client for the Mowen open API.
///
/// Immutable after construction, so one instance serves concurrent tool
/// calls behind an `Arc`. Every request is bounded by the configured timeout
/// and is never retried.
pub struct MowenClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl MowenClient {
    pub fn new(config: &MowenConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn create_note(&self, request: &NoteCreateRequest) -> Result<ApiResponse, ApiError> {
        self.post_json(NOTE_CREATE_ENDPOINT, request).await
    }

    pub async fn edit_note(&self, request: &NoteEditRequest) -> Result<ApiResponse, ApiError> {
        self.post_json(NOTE_EDIT_ENDPOINT, request).await
    }

    pub async fn set_note(&self, request: &NoteSetRequest) -> Result<ApiResponse, ApiError> {
        self.post_json(NOTE_SET_ENDPOINT, request).await
    }

    /// Invalidates the key this client was built with.
    pub async fn reset_api_key(&self) -> Result<ApiResponse, ApiError> {
        self.post_json(KEY_RESET_ENDPOINT, &KeyResetRequest::default())
            .await
    }

    pub async fn upload_via_url(&self, request: &UploadUrlRequest) -> Result<ApiResponse, ApiError> {
        self.post_json(UPLOAD_URL_ENDPOINT, request).await
    }

    pub async fn prepare_upload(
        &self,
        request: &UploadPrepareRequest,
    ) -> Result<ApiResponse, ApiError> {
        self.post_json(UPLOAD_PREPARE_ENDPOINT, request).await
    }

    /// Upload a local file: prepare, then POST the file to the returned URL.
    pub async fn upload_file(&self, request: LocalUploadRequest) -> Result<ApiResponse, UploadError> {
        let mut upload = LocalUpload::new(self, request);
        let result = upload.run().await;
        if let UploadState::Failed(reason) = upload.state() {
            log::error!("Mowen: local upload failed: {}", reason);
        }
        result
    }

    /// POST a multipart form to an upload URL handed out by the prepare step.
    ///
    /// The URL is pre-signed, so no bearer token is attached.
    pub async fn post_multipart(&self, url: &str, form: Form) -> Result<ApiResponse, ApiError> {
        log::info!("Mowen: POST multipart upload");

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: url.to_string(),
                source,
            })?;

        Self::read_response(url, response).await
    }

    async fn post_json<T>(&self, endpoint: &str, body: &T) -> Result<ApiResponse, ApiError>
    where
        T: Serialize + ?Sized,
    {
        log::info!("Mowen: POST {}", endpoint);

        let payload = serde_json::to_vec(body).map_err(ApiError::Encode)?;
        let response = self
            .client
            .post(format!("{}{}", self.base_url, endpoint))
            .header(CONTENT_TYPE, "application/json")
            .bearer_auth(&self.api_key)
            .body(payload)
            .send()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        Self::read_response(endpoint, response).await
    }

    async fn read_response(
        endpoint: &str,
        response: reqwest::Response,
    ) -> Result<ApiResponse, ApiError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| ApiError::Transport {
                endpoint: endpoint.to_string(),
                source,
            })?;

        if status != StatusCode::OK {
            log::warn!("Mowen: {} returned {}", endpoint, status);
            return Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        ApiResponse::from_slice(&body).map_err(|source| ApiError::Decode {
            endpoint: endpoint.to_string(),
            source,
        })
    }
}
