use reqwest::multipart::{Form, Part};
use reqwest::Body;
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::UploadError;
use crate::mowen::MowenClient;
use crate::requests::UploadPrepareRequest;
use crate::response::{string_entries, ApiResponse, FieldAccess, FieldError};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalUploadRequest {
    pub file_path: PathBuf,
    pub file_type: i32,
    pub file_name: String,
}

/// One-time upload slot returned by the prepare endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedUpload {
    pub upload_url: String,
    pub form_data: BTreeMap<String, String>,
}

impl PreparedUpload {
    /// Read `data.upload_url` and `data.form_data`. Non-string form values
    /// are dropped.
    pub fn from_response(response: &ApiResponse) -> Result<Self, FieldError> {
        let data = response.object_field("data")?;
        let upload_url = data.str_field("upload_url")?.to_string();
        let form_data = string_entries(data.object_field("form_data")?);

        Ok(Self {
            upload_url,
            form_data,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadState {
    NotStarted,
    Prepared(PreparedUpload),
    Uploaded(ApiResponse),
    Failed(String),
}

/// Drives a local file upload forward: NotStarted → Prepared → Uploaded.
///
/// Any failing step moves to `Failed`, which is terminal. Nothing is retried
/// and a prepared slot is not released on failure.
pub struct LocalUpload<'a> {
    client: &'a MowenClient,
    request: LocalUploadRequest,
    state: UploadState,
}

impl<'a> LocalUpload<'a> {
    pub fn new(client: &'a MowenClient, request: LocalUploadRequest) -> Self {
        Self {
            client,
            request,
            state: UploadState::NotStarted,
        }
    }

    pub fn state(&self) -> &UploadState {
        &self.state
    }

    /// Perform the next transition.
    pub async fn advance(&mut self) -> Result<(), UploadError> {
        let next = match std::mem::replace(&mut self.state, UploadState::NotStarted) {
            UploadState::NotStarted => self.prepare().await.map(UploadState::Prepared),
            UploadState::Prepared(prepared) => {
                self.transfer(&prepared).await.map(UploadState::Uploaded)
            }
            UploadState::Uploaded(response) => Ok(UploadState::Uploaded(response)),
            UploadState::Failed(reason) => {
                self.state = UploadState::Failed(reason.clone());
                return Err(UploadError::AlreadyFailed(reason));
            }
        };

        match next {
            Ok(state) => {
                self.state = state;
                Ok(())
            }
            Err(err) => {
                self.state = UploadState::Failed(describe(&err));
                Err(err)
            }
        }
    }

    /// Advance until the upload completes or fails.
    pub async fn run(&mut self) -> Result<ApiResponse, UploadError> {
        loop {
            if let UploadState::Uploaded(response) = &self.state {
                return Ok(response.clone());
            }
            self.advance().await?;
        }
    }

    async fn prepare(&self) -> Result<PreparedUpload, UploadError> {
        let request = UploadPrepareRequest {
            file_type: self.request.file_type,
            file_name: self.request.file_name.clone(),
        };
        let response = self
            .client
            .prepare_upload(&request)
            .await
            .map_err(UploadError::Prepare)?;
        let prepared =
            PreparedUpload::from_response(&response).map_err(UploadError::MalformedPrepare)?;

        log::info!(
            "Upload prepared for {} ({} form fields)",
            self.request.file_name,
            prepared.form_data.len()
        );
        Ok(prepared)
    }

    async fn transfer(&self, prepared: &PreparedUpload) -> Result<ApiResponse, UploadError> {
        let open_error = |source| UploadError::OpenFile {
            path: self.request.file_path.clone(),
            source,
        };
        let file = tokio::fs::File::open(&self.request.file_path)
            .await
            .map_err(open_error)?;
        let length = file.metadata().await.map_err(open_error)?.len();

        let mut form = Form::new();
        for (key, value) in &prepared.form_data {
            form = form.text(key.clone(), value.clone());
        }
        let part = Part::stream_with_length(Body::from(file), length)
            .file_name(self.request.file_name.clone());
        form = form.part("file", part);

        let response = self
            .client
            .post_multipart(&prepared.upload_url, form)
            .await
            .map_err(UploadError::Transfer)?;

        log::info!("Uploaded {} ({} bytes)", self.request.file_name, length);
        Ok(response)
    }
}

fn describe(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(inner) = source {
        message.push_str(": ");
        message.push_str(&inner.to_string());
        source = inner.source();
    }
    message
}
