//! Remote blob storage for uploaded PDFs
//!
//! The upload service receives the file as a base64 data URI and answers
//! with a JSON document holding the public URL (`secure_url` or `url`).

use crate::config::BlobConfig;
use crate::error::ApiError;
use book_catalog_shared::errors::FieldError;
use book_catalog_shared::validation::validate_pdf_upload;
use async_trait::async_trait;
use base64::Engine;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use uuid::Uuid;

/// A file received from a client, ready to be stored
#[derive(Debug, Clone)]
pub struct PdfUpload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl PdfUpload {
    /// Check the declared content type and size; a blank type counts as missing
    pub fn validate(&self) -> Result<(), FieldError> {
        let content_type = Some(self.content_type.as_str()).filter(|ct| !ct.trim().is_empty());
        validate_pdf_upload(content_type, self.bytes.len())
    }

    fn data_uri(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.content_type,
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("upload service rejected the file with status {status}")]
    Rejected { status: u16, body: Value },

    #[error("upload service unreachable: {0}")]
    Transport(String),

    #[error("upload service response has no url")]
    MissingUrl(Value),
}

impl UploadError {
    /// Upstream payload, passed through to the client
    pub fn details(&self) -> Value {
        match self {
            UploadError::Rejected { status, body } => json!({ "status": status, "err": body }),
            UploadError::Transport(message) => json!({ "err": message }),
            UploadError::MissingUrl(body) => json!({ "err": body }),
        }
    }
}

impl From<UploadError> for ApiError {
    fn from(err: UploadError) -> Self {
        warn!(error = %err, "PDF upload failed");
        ApiError::Upstream {
            message: "something went wrong while processing your request".to_string(),
            details: err.details(),
        }
    }
}

/// Turns raw file bytes into a stable, retrievable URL
#[async_trait]
pub trait BlobUploader: Send + Sync {
    async fn upload(&self, file: PdfUpload) -> Result<String, UploadError>;
}

/// Uploader talking to the configured HTTP upload endpoint
pub struct HttpBlobUploader {
    client: reqwest::Client,
    upload_url: String,
    api_key: SecretString,
    folder: String,
}

impl HttpBlobUploader {
    pub fn new(config: &BlobConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            upload_url: config.upload_url.clone(),
            api_key: SecretString::new(config.api_key.clone()),
            folder: config.folder.clone(),
        })
    }
}

#[async_trait]
impl BlobUploader for HttpBlobUploader {
    async fn upload(&self, file: PdfUpload) -> Result<String, UploadError> {
        let mut request = self.client.post(&self.upload_url).json(&json!({
            "file": file.data_uri(),
            "folder": self.folder,
            "filename": file.file_name,
        }));
        if !self.api_key.expose_secret().is_empty() {
            request = request.bearer_auth(self.api_key.expose_secret());
        }

        let response = request
            .send()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| UploadError::Transport(e.to_string()))?;
        let body: Value = serde_json::from_str(&text).unwrap_or(Value::String(text));

        if !status.is_success() {
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let url = body
            .get("secure_url")
            .or_else(|| body.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string);

        match url {
            Some(url) => {
                debug!(%url, "Uploaded PDF");
                Ok(url)
            }
            None => Err(UploadError::MissingUrl(body)),
        }
    }
}

/// Keeps uploads in process memory under `memory://` URLs
#[derive(Default)]
pub struct InMemoryBlobUploader {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl InMemoryBlobUploader {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, url: &str) -> Option<Vec<u8>> {
        self.blobs.read().await.get(url).cloned()
    }

    pub async fn len(&self) -> usize {
        self.blobs.read().await.len()
    }
}

#[async_trait]
impl BlobUploader for InMemoryBlobUploader {
    async fn upload(&self, file: PdfUpload) -> Result<String, UploadError> {
        let url = format!("memory://books/{}.pdf", Uuid::new_v4());
        self.blobs.write().await.insert(url.clone(), file.bytes);
        Ok(url)
    }
}
