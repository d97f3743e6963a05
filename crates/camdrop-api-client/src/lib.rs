//! HTTP client for the media-hosting upload endpoint.
//!
//! One request per upload: `POST {base}/v1_1/{cloud_name}/image/upload` with a
//! multipart body of `file`, `upload_preset` and `api_key`. Only status 200 with a
//! JSON body carrying a `url` counts as success. Nothing is retried.

pub mod progress;

pub use progress::{no_progress, ProgressCallback};

use camdrop_core::constants::{
    API_VERSION_SEGMENT, DEFAULT_API_BASE_URL, FORM_FIELD_API_KEY, FORM_FIELD_FILE,
    FORM_FIELD_UPLOAD_PRESET,
};
use camdrop_core::{EncodeError, EncodedPayload, UploadCredentials, UploadError, UploadResult};
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 60;
const MAX_ERROR_BODY_CHARS: usize = 512;

/// HTTP client for the hosting API's unsigned upload endpoint.
#[derive(Clone, Debug)]
pub struct UploadClient {
    client: Client,
    base_url: String,
}

impl UploadClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self, UploadError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| UploadError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Client for the public hosting API.
    pub fn hosted() -> Result<Self, UploadError> {
        Self::new(DEFAULT_API_BASE_URL)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn upload_url(&self, cloud_name: &str) -> String {
        format!(
            "{}/{}/{}/image/upload",
            self.base_url, API_VERSION_SEGMENT, cloud_name
        )
    }

    /// Upload a payload, reporting progress as the file part is sent.
    pub async fn upload_image(
        &self,
        payload: EncodedPayload,
        credentials: &UploadCredentials,
        on_progress: ProgressCallback,
    ) -> Result<UploadResult, UploadError> {
        credentials.check()?;

        let url = self.upload_url(&credentials.cloud_name);
        let size_bytes = payload.len();
        let form = build_form(payload, credentials, on_progress)?;

        tracing::debug!(url = %url, size_bytes, "Sending upload request");

        let response = self
            .client
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| UploadError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| UploadError::Network(format!("Failed to read response: {}", e)))?;

        let result = parse_upload_response(status, &body);
        match &result {
            Ok(uploaded) => tracing::info!(url = %uploaded.hosted_url, "Upload completed"),
            Err(e) => tracing::warn!(status, error = %e, "Upload failed"),
        }
        result
    }
}

/// Build the multipart form in the field order the hosting API documents.
pub fn build_form(
    payload: EncodedPayload,
    credentials: &UploadCredentials,
    on_progress: ProgressCallback,
) -> Result<Form, UploadError> {
    let length = payload.len() as u64;
    let file = Part::stream_with_length(progress::progress_body(payload.data, on_progress), length)
        .file_name(payload.filename)
        .mime_str(&payload.content_type)
        .map_err(|e| {
            tracing::debug!(content_type = %payload.content_type, error = %e, "Unparseable content type");
            EncodeError::UnsupportedContentType(payload.content_type.clone())
        })?;

    Ok(Form::new()
        .part(FORM_FIELD_FILE, file)
        .text(FORM_FIELD_UPLOAD_PRESET, credentials.preset_name.clone())
        .text(FORM_FIELD_API_KEY, credentials.api_key.clone()))
}

/// Interpret the hosting API's response.
pub fn parse_upload_response(status: u16, body: &str) -> Result<UploadResult, UploadError> {
    if status != 200 {
        return Err(UploadError::UploadRejected {
            status,
            message: truncate(body, MAX_ERROR_BODY_CHARS),
        });
    }

    let result: UploadResult =
        serde_json::from_str(body).map_err(|e| UploadError::UploadRejected {
            status,
            message: format!("Malformed response body: {}", e),
        })?;

    if result.hosted_url.trim().is_empty() {
        return Err(UploadError::UploadRejected {
            status,
            message: "Malformed response body: empty url".to_string(),
        });
    }

    Ok(result)
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(max_chars).collect();
        out.push_str("...");
        out
    }
}
