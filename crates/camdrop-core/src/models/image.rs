use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Which acquisition path produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    FromCamera,
    FromFile,
}

/// Displayable form of an image: a `data:<mime>;base64,<payload>` URL plus the
/// dimensions found while decoding it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreviewHandle {
    pub data_url: String,
    pub mime_type: String,
    pub width: u32,
    pub height: u32,
}

impl PreviewHandle {
    pub fn as_data_url(&self) -> &str {
        &self.data_url
    }
}

/// An image the user has supplied but not yet confirmed for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateImage {
    pub id: Uuid,
    pub source: ImageSource,
    pub filename: String,
    pub preview: PreviewHandle,
    pub acquired_at: DateTime<Utc>,
}

impl CandidateImage {
    pub fn new(source: ImageSource, filename: impl Into<String>, preview: PreviewHandle) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            filename: filename.into(),
            preview,
            acquired_at: Utc::now(),
        }
    }
}
