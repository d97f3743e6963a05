use serde::{Deserialize, Serialize};

/// Identifies one upload attempt. Increases monotonically per orchestrator, so a
/// network callback can be matched against the attempt that is still current.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestToken(pub u64);

impl RequestToken {
    pub fn next(self) -> Self {
        RequestToken(self.0 + 1)
    }
}

impl std::fmt::Display for RequestToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Success body returned by the hosting API. Only `url` is required.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResult {
    #[serde(rename = "url")]
    pub hosted_url: String,
    #[serde(default)]
    pub secure_url: Option<String>,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub bytes: Option<u64>,
}

impl UploadResult {
    pub fn new(hosted_url: impl Into<String>) -> Self {
        Self {
            hosted_url: hosted_url.into(),
            secure_url: None,
            public_id: None,
            format: None,
            width: None,
            height: None,
            bytes: None,
        }
    }
}
