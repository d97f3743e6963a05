//! Configuration module
//!
//! Configuration is supplied by the host application and stays immutable for the
//! lifetime of a widget. Nothing in this module reads the environment.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::constants::{
    DEFAULT_API_BASE_URL, DEFAULT_MAX_FILE_SIZE_BYTES, DEFAULT_VIDEO_HEIGHT, DEFAULT_VIDEO_WIDTH,
};
use crate::display::DisplayOptions;
use crate::error::UploadError;

/// Credentials for the hosting API: a cloud name plus an unsigned upload preset.
///
/// Plain configuration, not a secret store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct UploadCredentials {
    #[validate(length(min = 1, message = "cloud_name is required"))]
    pub cloud_name: String,
    #[validate(length(min = 1, message = "api_key is required"))]
    pub api_key: String,
    #[validate(length(min = 1, message = "preset_name is required"))]
    pub preset_name: String,
}

impl UploadCredentials {
    pub fn new(
        cloud_name: impl Into<String>,
        api_key: impl Into<String>,
        preset_name: impl Into<String>,
    ) -> Self {
        Self {
            cloud_name: cloud_name.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
            preset_name: preset_name.into().trim().to_string(),
        }
    }

    /// Fail fast before any request is issued.
    pub fn check(&self) -> Result<(), UploadError> {
        self.validate()?;
        for (field, value) in [
            ("cloud_name", &self.cloud_name),
            ("api_key", &self.api_key),
            ("preset_name", &self.preset_name),
        ] {
            if value.trim().is_empty() {
                return Err(UploadError::Config(format!("{} is required", field)));
            }
        }
        if self.cloud_name.contains('/') {
            return Err(UploadError::Config(format!(
                "cloud_name must not contain '/': {}",
                self.cloud_name
            )));
        }
        Ok(())
    }
}

/// Which physical camera feeds the live stream.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Front-facing camera
    User,
    /// Rear-facing camera
    #[default]
    Environment,
}

impl FacingMode {
    pub fn flipped(self) -> Self {
        match self {
            FacingMode::User => FacingMode::Environment,
            FacingMode::Environment => FacingMode::User,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FacingMode::User => "user",
            FacingMode::Environment => "environment",
        }
    }
}

impl std::fmt::Display for FacingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraints requested when opening the live camera stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoConstraints {
    pub width: u32,
    pub height: u32,
    pub facing_mode: FacingMode,
}

impl Default for VideoConstraints {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIDEO_WIDTH,
            height: DEFAULT_VIDEO_HEIGHT,
            facing_mode: FacingMode::default(),
        }
    }
}

impl VideoConstraints {
    pub fn with_facing(self, facing_mode: FacingMode) -> Self {
        Self {
            facing_mode,
            ..self
        }
    }
}

/// Full widget configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WidgetConfig {
    pub credentials: UploadCredentials,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    #[serde(default)]
    pub video: VideoConstraints,
    #[serde(default = "default_max_file_size_bytes")]
    pub max_file_size_bytes: usize,
    #[serde(default)]
    pub display: DisplayOptions,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_max_file_size_bytes() -> usize {
    DEFAULT_MAX_FILE_SIZE_BYTES
}

impl WidgetConfig {
    pub fn new(credentials: UploadCredentials) -> Self {
        Self {
            credentials,
            api_base_url: default_api_base_url(),
            video: VideoConstraints::default(),
            max_file_size_bytes: DEFAULT_MAX_FILE_SIZE_BYTES,
            display: DisplayOptions::default(),
        }
    }

    pub fn with_api_base_url(mut self, api_base_url: impl Into<String>) -> Self {
        self.api_base_url = api_base_url.into();
        self
    }

    pub fn with_video(mut self, video: VideoConstraints) -> Self {
        self.video = video;
        self
    }

    pub fn with_display(mut self, display: DisplayOptions) -> Self {
        self.display = display;
        self
    }

    pub fn validate(&self) -> Result<(), UploadError> {
        self.credentials.check()?;
        if !(self.api_base_url.starts_with("https://") || self.api_base_url.starts_with("http://"))
        {
            return Err(UploadError::Config(format!(
                "api_base_url must be an http(s) URL: {}",
                self.api_base_url
            )));
        }
        if self.max_file_size_bytes == 0 {
            return Err(UploadError::Config(
                "max_file_size_bytes must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
