//! Error types module
//!
//! Every failure an upload attempt can hit is represented by [`UploadError`], which is
//! what the orchestrator stores in its `Failed` state and hands back to the host.
//! The narrower [`DecodeError`], [`EncodeError`] and [`CaptureError`] are produced by
//! the encoder and the acquisition surfaces and convert into it with `?`.
//!
//! All errors are terminal for the current attempt. Nothing here is retried.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like a user dropping a text file
    Debug,
    /// Warning level - for failures caused by the remote host or the network
    Warn,
    /// Error level - for misconfiguration the host application must fix
    Error,
}

/// Metadata describing how an error should be presented to the end user.
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "UPLOAD_REJECTED")
    fn error_code(&self) -> &'static str;

    /// User-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Suggested action for the user
    fn suggested_action(&self) -> Option<&'static str>;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

/// Raw bytes could not be turned into a preview.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Empty image data")]
    Empty,

    #[error("Unsupported image format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt image data: {0}")]
    Corrupt(String),
}

/// A preview could not be turned back into an upload payload.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EncodeError {
    #[error("Not a data URL: missing scheme or separator")]
    MissingScheme,

    #[error("Missing MIME type in data URL header")]
    MissingMimeType,

    #[error("Data URL is not base64 encoded")]
    NotBase64,

    #[error("Invalid base64 payload: {0}")]
    InvalidBase64(String),

    #[error("Empty payload")]
    EmptyPayload,

    #[error("Payload too large: {size} bytes (max: {max} bytes)")]
    PayloadTooLarge { size: usize, max: usize },

    #[error("Unsupported content type: {0}")]
    UnsupportedContentType(String),

    #[error("Invalid filename: {0}")]
    InvalidFilename(String),
}

/// An acquisition surface could not supply an image.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CaptureError {
    #[error("Camera is not live")]
    NotLive,

    #[error("No frame available from camera stream")]
    FrameUnavailable,

    #[error("Camera unavailable: {0}")]
    DeviceUnavailable(String),

    #[error("File could not be read: {0}")]
    FileUnreadable(String),

    #[error("Captured frame could not be decoded: {0}")]
    Decode(#[from] DecodeError),
}

/// Terminal failure of an acquisition or upload attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    #[error("Encode error: {0}")]
    Encode(#[from] EncodeError),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    /// Non-200 status, or a 200 whose body is not the expected JSON.
    #[error("Upload rejected with status {status}: {message}")]
    UploadRejected { status: u16, message: String },
}

impl From<validator::ValidationErrors> for UploadError {
    fn from(err: validator::ValidationErrors) -> Self {
        UploadError::Config(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, suggested_action, log_level).
fn upload_error_static_metadata(err: &UploadError) -> (&'static str, Option<&'static str>, LogLevel) {
    match err {
        UploadError::Decode(_) => (
            "DECODE_ERROR",
            Some("Choose a JPEG, PNG, GIF or WebP image"),
            LogLevel::Debug,
        ),
        UploadError::Encode(EncodeError::PayloadTooLarge { .. }) => (
            "PAYLOAD_TOO_LARGE",
            Some("Choose a smaller image"),
            LogLevel::Debug,
        ),
        UploadError::Encode(_) => (
            "ENCODE_ERROR",
            Some("Discard the image and select it again"),
            LogLevel::Warn,
        ),
        UploadError::Capture(_) => (
            "CAPTURE_ERROR",
            Some("Capture or select the image again"),
            LogLevel::Debug,
        ),
        UploadError::Config(_) => (
            "CONFIGURATION_ERROR",
            Some("Check the cloud name, API key and upload preset"),
            LogLevel::Error,
        ),
        UploadError::Network(_) => (
            "NETWORK_ERROR",
            Some("Check your connection, discard and try again"),
            LogLevel::Warn,
        ),
        UploadError::UploadRejected { .. } => (
            "UPLOAD_REJECTED",
            Some("Discard the image and try again"),
            LogLevel::Warn,
        ),
    }
}

impl UploadError {
    /// Get the error type name for detailed error reporting
    pub fn error_type(&self) -> &'static str {
        match self {
            UploadError::Decode(_) => "DecodeError",
            UploadError::Encode(_) => "EncodeError",
            UploadError::Capture(_) => "CaptureError",
            UploadError::Config(_) => "ConfigError",
            UploadError::Network(_) => "NetworkError",
            UploadError::UploadRejected { .. } => "UploadRejected",
        }
    }
}

impl ErrorMetadata for UploadError {
    fn error_code(&self) -> &'static str {
        upload_error_static_metadata(self).0
    }

    fn suggested_action(&self) -> Option<&'static str> {
        upload_error_static_metadata(self).1
    }

    fn log_level(&self) -> LogLevel {
        upload_error_static_metadata(self).2
    }

    fn client_message(&self) -> String {
        match self {
            UploadError::Decode(_) => "The selected file is not a supported image".to_string(),
            UploadError::Encode(EncodeError::PayloadTooLarge { size, max }) => {
                format!("Image is too large: {} bytes (max {} bytes)", size, max)
            }
            UploadError::Encode(_) => "The image could not be prepared for upload".to_string(),
            UploadError::Capture(ref err) => err.to_string(),
            UploadError::Config(_) => "Upload is not configured".to_string(),
            UploadError::Network(_) => "Upload failed: network error".to_string(),
            UploadError::UploadRejected { status, .. } => {
                format!("Upload failed (status {})", status)
            }
        }
    }
}

/// Error returned by widget operations.
///
/// `InvalidTransition` means the call was rejected and nothing changed. `Upload` means
/// the attempt itself failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WidgetError {
    #[error("Cannot {action} while {state}")]
    InvalidTransition {
        action: &'static str,
        state: &'static str,
    },

    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl WidgetError {
    pub fn invalid_transition(action: &'static str, state: &'static str) -> Self {
        WidgetError::InvalidTransition { action, state }
    }

    pub fn is_rejection(&self) -> bool {
        matches!(self, WidgetError::InvalidTransition { .. })
    }
}

impl From<DecodeError> for WidgetError {
    fn from(err: DecodeError) -> Self {
        WidgetError::Upload(err.into())
    }
}

impl From<CaptureError> for WidgetError {
    fn from(err: CaptureError) -> Self {
        WidgetError::Upload(err.into())
    }
}

impl From<EncodeError> for WidgetError {
    fn from(err: EncodeError) -> Self {
        WidgetError::Upload(err.into())
    }
}
