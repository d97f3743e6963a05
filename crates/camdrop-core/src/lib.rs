//! Camdrop Core Library
//!
//! This crate provides the domain models, error types, and configuration shared by
//! the encoder, the upload client, and the capture widget.

pub mod config;
pub mod constants;
pub mod display;
pub mod error;
pub mod models;

// Re-export commonly used types
pub use config::{FacingMode, UploadCredentials, VideoConstraints, WidgetConfig};
pub use display::{ColorStyle, CustomIcons, DisplayOptions};
pub use error::{
    CaptureError, DecodeError, EncodeError, ErrorMetadata, LogLevel, UploadError, WidgetError,
};
pub use models::{
    CandidateImage, EncodedPayload, ImageSource, LifecycleState, PreviewHandle, RequestToken,
    UploadResult,
};
