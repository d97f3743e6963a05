//! Shared constants

/// Default host of the media-hosting API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudinary.com";

/// API version segment of the upload endpoint path.
pub const API_VERSION_SEGMENT: &str = "v1_1";

/// Default camera resolution requested when activating the live stream.
pub const DEFAULT_VIDEO_WIDTH: u32 = 1280;
pub const DEFAULT_VIDEO_HEIGHT: u32 = 720;

/// Filename attached to camera captures in the multipart form.
pub const CAMERA_CAPTURE_FILENAME: &str = "webcam_capture.jpg";

/// MIME type produced by camera screenshots.
pub const CAMERA_CAPTURE_MIME_TYPE: &str = "image/jpeg";

/// Upper bound on a single upload payload (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Multipart form field names expected by the hosting API.
pub const FORM_FIELD_FILE: &str = "file";
pub const FORM_FIELD_UPLOAD_PRESET: &str = "upload_preset";
pub const FORM_FIELD_API_KEY: &str = "api_key";
