//! Domain models

pub mod image;
pub mod lifecycle;
pub mod payload;
pub mod upload;

pub use image::{CandidateImage, ImageSource, PreviewHandle};
pub use lifecycle::{progress_percent, LifecycleState};
pub use payload::EncodedPayload;
pub use upload::{RequestToken, UploadResult};
