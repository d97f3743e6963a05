//! Camdrop Widget
//!
//! Image acquisition (camera capture or file drop) and the upload lifecycle that
//! takes a candidate image from preview to a hosted URL.

pub mod acquisition;
pub mod orchestrator;
pub mod uploader;
pub mod widget;

pub use acquisition::{
    CameraDevice, CameraState, CameraStream, CameraSurface, CandidateSink, DroppedFile,
    EventDisposition, FilePicker, FileSurface, FileSurfaceState,
};
pub use orchestrator::UploadOrchestrator;
pub use uploader::{ProgressSink, UploadEvent, UploadEventKind, Uploader};
pub use widget::{AcquisitionMode, UploadWidget};
