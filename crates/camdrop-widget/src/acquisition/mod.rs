//! Acquisition surfaces: ways a user supplies an image.
//!
//! Both surfaces decode raw bytes with the shared encoder and hand the resulting
//! [`CandidateImage`] to a [`CandidateSink`], normally the upload orchestrator.

pub mod camera;
pub mod file;

pub use camera::{CameraDevice, CameraState, CameraStream, CameraSurface};
pub use file::{DroppedFile, FilePicker, FileSurface, FileSurfaceState};

use camdrop_core::{CandidateImage, UploadError, WidgetError};

/// Receives candidates produced by an acquisition surface.
pub trait CandidateSink {
    fn receive_candidate(&mut self, candidate: CandidateImage) -> Result<(), WidgetError>;

    /// Called when acquisition fails: the file could not be read or decoded, or the
    /// camera gave no usable frame.
    fn report_failure(&mut self, err: UploadError);
}

/// Whether a drag event was consumed by the surface (so the host must not apply its
/// default handling, e.g. opening the dropped file).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Consumed,
    Ignored,
}

impl EventDisposition {
    pub fn is_consumed(self) -> bool {
        matches!(self, EventDisposition::Consumed)
    }
}
