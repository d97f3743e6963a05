//! File mode: click-to-browse or drag-and-drop.
//!
//! Drag events are explicit transitions so the surface is never left hovering with
//! no pointer over it, whatever order the host toolkit dispatches them in:
//!
//! ```text
//!  Empty ──enter/over──▶ DragHover ──drop (first file)──▶ HasCandidate
//!    ▲                      │                                  │
//!    └──────── leave ───────┘                                  │
//!    └──────────────────────────── discard ───────────────────┘
//! ```

use async_trait::async_trait;
use bytes::Bytes;
use camdrop_core::{CandidateImage, CaptureError, ImageSource, UploadError, WidgetError};
use camdrop_processing::MediaEncoder;
use std::io;
use std::path::Path;
use uuid::Uuid;

use super::{CandidateSink, EventDisposition};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FileSurfaceState {
    #[default]
    Empty,
    DragHover,
    HasCandidate { candidate_id: Uuid },
}

/// A file handed over by a drop or a file chooser, already read into memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedFile {
    pub name: String,
    pub data: Bytes,
}

impl DroppedFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        Ok(Self::new(name, data))
    }
}

/// Native file chooser. `Ok(None)` means the user cancelled.
#[async_trait]
pub trait FilePicker: Send + Sync {
    async fn pick_file(&self) -> io::Result<Option<DroppedFile>>;
}

#[derive(Debug, Clone, Default)]
pub struct FileSurface {
    encoder: MediaEncoder,
    state: FileSurfaceState,
}

impl FileSurface {
    pub fn new(encoder: MediaEncoder) -> Self {
        Self {
            encoder,
            state: FileSurfaceState::Empty,
        }
    }

    pub fn state(&self) -> FileSurfaceState {
        self.state
    }

    pub fn has_candidate(&self) -> bool {
        matches!(self.state, FileSurfaceState::HasCandidate { .. })
    }

    /// Always consumed so the host never navigates to a dragged file.
    pub fn on_drag_enter(&mut self) -> EventDisposition {
        if self.state == FileSurfaceState::Empty {
            tracing::trace!("Drag entered file surface");
            self.state = FileSurfaceState::DragHover;
        }
        EventDisposition::Consumed
    }

    pub fn on_drag_over(&mut self) -> EventDisposition {
        self.on_drag_enter()
    }

    pub fn on_drag_leave(&mut self) -> EventDisposition {
        if self.state == FileSurfaceState::DragHover {
            tracing::trace!("Drag left file surface");
            self.state = FileSurfaceState::Empty;
            EventDisposition::Consumed
        } else {
            EventDisposition::Ignored
        }
    }

    /// Handle a drop. Only the first file is used; the rest are ignored.
    ///
    /// Returns the new candidate's id, or `None` if the drop produced nothing (no
    /// files, or a candidate is already pending).
    pub fn on_drop(
        &mut self,
        files: Vec<DroppedFile>,
        sink: &mut dyn CandidateSink,
    ) -> Result<Option<Uuid>, WidgetError> {
        if self.has_candidate() {
            tracing::debug!("Ignoring drop, a candidate is already pending");
            return Ok(None);
        }

        let dropped = files.len();
        let Some(file) = files.into_iter().next() else {
            self.state = FileSurfaceState::Empty;
            return Ok(None);
        };
        if dropped > 1 {
            tracing::debug!(dropped, kept = %file.name, "Multiple files dropped, using the first");
        }

        self.accept(file, sink).map(Some)
    }

    /// Open the file chooser. A no-op while a candidate is pending.
    pub async fn on_click(
        &mut self,
        picker: &dyn FilePicker,
        sink: &mut dyn CandidateSink,
    ) -> Result<Option<Uuid>, WidgetError> {
        if self.has_candidate() {
            tracing::debug!("Ignoring click, a candidate is already pending");
            return Ok(None);
        }

        let picked = match picker.pick_file().await {
            Ok(picked) => picked,
            Err(e) => {
                tracing::warn!(error = %e, "File chooser failed");
                let err = UploadError::from(CaptureError::FileUnreadable(e.to_string()));
                sink.report_failure(err.clone());
                return Err(WidgetError::Upload(err));
            }
        };

        match picked {
            Some(file) => self.select_file(file, sink),
            None => {
                tracing::debug!("File chooser cancelled");
                Ok(None)
            }
        }
    }

    /// A file chosen outside the surface; same path as a drop.
    pub fn select_file(
        &mut self,
        file: DroppedFile,
        sink: &mut dyn CandidateSink,
    ) -> Result<Option<Uuid>, WidgetError> {
        if self.has_candidate() {
            return Ok(None);
        }
        self.accept(file, sink).map(Some)
    }

    pub fn discard(&mut self) {
        self.state = FileSurfaceState::Empty;
    }

    fn accept(
        &mut self,
        file: DroppedFile,
        sink: &mut dyn CandidateSink,
    ) -> Result<Uuid, WidgetError> {
        // Whatever happens below, the pointer is no longer hovering.
        self.state = FileSurfaceState::Empty;

        let preview = match self.encoder.decode_to_preview(&file.data) {
            Ok(preview) => preview,
            Err(e) => {
                tracing::warn!(filename = %file.name, error = %e, "Dropped file is not a supported image");
                let err = UploadError::Decode(e);
                sink.report_failure(err.clone());
                return Err(WidgetError::Upload(err));
            }
        };

        let candidate = CandidateImage::new(ImageSource::FromFile, file.name, preview);
        let candidate_id = candidate.id;
        sink.receive_candidate(candidate)?;

        tracing::debug!(candidate_id = %candidate_id, "File surface holds a candidate");
        self.state = FileSurfaceState::HasCandidate { candidate_id };
        Ok(candidate_id)
    }
}
