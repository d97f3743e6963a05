//! The embeddable widget: both acquisition modes wired to one orchestrator.

use camdrop_core::{DisplayOptions, LifecycleState, RequestToken, UploadError, WidgetConfig, WidgetError};
use camdrop_processing::{MediaEncoder, PayloadValidator};
use std::sync::Arc;
use uuid::Uuid;

use crate::acquisition::{
    CameraDevice, CameraSurface, DroppedFile, EventDisposition, FilePicker, FileSurface,
};
use crate::orchestrator::UploadOrchestrator;
use crate::uploader::Uploader;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AcquisitionMode {
    #[default]
    File,
    Camera,
}

impl AcquisitionMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AcquisitionMode::File => "file",
            AcquisitionMode::Camera => "camera",
        }
    }
}

pub struct UploadWidget {
    display: DisplayOptions,
    mode: AcquisitionMode,
    file: FileSurface,
    camera: CameraSurface,
    orchestrator: UploadOrchestrator,
}

impl UploadWidget {
    pub fn new(
        config: &WidgetConfig,
        uploader: Arc<dyn Uploader>,
        camera: Arc<dyn CameraDevice>,
    ) -> Self {
        let encoder = MediaEncoder::new(PayloadValidator::new(config.max_file_size_bytes));
        Self {
            display: config.display.clone(),
            mode: AcquisitionMode::File,
            file: FileSurface::new(encoder.clone()),
            camera: CameraSurface::new(camera, config.video).with_encoder(encoder.clone()),
            orchestrator: UploadOrchestrator::new(config.credentials.clone(), uploader)
                .with_encoder(encoder),
        }
    }

    /// Widget that uploads to the configured hosting API.
    pub fn from_config(
        config: &WidgetConfig,
        camera: Arc<dyn CameraDevice>,
    ) -> Result<Self, UploadError> {
        config.validate()?;
        let client = camdrop_api_client::UploadClient::new(config.api_base_url.clone())?;
        Ok(Self::new(config, Arc::new(client), camera))
    }

    pub fn display(&self) -> &DisplayOptions {
        &self.display
    }

    pub fn mode(&self) -> AcquisitionMode {
        self.mode
    }

    pub fn state(&self) -> &LifecycleState {
        self.orchestrator.state()
    }

    pub fn orchestrator(&self) -> &UploadOrchestrator {
        &self.orchestrator
    }

    pub fn file_surface(&self) -> &FileSurface {
        &self.file
    }

    pub fn camera_surface(&self) -> &CameraSurface {
        &self.camera
    }

    /// Switch acquisition mode. Only allowed while nothing is pending; entering camera
    /// mode starts the stream and leaving it releases the device.
    pub async fn set_mode(&mut self, mode: AcquisitionMode) -> Result<(), WidgetError> {
        if mode == self.mode {
            return Ok(());
        }
        if !self.orchestrator.state().is_idle() {
            return Err(WidgetError::invalid_transition(
                "switch mode",
                self.orchestrator.state().name(),
            ));
        }

        match mode {
            AcquisitionMode::Camera => {
                if let Err(err) = self.camera.activate().await {
                    if let WidgetError::Upload(upload_err) = &err {
                        self.orchestrator.report_failure(upload_err.clone());
                    }
                    return Err(err);
                }
                // A hover left over from file mode would never see its leave event.
                self.file.discard();
            }
            AcquisitionMode::File => self.camera.deactivate(),
        }
        tracing::debug!(mode = mode.as_str(), "Acquisition mode changed");
        self.mode = mode;
        Ok(())
    }

    /// Drag events only reach the file surface in file mode.
    pub fn on_drag_enter(&mut self) -> EventDisposition {
        if self.mode != AcquisitionMode::File {
            return EventDisposition::Ignored;
        }
        self.file.on_drag_enter()
    }

    pub fn on_drag_over(&mut self) -> EventDisposition {
        if self.mode != AcquisitionMode::File {
            return EventDisposition::Ignored;
        }
        self.file.on_drag_over()
    }

    pub fn on_drag_leave(&mut self) -> EventDisposition {
        if self.mode != AcquisitionMode::File {
            return EventDisposition::Ignored;
        }
        self.file.on_drag_leave()
    }

    pub fn on_drop(&mut self, files: Vec<DroppedFile>) -> Result<Option<Uuid>, WidgetError> {
        self.require_mode(AcquisitionMode::File, "drop a file")?;
        self.file.on_drop(files, &mut self.orchestrator)
    }

    pub async fn on_click(&mut self, picker: &dyn FilePicker) -> Result<Option<Uuid>, WidgetError> {
        self.require_mode(AcquisitionMode::File, "choose a file")?;
        self.file.on_click(picker, &mut self.orchestrator).await
    }

    pub fn select_file(&mut self, file: DroppedFile) -> Result<Option<Uuid>, WidgetError> {
        self.require_mode(AcquisitionMode::File, "choose a file")?;
        self.file.select_file(file, &mut self.orchestrator)
    }

    pub async fn toggle_facing(&mut self) -> Result<(), WidgetError> {
        self.require_mode(AcquisitionMode::Camera, "switch camera")?;
        match self.camera.toggle_facing().await {
            Ok(_) => Ok(()),
            Err(WidgetError::Upload(err)) => {
                self.orchestrator.report_failure(err.clone());
                Err(WidgetError::Upload(err))
            }
            Err(err) => Err(err),
        }
    }

    pub fn capture_frame(&mut self) -> Result<Uuid, WidgetError> {
        self.require_mode(AcquisitionMode::Camera, "capture")?;
        self.camera.capture_frame(&mut self.orchestrator)
    }

    pub fn confirm_upload(&mut self) -> Result<RequestToken, WidgetError> {
        self.orchestrator.confirm_upload()
    }

    pub async fn process_next_event(&mut self) -> bool {
        self.orchestrator.process_next_event().await
    }

    pub async fn wait_until_settled(&mut self) -> &LifecycleState {
        self.orchestrator.wait_until_settled().await
    }

    /// Drop whatever is pending and return every part of the widget to its start.
    pub fn discard(&mut self) {
        self.orchestrator.discard();
        self.file.discard();
        if self.camera.is_captured() {
            // Only fails when nothing was captured.
            let _ = self.camera.discard_capture();
        }
    }

    /// Close the widget, releasing the camera.
    pub fn close(&mut self) {
        self.discard();
        self.camera.deactivate();
        self.mode = AcquisitionMode::File;
    }

    fn require_mode(&self, mode: AcquisitionMode, action: &'static str) -> Result<(), WidgetError> {
        if self.mode != mode {
            return Err(WidgetError::invalid_transition(
                action,
                match self.mode {
                    AcquisitionMode::File => "in file mode",
                    AcquisitionMode::Camera => "in camera mode",
                },
            ));
        }
        Ok(())
    }
}
