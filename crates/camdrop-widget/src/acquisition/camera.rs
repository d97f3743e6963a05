//! Camera mode: live stream with a front/back toggle and still capture.
//!
//! The surface exclusively owns the open stream and stops all of its tracks whenever
//! it leaves camera mode, restarts with another facing, or is dropped.

use async_trait::async_trait;
use bytes::Bytes;
use camdrop_core::constants::{CAMERA_CAPTURE_FILENAME, CAMERA_CAPTURE_MIME_TYPE};
use camdrop_core::{
    CandidateImage, CaptureError, FacingMode, ImageSource, PreviewHandle, UploadError,
    VideoConstraints, WidgetError,
};
use camdrop_processing::MediaEncoder;
use std::sync::Arc;
use uuid::Uuid;

use super::CandidateSink;

/// Source of live camera streams.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(
        &self,
        constraints: VideoConstraints,
    ) -> Result<Box<dyn CameraStream>, CaptureError>;
}

/// An open camera stream.
pub trait CameraStream: Send {
    fn facing_mode(&self) -> FacingMode;

    /// Encoded still of the current frame, or `None` if no frame has arrived yet.
    fn screenshot(&mut self) -> Option<Bytes>;

    fn stop_all_tracks(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CameraState {
    #[default]
    Inactive,
    Live,
    Captured { candidate_id: Uuid },
}

impl CameraState {
    pub fn name(&self) -> &'static str {
        match self {
            CameraState::Inactive => "camera inactive",
            CameraState::Live => "camera live",
            CameraState::Captured { .. } => "frame captured",
        }
    }
}

pub struct CameraSurface {
    device: Arc<dyn CameraDevice>,
    encoder: MediaEncoder,
    constraints: VideoConstraints,
    stream: Option<Box<dyn CameraStream>>,
    state: CameraState,
}

impl CameraSurface {
    pub fn new(device: Arc<dyn CameraDevice>, constraints: VideoConstraints) -> Self {
        Self {
            device,
            encoder: MediaEncoder::default(),
            constraints,
            stream: None,
            state: CameraState::Inactive,
        }
    }

    pub fn with_encoder(mut self, encoder: MediaEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn state(&self) -> CameraState {
        self.state
    }

    pub fn is_captured(&self) -> bool {
        matches!(self.state, CameraState::Captured { .. })
    }

    pub fn constraints(&self) -> VideoConstraints {
        self.constraints
    }

    pub fn facing_mode(&self) -> FacingMode {
        self.constraints.facing_mode
    }

    /// Request a live stream with the current constraints. Already-active surfaces
    /// are left as they are.
    pub async fn activate(&mut self) -> Result<(), WidgetError> {
        if self.state != CameraState::Inactive {
            return Ok(());
        }

        let stream = self.device.open(self.constraints).await.map_err(|e| {
            tracing::warn!(error = %e, facing = %self.constraints.facing_mode, "Failed to open camera");
            e
        })?;
        tracing::info!(
            width = self.constraints.width,
            height = self.constraints.height,
            facing = %stream.facing_mode(),
            "Camera stream started"
        );
        self.stream = Some(stream);
        self.state = CameraState::Live;
        Ok(())
    }

    /// Flip between front and rear camera, restarting the stream.
    pub async fn toggle_facing(&mut self) -> Result<FacingMode, WidgetError> {
        if self.state != CameraState::Live {
            return Err(WidgetError::invalid_transition(
                "switch camera",
                self.state.name(),
            ));
        }

        self.release_stream();
        self.state = CameraState::Inactive;
        self.constraints = self
            .constraints
            .with_facing(self.constraints.facing_mode.flipped());
        tracing::debug!(facing = %self.constraints.facing_mode, "Switching camera");

        self.activate().await?;
        Ok(self.constraints.facing_mode)
    }

    /// Grab the current frame and hand it to `sink` as a camera candidate.
    ///
    /// A missing or undecodable frame is reported to the sink as well as returned.
    pub fn capture_frame(&mut self, sink: &mut dyn CandidateSink) -> Result<Uuid, WidgetError> {
        if self.is_captured() {
            return Err(WidgetError::invalid_transition(
                "capture",
                self.state.name(),
            ));
        }

        let (preview, size_bytes) = match self.grab_frame() {
            Ok(grabbed) => grabbed,
            Err(e) => {
                tracing::warn!(error = %e, state = self.state.name(), "Capture failed");
                let err = UploadError::Capture(e);
                sink.report_failure(err.clone());
                return Err(WidgetError::Upload(err));
            }
        };
        let candidate = CandidateImage::new(ImageSource::FromCamera, CAMERA_CAPTURE_FILENAME, preview);
        let candidate_id = candidate.id;
        sink.receive_candidate(candidate)?;

        tracing::debug!(candidate_id = %candidate_id, size_bytes, "Frame captured");
        self.state = CameraState::Captured { candidate_id };
        Ok(candidate_id)
    }

    /// Return to the live view, forgetting the captured frame.
    pub fn discard_capture(&mut self) -> Result<(), WidgetError> {
        if !self.is_captured() {
            return Err(WidgetError::invalid_transition(
                "discard capture",
                self.state.name(),
            ));
        }
        self.state = CameraState::Live;
        Ok(())
    }

    /// Leave camera mode and release the device.
    pub fn deactivate(&mut self) {
        if self.state != CameraState::Inactive {
            tracing::info!("Camera stream stopped");
        }
        self.release_stream();
        self.state = CameraState::Inactive;
    }

    fn grab_frame(&mut self) -> Result<(PreviewHandle, usize), CaptureError> {
        if self.state != CameraState::Live {
            return Err(CaptureError::NotLive);
        }
        let frame = self
            .stream
            .as_mut()
            .and_then(|stream| stream.screenshot())
            .ok_or(CaptureError::FrameUnavailable)?;

        let preview = self.encoder.decode_to_preview(&frame)?;
        if preview.mime_type != CAMERA_CAPTURE_MIME_TYPE {
            tracing::debug!(mime_type = %preview.mime_type, "Camera delivered a non-JPEG frame");
        }
        Ok((preview, frame.len()))
    }

    fn release_stream(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            stream.stop_all_tracks();
        }
    }
}

impl Drop for CameraSurface {
    fn drop(&mut self) {
        self.release_stream();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::test_support::{encoded_image, RecordingSink};
    use camdrop_core::{DecodeError, UploadError};
    use image::ImageFormat;
    use std::sync::Mutex;

    #[derive(Default)]
    struct DeviceLog {
        opened: Vec<FacingMode>,
        stopped: usize,
    }

    struct FakeDevice {
        frame: Option<Bytes>,
        log: Arc<Mutex<DeviceLog>>,
    }

    struct FakeStream {
        facing: FacingMode,
        frame: Option<Bytes>,
        log: Arc<Mutex<DeviceLog>>,
    }

    #[async_trait]
    impl CameraDevice for FakeDevice {
        async fn open(
            &self,
            constraints: VideoConstraints,
        ) -> Result<Box<dyn CameraStream>, CaptureError> {
            self.log.lock().unwrap().opened.push(constraints.facing_mode);
            Ok(Box::new(FakeStream {
                facing: constraints.facing_mode,
                frame: self.frame.clone(),
                log: self.log.clone(),
            }))
        }
    }

    impl CameraStream for FakeStream {
        fn facing_mode(&self) -> FacingMode {
            self.facing
        }

        fn screenshot(&mut self) -> Option<Bytes> {
            self.frame.clone()
        }

        fn stop_all_tracks(&mut self) {
            self.log.lock().unwrap().stopped += 1;
        }
    }

    fn surface(frame: Option<Bytes>) -> (CameraSurface, Arc<Mutex<DeviceLog>>) {
        let log = Arc::new(Mutex::new(DeviceLog::default()));
        let device = FakeDevice {
            frame,
            log: log.clone(),
        };
        (
            CameraSurface::new(Arc::new(device), VideoConstraints::default()),
            log,
        )
    }

    fn jpeg_frame() -> Option<Bytes> {
        Some(Bytes::from(encoded_image(ImageFormat::Jpeg)))
    }

    #[tokio::test]
    async fn test_activate_uses_rear_camera_by_default() {
        let (mut camera, log) = surface(jpeg_frame());
        camera.activate().await.unwrap();
        assert_eq!(camera.state(), CameraState::Live);
        assert_eq!(camera.constraints().width, 1280);
        assert_eq!(camera.constraints().height, 720);

        // Activating again does not open a second stream.
        camera.activate().await.unwrap();
        assert_eq!(log.lock().unwrap().opened, vec![FacingMode::Environment]);
    }

    #[tokio::test]
    async fn test_toggle_facing_restarts_stream() {
        let (mut camera, log) = surface(jpeg_frame());
        camera.activate().await.unwrap();

        assert_eq!(camera.toggle_facing().await.unwrap(), FacingMode::User);
        assert_eq!(camera.state(), CameraState::Live);
        {
            let log = log.lock().unwrap();
            assert_eq!(log.opened, vec![FacingMode::Environment, FacingMode::User]);
            assert_eq!(log.stopped, 1);
        }

        assert_eq!(camera.toggle_facing().await.unwrap(), FacingMode::Environment);
    }

    #[tokio::test]
    async fn test_toggle_facing_only_when_live() {
        let (mut camera, _log) = surface(jpeg_frame());
        let err = camera.toggle_facing().await.unwrap_err();
        assert!(err.is_rejection());

        camera.activate().await.unwrap();
        let mut sink = RecordingSink::default();
        camera.capture_frame(&mut sink).unwrap();
        assert!(camera.toggle_facing().await.unwrap_err().is_rejection());
        assert_eq!(camera.facing_mode(), FacingMode::Environment);
    }

    #[tokio::test]
    async fn test_capture_then_discard() {
        let (mut camera, _log) = surface(jpeg_frame());
        let mut sink = RecordingSink::default();
        camera.activate().await.unwrap();

        let id = camera.capture_frame(&mut sink).unwrap();
        assert_eq!(camera.state(), CameraState::Captured { candidate_id: id });
        assert_eq!(sink.received[0].source, ImageSource::FromCamera);
        assert_eq!(sink.received[0].filename, "webcam_capture.jpg");
        assert_eq!(sink.received[0].preview.mime_type, CAMERA_CAPTURE_MIME_TYPE);

        assert!(camera.capture_frame(&mut sink).unwrap_err().is_rejection());
        assert!(sink.failures.is_empty());

        camera.discard_capture().unwrap();
        assert_eq!(camera.state(), CameraState::Live);
        assert!(camera.discard_capture().unwrap_err().is_rejection());
    }

    #[tokio::test]
    async fn test_capture_errors() {
        let (mut camera, _log) = surface(None);
        let mut sink = RecordingSink::default();

        let err = camera.capture_frame(&mut sink).unwrap_err();
        assert_eq!(err, WidgetError::Upload(UploadError::Capture(CaptureError::NotLive)));

        camera.activate().await.unwrap();
        let err = camera.capture_frame(&mut sink).unwrap_err();
        assert_eq!(
            err,
            WidgetError::Upload(UploadError::Capture(CaptureError::FrameUnavailable))
        );
        assert_eq!(camera.state(), CameraState::Live);
        assert_eq!(
            sink.failures,
            vec![
                UploadError::Capture(CaptureError::NotLive),
                UploadError::Capture(CaptureError::FrameUnavailable),
            ]
        );
        assert!(sink.received.is_empty());
    }

    #[tokio::test]
    async fn test_capture_of_garbage_frame() {
        let (mut camera, _log) = surface(Some(Bytes::from_static(b"")));
        let mut sink = RecordingSink::default();
        camera.activate().await.unwrap();

        let err = camera.capture_frame(&mut sink).unwrap_err();
        assert_eq!(
            err,
            WidgetError::Upload(UploadError::Capture(CaptureError::Decode(DecodeError::Empty)))
        );
        assert!(sink.received.is_empty());
        assert_eq!(sink.failures.len(), 1);
    }

    #[tokio::test]
    async fn test_deactivate_and_drop_release_tracks() {
        let (mut camera, log) = surface(jpeg_frame());
        camera.activate().await.unwrap();
        camera.deactivate();
        assert_eq!(camera.state(), CameraState::Inactive);
        assert_eq!(log.lock().unwrap().stopped, 1);

        camera.activate().await.unwrap();
        drop(camera);
        assert_eq!(log.lock().unwrap().stopped, 2);
    }
}
