//! Test helpers: a scripted camera and widgets wired to a mock hosting API.
//!
//! Run from workspace root: `cargo test -p camdrop-widget`.

#![allow(dead_code)]

pub mod fixtures;

use async_trait::async_trait;
use bytes::Bytes;
use camdrop_core::{CaptureError, FacingMode, UploadCredentials, VideoConstraints, WidgetConfig};
use camdrop_widget::{CameraDevice, CameraStream, UploadWidget};
use std::sync::{Arc, Mutex};

pub const CLOUD_NAME: &str = "cloud";
pub const API_KEY: &str = "23232323";
pub const PRESET_NAME: &str = "preset";

pub fn credentials() -> UploadCredentials {
    UploadCredentials::new(CLOUD_NAME, API_KEY, PRESET_NAME)
}

/// Upload path the mock server must answer for [`credentials`].
pub fn upload_path() -> String {
    format!("/v1_1/{}/image/upload", CLOUD_NAME)
}

pub fn config(api_base_url: &str) -> WidgetConfig {
    WidgetConfig::new(credentials()).with_api_base_url(api_base_url)
}

/// What the scripted camera has been asked to do.
#[derive(Debug, Default)]
pub struct CameraLog {
    pub opened: Vec<FacingMode>,
    pub live_streams: usize,
}

/// Camera that always delivers the same frame.
pub struct ScriptedCamera {
    frame: Option<Bytes>,
    pub log: Arc<Mutex<CameraLog>>,
}

impl ScriptedCamera {
    pub fn new(frame: Option<Vec<u8>>) -> Arc<Self> {
        Arc::new(Self {
            frame: frame.map(Bytes::from),
            log: Arc::new(Mutex::new(CameraLog::default())),
        })
    }

    pub fn live_streams(&self) -> usize {
        self.log.lock().unwrap().live_streams
    }
}

struct ScriptedStream {
    facing: FacingMode,
    frame: Option<Bytes>,
    log: Arc<Mutex<CameraLog>>,
    stopped: bool,
}

#[async_trait]
impl CameraDevice for ScriptedCamera {
    async fn open(
        &self,
        constraints: VideoConstraints,
    ) -> Result<Box<dyn CameraStream>, CaptureError> {
        let mut log = self.log.lock().unwrap();
        log.opened.push(constraints.facing_mode);
        log.live_streams += 1;
        Ok(Box::new(ScriptedStream {
            facing: constraints.facing_mode,
            frame: self.frame.clone(),
            log: self.log.clone(),
            stopped: false,
        }))
    }
}

impl CameraStream for ScriptedStream {
    fn facing_mode(&self) -> FacingMode {
        self.facing
    }

    fn screenshot(&mut self) -> Option<Bytes> {
        self.frame.clone()
    }

    fn stop_all_tracks(&mut self) {
        if !self.stopped {
            self.stopped = true;
            self.log.lock().unwrap().live_streams -= 1;
        }
    }
}

/// Widget uploading to `server_url`, with a camera that captures `frame`.
pub fn widget(server_url: &str, frame: Option<Vec<u8>>) -> (UploadWidget, Arc<ScriptedCamera>) {
    let camera = ScriptedCamera::new(frame);
    let widget = UploadWidget::from_config(&config(server_url), camera.clone())
        .expect("valid widget config");
    (widget, camera)
}
