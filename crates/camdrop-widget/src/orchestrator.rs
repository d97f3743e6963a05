//! Upload orchestrator - the lifecycle state machine.
//!
//! ```text
//!  Idle ──receive_candidate──▶ Previewing ──confirm_upload──▶ Uploading(n) ──200 + url──▶ Uploaded
//!                                  │                              │
//!                                  │ config / encode error        │ non-200, network, bad body
//!                                  ▼                              ▼
//!                                Failed ◀─────────────────────────┘
//!
//!  discard: any state ──▶ Idle
//! ```
//!
//! Network work runs on a spawned task. Its progress and completion come back as
//! [`UploadEvent`]s that are applied on the caller's side, one at a time, in arrival
//! order. Each attempt carries a [`RequestToken`]; events whose token is not the
//! current in-flight attempt are ignored.

use camdrop_api_client::UploadClient;
use camdrop_core::models::progress_percent;
use camdrop_core::{
    CandidateImage, ErrorMetadata, LifecycleState, LogLevel, PreviewHandle, RequestToken,
    UploadCredentials, UploadError, UploadResult, WidgetConfig, WidgetError,
};
use camdrop_processing::{MediaEncoder, PayloadValidator};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::acquisition::CandidateSink;
use crate::uploader::{ProgressSink, UploadEvent, UploadEventKind, Uploader};

struct InFlight {
    token: RequestToken,
    handle: JoinHandle<()>,
}

enum NextEvent {
    Event(UploadEvent),
    TaskEnded,
}

pub struct UploadOrchestrator {
    credentials: UploadCredentials,
    encoder: MediaEncoder,
    uploader: Arc<dyn Uploader>,
    state: LifecycleState,
    candidate: Option<CandidateImage>,
    last_token: RequestToken,
    in_flight: Option<InFlight>,
    events_tx: mpsc::UnboundedSender<UploadEvent>,
    events_rx: mpsc::UnboundedReceiver<UploadEvent>,
}

impl UploadOrchestrator {
    pub fn new(credentials: UploadCredentials, uploader: Arc<dyn Uploader>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            credentials,
            encoder: MediaEncoder::default(),
            uploader,
            state: LifecycleState::Idle,
            candidate: None,
            last_token: RequestToken(0),
            in_flight: None,
            events_tx,
            events_rx,
        }
    }

    /// Build an orchestrator that uploads to the configured hosting API.
    pub fn from_config(config: &WidgetConfig) -> Result<Self, UploadError> {
        config.validate()?;
        let client = UploadClient::new(config.api_base_url.clone())?;
        Ok(Self::new(config.credentials.clone(), Arc::new(client))
            .with_encoder(MediaEncoder::new(PayloadValidator::new(
                config.max_file_size_bytes,
            ))))
    }

    pub fn with_encoder(mut self, encoder: MediaEncoder) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn state(&self) -> &LifecycleState {
        &self.state
    }

    pub fn credentials(&self) -> &UploadCredentials {
        &self.credentials
    }

    pub fn candidate(&self) -> Option<&CandidateImage> {
        self.candidate.as_ref()
    }

    pub fn preview(&self) -> Option<&PreviewHandle> {
        self.candidate.as_ref().map(|c| &c.preview)
    }

    pub fn progress(&self) -> Option<u8> {
        self.state.progress()
    }

    pub fn hosted_url(&self) -> Option<&str> {
        self.state.hosted_url()
    }

    pub fn error(&self) -> Option<&UploadError> {
        self.state.error()
    }

    /// Token of the attempt currently in flight, if any.
    pub fn in_flight_token(&self) -> Option<RequestToken> {
        self.in_flight.as_ref().map(|f| f.token)
    }

    /// Accept a candidate image. Only valid while idle; otherwise nothing changes.
    pub fn receive_candidate(&mut self, candidate: CandidateImage) -> Result<(), WidgetError> {
        if !self.state.is_idle() {
            tracing::debug!(
                candidate_id = %candidate.id,
                state = self.state.name(),
                "Rejecting candidate, a previous image is still pending"
            );
            return Err(WidgetError::invalid_transition(
                "receive candidate",
                self.state.name(),
            ));
        }

        tracing::info!(
            candidate_id = %candidate.id,
            source = ?candidate.source,
            width = candidate.preview.width,
            height = candidate.preview.height,
            "Candidate image received"
        );
        self.candidate = Some(candidate);
        self.state = LifecycleState::Previewing;
        Ok(())
    }

    /// Encode the pending candidate and start uploading it.
    ///
    /// Must be called from within a Tokio runtime; the request runs on a spawned task.
    /// Configuration and encoding problems fail the attempt before any request is made.
    pub fn confirm_upload(&mut self) -> Result<RequestToken, WidgetError> {
        if !matches!(self.state, LifecycleState::Previewing) {
            return Err(WidgetError::invalid_transition(
                "confirm upload",
                self.state.name(),
            ));
        }
        if let Err(e) = self.credentials.check() {
            return Err(self.fail(e));
        }

        let (candidate_id, encoded) = match self.candidate.as_ref() {
            Some(candidate) => (
                candidate.id,
                self.encoder
                    .encode_for_upload(&candidate.preview, &candidate.filename),
            ),
            None => {
                return Err(WidgetError::invalid_transition(
                    "confirm upload",
                    "no candidate",
                ))
            }
        };
        let payload = match encoded {
            Ok(payload) => payload,
            Err(e) => return Err(self.fail(e.into())),
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(e) => {
                return Err(self.fail(UploadError::Network(format!(
                    "No async runtime to run the upload: {}",
                    e
                ))))
            }
        };

        let token = self.last_token.next();
        self.last_token = token;

        tracing::info!(
            candidate_id = %candidate_id,
            token = %token,
            filename = %payload.filename,
            content_type = %payload.content_type,
            size_bytes = payload.len(),
            "Starting upload"
        );

        let uploader = self.uploader.clone();
        let credentials = self.credentials.clone();
        let tx = self.events_tx.clone();
        let sink = ProgressSink::new(token, tx.clone());
        let handle = runtime.spawn(async move {
            let result = uploader.upload(payload, &credentials, sink).await;
            let _ = tx.send(UploadEvent::completed(token, result));
        });

        self.in_flight = Some(InFlight { token, handle });
        self.state = LifecycleState::Uploading { progress: 0 };
        Ok(token)
    }

    /// Apply one network callback. Returns `false` if the event was stale and ignored.
    pub fn apply(&mut self, event: UploadEvent) -> bool {
        let current = self.in_flight.as_ref().map(|f| f.token);
        if current != Some(event.token) || !self.state.is_uploading() {
            tracing::debug!(
                token = %event.token,
                state = self.state.name(),
                "Ignoring stale upload event"
            );
            return false;
        }

        match event.kind {
            UploadEventKind::Progress { loaded, total } => {
                if let (Some(percent), LifecycleState::Uploading { progress }) =
                    (progress_percent(loaded, total), &mut self.state)
                {
                    if percent > *progress {
                        *progress = percent;
                        tracing::trace!(token = %event.token, progress = percent, "Upload progress");
                    }
                }
            }
            UploadEventKind::Completed(Ok(result)) => {
                self.in_flight = None;
                self.complete(result);
            }
            UploadEventKind::Completed(Err(e)) => {
                self.in_flight = None;
                self.fail(e);
            }
        }
        true
    }

    /// Wait for and apply the next event of the in-flight attempt.
    ///
    /// Returns `false` immediately when nothing is in flight.
    pub async fn process_next_event(&mut self) -> bool {
        if let Ok(event) = self.events_rx.try_recv() {
            return self.apply(event);
        }

        let next = {
            let Some(in_flight) = self.in_flight.as_mut() else {
                return false;
            };
            tokio::select! {
                biased;
                Some(event) = self.events_rx.recv() => NextEvent::Event(event),
                _ = &mut in_flight.handle => NextEvent::TaskEnded,
            }
        };

        match next {
            NextEvent::Event(event) => self.apply(event),
            NextEvent::TaskEnded => {
                // The task has finished, so everything it sent is already queued.
                let mut applied = false;
                while let Ok(event) = self.events_rx.try_recv() {
                    applied |= self.apply(event);
                }
                if self.state.is_uploading() {
                    self.in_flight = None;
                    self.fail(UploadError::Network(
                        "Upload task ended without a result".to_string(),
                    ));
                    applied = true;
                }
                applied
            }
        }
    }

    /// Drive the in-flight attempt until it succeeds or fails.
    pub async fn wait_until_settled(&mut self) -> &LifecycleState {
        while self.state.is_uploading() {
            if !self.process_next_event().await && self.in_flight.is_none() {
                break;
            }
        }
        &self.state
    }

    /// Record an acquisition that failed before producing a candidate.
    ///
    /// Moves an idle orchestrator to `Failed`; returns false and changes nothing in
    /// any other state.
    pub fn report_failure(&mut self, err: UploadError) -> bool {
        if !self.state.is_idle() {
            tracing::debug!(
                error = %err,
                state = self.state.name(),
                "Ignoring acquisition failure, a previous image is still pending"
            );
            return false;
        }
        self.fail(err);
        true
    }

    /// Return to idle from any state, aborting an in-flight upload.
    pub fn discard(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            tracing::info!(token = %in_flight.token, "Aborting in-flight upload");
            in_flight.handle.abort();
        }
        if !self.state.is_idle() {
            tracing::debug!(state = self.state.name(), "Discarding");
        }
        self.candidate = None;
        self.state = LifecycleState::Idle;
    }

    fn complete(&mut self, result: UploadResult) {
        tracing::info!(url = %result.hosted_url, "Upload succeeded");
        // The hosted result replaces the candidate.
        self.candidate = None;
        self.state = LifecycleState::Uploaded(result);
    }

    fn fail(&mut self, err: UploadError) -> WidgetError {
        let error_type = err.error_type();
        match err.log_level() {
            LogLevel::Debug => {
                tracing::debug!(error = %err, error_type = error_type, "Upload attempt failed");
            }
            LogLevel::Warn => {
                tracing::warn!(error = %err, error_type = error_type, "Upload attempt failed");
            }
            LogLevel::Error => {
                tracing::error!(error = %err, error_type = error_type, "Upload attempt failed");
            }
        }
        self.state = LifecycleState::Failed(err.clone());
        WidgetError::Upload(err)
    }
}

impl CandidateSink for UploadOrchestrator {
    fn receive_candidate(&mut self, candidate: CandidateImage) -> Result<(), WidgetError> {
        UploadOrchestrator::receive_candidate(self, candidate)
    }

    fn report_failure(&mut self, err: UploadError) {
        UploadOrchestrator::report_failure(self, err);
    }
}

impl Drop for UploadOrchestrator {
    fn drop(&mut self) {
        if let Some(in_flight) = self.in_flight.take() {
            in_flight.handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use camdrop_core::{CaptureError, DecodeError, EncodedPayload, ImageSource};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    // 1x1 transparent PNG
    const PNG_1X1: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNkYPhfDwAChwGA60e6kgAAAABJRU5ErkJggg==";

    fn candidate() -> CandidateImage {
        CandidateImage::new(
            ImageSource::FromFile,
            "pixel.png",
            PreviewHandle {
                data_url: PNG_1X1.to_string(),
                mime_type: "image/png".to_string(),
                width: 1,
                height: 1,
            },
        )
    }

    fn credentials() -> UploadCredentials {
        UploadCredentials::new("cloud", "23232323", "preset")
    }

    /// Reports scripted progress, then waits until released before answering.
    struct ScriptedUploader {
        progress: Vec<(u64, u64)>,
        result: Result<UploadResult, UploadError>,
        release: Arc<Notify>,
        payloads: Mutex<Vec<EncodedPayload>>,
    }

    impl ScriptedUploader {
        fn new(result: Result<UploadResult, UploadError>) -> Arc<Self> {
            Arc::new(Self {
                progress: Vec::new(),
                result,
                release: Arc::new(Notify::new()),
                payloads: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Uploader for ScriptedUploader {
        async fn upload(
            &self,
            payload: EncodedPayload,
            _credentials: &UploadCredentials,
            progress: ProgressSink,
        ) -> Result<UploadResult, UploadError> {
            self.payloads.lock().unwrap().push(payload);
            for (loaded, total) in &self.progress {
                progress.report(*loaded, *total);
            }
            self.release.notified().await;
            self.result.clone()
        }
    }

    #[tokio::test]
    async fn test_receive_candidate_only_when_idle() {
        let uploader = ScriptedUploader::new(Ok(UploadResult::new("https://host/a.png")));
        let mut orchestrator = UploadOrchestrator::new(credentials(), uploader);

        let first = candidate();
        let first_id = first.id;
        orchestrator.receive_candidate(first).unwrap();
        assert_eq!(orchestrator.state(), &LifecycleState::Previewing);

        let err = orchestrator.receive_candidate(candidate()).unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(orchestrator.state(), &LifecycleState::Previewing);
        assert_eq!(orchestrator.candidate().unwrap().id, first_id);
    }

    #[tokio::test]
    async fn test_acquisition_failure_moves_idle_to_failed() {
        let uploader = ScriptedUploader::new(Ok(UploadResult::new("https://host/a.png")));
        let mut orchestrator = UploadOrchestrator::new(credentials(), uploader);

        assert!(orchestrator.report_failure(UploadError::Decode(DecodeError::Empty)));
        assert_eq!(
            orchestrator.state(),
            &LifecycleState::Failed(UploadError::Decode(DecodeError::Empty))
        );

        // Only discard clears it; new candidates are refused meanwhile.
        assert!(orchestrator.receive_candidate(candidate()).unwrap_err().is_rejection());
        orchestrator.discard();
        assert!(orchestrator.state().is_idle());

        orchestrator.receive_candidate(candidate()).unwrap();
        assert!(!orchestrator.report_failure(UploadError::Capture(CaptureError::FrameUnavailable)));
        assert_eq!(orchestrator.state(), &LifecycleState::Previewing);
        assert!(orchestrator.candidate().is_some());
    }

    #[tokio::test]
    async fn test_confirm_requires_previewing() {
        let uploader = ScriptedUploader::new(Ok(UploadResult::new("https://host/a.png")));
        let mut orchestrator = UploadOrchestrator::new(credentials(), uploader);

        let err = orchestrator.confirm_upload().unwrap_err();
        assert_eq!(err, WidgetError::invalid_transition("confirm upload", "idle"));
        assert!(orchestrator.state().is_idle());
    }

    #[tokio::test]
    async fn test_confirm_while_uploading_is_rejected() {
        let uploader = ScriptedUploader::new(Ok(UploadResult::new("https://host/a.png")));
        let mut orchestrator = UploadOrchestrator::new(credentials(), uploader.clone());

        orchestrator.receive_candidate(candidate()).unwrap();
        let token = orchestrator.confirm_upload().unwrap();
        assert_eq!(orchestrator.progress(), Some(0));

        let err = orchestrator.confirm_upload().unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(orchestrator.in_flight_token(), Some(token));

        uploader.release.notify_one();
        let state = orchestrator.wait_until_settled().await;
        assert_eq!(state.hosted_url(), Some("https://host/a.png"));
        assert!(orchestrator.candidate().is_none());
        assert_eq!(uploader.payloads.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_progress_is_monotonic_and_clamped() {
        let uploader = Arc::new(ScriptedUploader {
            progress: vec![(10, 100), (50, 100), (30, 100), (250, 100), (5, 0)],
            result: Ok(UploadResult::new("https://host/a.png")),
            release: Arc::new(Notify::new()),
            payloads: Mutex::new(Vec::new()),
        });
        let mut orchestrator = UploadOrchestrator::new(credentials(), uploader.clone());
        orchestrator.receive_candidate(candidate()).unwrap();
        orchestrator.confirm_upload().unwrap();

        let mut seen = Vec::new();
        for _ in 0..5 {
            assert!(orchestrator.process_next_event().await);
            seen.push(orchestrator.progress().unwrap());
        }
        assert_eq!(seen, vec![10, 50, 50, 100, 100]);

        uploader.release.notify_one();
        orchestrator.wait_until_settled().await;
        assert!(orchestrator.hosted_url().is_some());
    }

    #[tokio::test]
    async fn test_failure_then_discard() {
        let uploader = ScriptedUploader::new(Err(UploadError::UploadRejected {
            status: 500,
            message: "boom".to_string(),
        }));
        uploader.release.notify_one();
        let mut orchestrator = UploadOrchestrator::new(credentials(), uploader);

        orchestrator.receive_candidate(candidate()).unwrap();
        orchestrator.confirm_upload().unwrap();
        let state = orchestrator.wait_until_settled().await;
        assert!(matches!(
            state,
            LifecycleState::Failed(UploadError::UploadRejected { status: 500, .. })
        ));

        orchestrator.discard();
        assert!(orchestrator.state().is_idle());
        assert!(orchestrator.candidate().is_none());
    }

    #[tokio::test]
    async fn test_discard_aborts_and_ignores_stale_events() {
        let uploader = ScriptedUploader::new(Ok(UploadResult::new("https://host/a.png")));
        let mut orchestrator = UploadOrchestrator::new(credentials(), uploader);

        orchestrator.receive_candidate(candidate()).unwrap();
        let token = orchestrator.confirm_upload().unwrap();
        orchestrator.discard();
        assert!(orchestrator.state().is_idle());
        assert!(orchestrator.in_flight_token().is_none());

        // A late response for the discarded attempt must not resurrect it.
        let applied = orchestrator.apply(UploadEvent::completed(
            token,
            Ok(UploadResult::new("https://host/stale.png")),
        ));
        assert!(!applied);
        assert!(orchestrator.state().is_idle());
        assert!(!orchestrator.process_next_event().await);
    }

    #[tokio::test]
    async fn test_event_for_previous_attempt_is_ignored() {
        let uploader = ScriptedUploader::new(Ok(UploadResult::new("https://host/a.png")));
        let mut orchestrator = UploadOrchestrator::new(credentials(), uploader);

        orchestrator.receive_candidate(candidate()).unwrap();
        let first = orchestrator.confirm_upload().unwrap();
        orchestrator.discard();

        orchestrator.receive_candidate(candidate()).unwrap();
        let second = orchestrator.confirm_upload().unwrap();
        assert!(second > first);

        assert!(!orchestrator.apply(UploadEvent::progress(first, 90, 100)));
        assert_eq!(orchestrator.progress(), Some(0));
        assert!(orchestrator.apply(UploadEvent::progress(second, 90, 100)));
        assert_eq!(orchestrator.progress(), Some(90));
    }

    #[tokio::test]
    async fn test_missing_credentials_fail_fast() {
        let uploader = ScriptedUploader::new(Ok(UploadResult::new("https://host/a.png")));
        let mut orchestrator = UploadOrchestrator::new(
            UploadCredentials::new("cloud", "", "preset"),
            uploader.clone(),
        );

        orchestrator.receive_candidate(candidate()).unwrap();
        let err = orchestrator.confirm_upload().unwrap_err();
        assert!(matches!(err, WidgetError::Upload(UploadError::Config(_))));
        assert!(matches!(
            orchestrator.state(),
            LifecycleState::Failed(UploadError::Config(_))
        ));
        assert!(uploader.payloads.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_malformed_preview_fails_with_encode_error() {
        let uploader = ScriptedUploader::new(Ok(UploadResult::new("https://host/a.png")));
        let mut orchestrator = UploadOrchestrator::new(credentials(), uploader);

        let mut bad = candidate();
        bad.preview.data_url = "data:image/png,not-base64".to_string();
        orchestrator.receive_candidate(bad).unwrap();

        let err = orchestrator.confirm_upload().unwrap_err();
        assert!(matches!(err, WidgetError::Upload(UploadError::Encode(_))));
        assert_eq!(orchestrator.error().unwrap().error_code(), "ENCODE_ERROR");
    }

    #[test]
    fn test_confirm_without_runtime_fails() {
        let uploader = ScriptedUploader::new(Ok(UploadResult::new("https://host/a.png")));
        let mut orchestrator = UploadOrchestrator::new(credentials(), uploader);
        orchestrator.receive_candidate(candidate()).unwrap();

        let err = orchestrator.confirm_upload().unwrap_err();
        assert!(matches!(err, WidgetError::Upload(UploadError::Network(_))));
    }
}
