//! Outbound upload seam.
//!
//! The orchestrator never talks HTTP directly. It hands an [`Uploader`] the payload
//! and a [`ProgressSink`]; every progress report and the final result travel back as
//! [`UploadEvent`]s tagged with the attempt's [`RequestToken`].

use async_trait::async_trait;
use camdrop_api_client::{ProgressCallback, UploadClient};
use camdrop_core::{EncodedPayload, RequestToken, UploadCredentials, UploadError, UploadResult};
use std::sync::Arc;
use tokio::sync::mpsc;

/// Performs one upload attempt.
#[async_trait]
pub trait Uploader: Send + Sync {
    async fn upload(
        &self,
        payload: EncodedPayload,
        credentials: &UploadCredentials,
        progress: ProgressSink,
    ) -> Result<UploadResult, UploadError>;
}

#[async_trait]
impl Uploader for UploadClient {
    async fn upload(
        &self,
        payload: EncodedPayload,
        credentials: &UploadCredentials,
        progress: ProgressSink,
    ) -> Result<UploadResult, UploadError> {
        self.upload_image(payload, credentials, progress.into_callback())
            .await
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadEventKind {
    Progress { loaded: u64, total: u64 },
    Completed(Result<UploadResult, UploadError>),
}

/// A network callback for a specific upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadEvent {
    pub token: RequestToken,
    pub kind: UploadEventKind,
}

impl UploadEvent {
    pub fn progress(token: RequestToken, loaded: u64, total: u64) -> Self {
        Self {
            token,
            kind: UploadEventKind::Progress { loaded, total },
        }
    }

    pub fn completed(token: RequestToken, result: Result<UploadResult, UploadError>) -> Self {
        Self {
            token,
            kind: UploadEventKind::Completed(result),
        }
    }
}

/// Reports progress for one attempt back to the orchestrator.
#[derive(Debug, Clone)]
pub struct ProgressSink {
    token: RequestToken,
    tx: mpsc::UnboundedSender<UploadEvent>,
}

impl ProgressSink {
    pub(crate) fn new(token: RequestToken, tx: mpsc::UnboundedSender<UploadEvent>) -> Self {
        Self { token, tx }
    }

    pub fn token(&self) -> RequestToken {
        self.token
    }

    pub fn report(&self, loaded: u64, total: u64) {
        // The orchestrator may already be gone; a dropped update is harmless.
        let _ = self.tx.send(UploadEvent::progress(self.token, loaded, total));
    }

    pub fn into_callback(self) -> ProgressCallback {
        Arc::new(move |loaded, total| self.report(loaded, total))
    }
}
