//! Upload progress reporting.
//!
//! The file part of the form is streamed in fixed-size chunks; each chunk handed to
//! the connection advances the reported byte count.

use bytes::Bytes;
use futures::StreamExt;
use std::sync::Arc;

/// Called with `(bytes_sent, bytes_total)` as the file part is transmitted.
pub type ProgressCallback = Arc<dyn Fn(u64, u64) + Send + Sync>;

pub const CHUNK_SIZE: usize = 16 * 1024;

/// Callback that discards every update.
pub fn no_progress() -> ProgressCallback {
    Arc::new(|_, _| {})
}

/// Split `data` into chunks of at most `size` bytes without copying.
pub fn split_chunks(data: Bytes, size: usize) -> Vec<Bytes> {
    let size = size.max(1);
    (0..data.len())
        .step_by(size)
        .map(|start| data.slice(start..(start + size).min(data.len())))
        .collect()
}

/// Wrap `data` in a streaming request body that reports progress per chunk.
pub fn progress_body(data: Bytes, on_progress: ProgressCallback) -> reqwest::Body {
    let total = data.len() as u64;
    let mut sent = 0u64;
    let stream = futures::stream::iter(split_chunks(data, CHUNK_SIZE)).map(move |chunk| {
        sent += chunk.len() as u64;
        on_progress(sent, total);
        Ok::<Bytes, std::io::Error>(chunk)
    });
    reqwest::Body::wrap_stream(stream)
}
