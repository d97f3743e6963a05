use bytes::Bytes;

/// Binary (content-type, bytes) pair ready for transmission. Consumed by the upload call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedPayload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl EncodedPayload {
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
