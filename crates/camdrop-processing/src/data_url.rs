//! `data:<mime>;base64,<payload>` parsing and building.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use camdrop_core::EncodeError;

const SCHEME: &str = "data:";
const BASE64_MARKER: &str = "base64";

/// Borrowed view of a parsed data URL. The payload is still base64 text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DataUrl<'a> {
    pub mime_type: &'a str,
    pub payload: &'a str,
}

impl<'a> DataUrl<'a> {
    /// Parse the header and locate the payload without decoding it.
    pub fn parse(input: &'a str) -> Result<Self, EncodeError> {
        let rest = strip_scheme(input).ok_or(EncodeError::MissingScheme)?;
        let (header, payload) = rest.split_once(',').ok_or(EncodeError::MissingScheme)?;

        let mut segments = header.split(';');
        let mime_type = segments.next().unwrap_or("").trim();
        if !is_mime_type(mime_type) {
            return Err(EncodeError::MissingMimeType);
        }

        // Parameters such as `charset=` may precede the encoding marker, which must come last.
        let is_base64 = segments
            .last()
            .map(|s| s.trim().eq_ignore_ascii_case(BASE64_MARKER))
            .unwrap_or(false);
        if !is_base64 {
            return Err(EncodeError::NotBase64);
        }

        if payload.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }

        Ok(Self { mime_type, payload })
    }

    /// Decode the payload. Rejects anything outside the standard base64 alphabet.
    pub fn decode(&self) -> Result<Vec<u8>, EncodeError> {
        let bytes = STANDARD
            .decode(self.payload)
            .map_err(|e| EncodeError::InvalidBase64(e.to_string()))?;
        if bytes.is_empty() {
            return Err(EncodeError::EmptyPayload);
        }
        Ok(bytes)
    }
}

/// Build a data URL for `data` with the given MIME type.
pub fn build(mime_type: &str, data: &[u8]) -> String {
    let encoded = STANDARD.encode(data);
    let mut url = String::with_capacity(SCHEME.len() + mime_type.len() + 8 + encoded.len());
    url.push_str(SCHEME);
    url.push_str(mime_type);
    url.push(';');
    url.push_str(BASE64_MARKER);
    url.push(',');
    url.push_str(&encoded);
    url
}

fn strip_scheme(input: &str) -> Option<&str> {
    let trimmed = input.trim_start();
    let head = trimmed.get(..SCHEME.len())?;
    if head.eq_ignore_ascii_case(SCHEME) {
        trimmed.get(SCHEME.len()..)
    } else {
        None
    }
}

fn is_mime_type(value: &str) -> bool {
    match value.split_once('/') {
        Some((kind, subtype)) => !kind.is_empty() && !subtype.is_empty(),
        None => false,
    }
}
