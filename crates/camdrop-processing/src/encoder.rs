//! Media encoder - preview decoding and upload payload encoding

use bytes::Bytes;
use camdrop_core::{DecodeError, EncodeError, EncodedPayload, PreviewHandle};
use image::{GenericImageView, ImageFormat, ImageReader};
use std::io::Cursor;

use crate::data_url::{self, DataUrl};
use crate::validator::PayloadValidator;

/// Converts raw image bytes into previews and previews back into upload payloads.
///
/// The conversion is lossless: the payload produced from a preview holds exactly
/// the bytes the preview was decoded from.
#[derive(Debug, Clone, Default)]
pub struct MediaEncoder {
    validator: PayloadValidator,
}

impl MediaEncoder {
    pub fn new(validator: PayloadValidator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &PayloadValidator {
        &self.validator
    }

    /// Wrap raw bytes from a file read or camera screenshot into a preview.
    ///
    /// The image is fully decoded once to reject truncated or corrupt data up front.
    pub fn decode_to_preview(&self, raw: &[u8]) -> Result<PreviewHandle, DecodeError> {
        if raw.is_empty() {
            return Err(DecodeError::Empty);
        }

        let format = image::guess_format(raw)
            .map_err(|e| DecodeError::UnsupportedFormat(e.to_string()))?;
        let mime_type = mime_type_for(format)
            .ok_or_else(|| DecodeError::UnsupportedFormat(format!("{:?}", format)))?;

        let img = ImageReader::with_format(Cursor::new(raw), format)
            .decode()
            .map_err(|e| DecodeError::Corrupt(e.to_string()))?;
        let (width, height) = img.dimensions();

        tracing::debug!(
            format = ?format,
            width,
            height,
            size_bytes = raw.len(),
            "Decoded image preview"
        );

        Ok(PreviewHandle {
            data_url: data_url::build(mime_type, raw),
            mime_type: mime_type.to_string(),
            width,
            height,
        })
    }

    /// Reverse a preview into the binary payload sent as the `file` form field.
    pub fn encode_for_upload(
        &self,
        preview: &PreviewHandle,
        filename: &str,
    ) -> Result<EncodedPayload, EncodeError> {
        self.encode_data_url(&preview.data_url, filename)
    }

    /// Same as [`encode_for_upload`](Self::encode_for_upload) for a bare data URL string.
    pub fn encode_data_url(
        &self,
        data_url: &str,
        filename: &str,
    ) -> Result<EncodedPayload, EncodeError> {
        let parsed = DataUrl::parse(data_url)?;
        let data = parsed.decode()?;
        let content_type = parsed.mime_type.to_lowercase();
        let filename = self
            .validator
            .validate_all(filename, &content_type, data.len())?;

        Ok(EncodedPayload {
            filename,
            content_type,
            data: Bytes::from(data),
        })
    }
}

fn mime_type_for(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}
