use camdrop_core::constants::DEFAULT_MAX_FILE_SIZE_BYTES;
use camdrop_core::EncodeError;
use std::path::{Component, Path};

const MAX_FILENAME_LEN: usize = 255;

/// Image content types the hosting API accepts from this widget, with the
/// extension each one is uploaded under.
const IMAGE_CONTENT_TYPES: &[(&str, &[&str])] = &[
    ("image/jpeg", &["jpg", "jpeg"]),
    ("image/png", &["png"]),
    ("image/gif", &["gif"]),
    ("image/webp", &["webp"]),
];

/// Upload payload validator
///
/// Checks size and content type before a request is issued, and normalizes the
/// filename sent in the multipart form.
#[derive(Debug, Clone)]
pub struct PayloadValidator {
    max_file_size: usize,
}

impl Default for PayloadValidator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_FILE_SIZE_BYTES)
    }
}

impl PayloadValidator {
    pub fn new(max_file_size: usize) -> Self {
        Self { max_file_size }
    }

    pub fn max_file_size(&self) -> usize {
        self.max_file_size
    }

    /// Validate payload size
    pub fn validate_size(&self, size: usize) -> Result<(), EncodeError> {
        if size == 0 {
            return Err(EncodeError::EmptyPayload);
        }

        if size > self.max_file_size {
            return Err(EncodeError::PayloadTooLarge {
                size,
                max: self.max_file_size,
            });
        }

        Ok(())
    }

    /// Validate content type
    pub fn validate_content_type(&self, content_type: &str) -> Result<(), EncodeError> {
        let normalized = content_type.to_lowercase();
        if extensions_for(&normalized).is_none() {
            return Err(EncodeError::UnsupportedContentType(content_type.to_string()));
        }
        Ok(())
    }

    /// Produce the filename sent with the payload.
    ///
    /// Unsafe characters are replaced and the extension is made to agree with the
    /// content type, which comes from the bytes rather than from the user's filename.
    pub fn upload_filename(&self, filename: &str, content_type: &str) -> Result<String, EncodeError> {
        let normalized = content_type.to_lowercase();
        let extensions = extensions_for(&normalized)
            .ok_or_else(|| EncodeError::UnsupportedContentType(content_type.to_string()))?;

        let path = Path::new(filename);
        // A name that resolves to a directory reference has no file part to keep.
        if matches!(
            path.components().next_back(),
            Some(Component::CurDir | Component::ParentDir)
        ) {
            return Err(EncodeError::InvalidFilename(filename.to_string()));
        }
        let base = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or(filename);

        let safe: String = base
            .chars()
            .take(MAX_FILENAME_LEN)
            .map(|c| {
                if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect();

        let path = Path::new(&safe);
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.trim_matches('_').is_empty())
            .unwrap_or("image");
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match extension {
            Some(ext) if extensions.contains(&ext.as_str()) => Ok(format!("{}.{}", stem, ext)),
            other => {
                tracing::debug!(
                    filename = %filename,
                    extension = ?other,
                    content_type = %content_type,
                    "Extension does not match content type, renaming"
                );
                Ok(format!("{}.{}", stem, extensions[0]))
            }
        }
    }

    /// Validate all aspects of a payload and return the normalized filename
    pub fn validate_all(
        &self,
        filename: &str,
        content_type: &str,
        size: usize,
    ) -> Result<String, EncodeError> {
        self.validate_size(size)?;
        self.validate_content_type(content_type)?;
        self.upload_filename(filename, content_type)
    }
}

fn extensions_for(content_type: &str) -> Option<&'static [&'static str]> {
    IMAGE_CONTENT_TYPES
        .iter()
        .find(|(ct, _)| *ct == content_type)
        .map(|(_, exts)| *exts)
}
