//! Camdrop Processing Library
//!
//! Pure conversions between raw image bytes, displayable previews and upload payloads.
//! Nothing in this crate performs I/O or keeps state between calls.

pub mod data_url;
pub mod encoder;
pub mod validator;

pub use data_url::DataUrl;
pub use encoder::MediaEncoder;
pub use validator::PayloadValidator;
