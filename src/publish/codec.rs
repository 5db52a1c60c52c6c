//! Base64 transfer encoding used by the Contents API.
//!
//! GitHub wraps the `content` field at 60 columns, so line breaks are
//! dropped before decoding.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Why stored content could not be turned back into text
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("content is not valid base64")]
    Base64(#[from] base64::DecodeError),

    #[error("content is not valid UTF-8")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub fn decode_content(encoded: &str) -> Result<String, DecodeError> {
    let compact: String = encoded.chars().filter(|c| *c != '\n' && *c != '\r').collect();
    let bytes = STANDARD.decode(compact)?;
    Ok(String::from_utf8(bytes)?)
}

pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}
