//! Reversible token encoding.
//!
//! `encode` percent-encodes the text and wraps the result in standard base64,
//! which is what the browser build stores (`btoa(encodeURIComponent(t))`).
//! This hides the token from a casual look at storage and nothing more: anyone
//! holding the stored value can recover the token.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Encodes `plain` for storage.
#[must_use]
pub fn encode(plain: &str) -> String {
    STANDARD.encode(urlencoding::encode(plain).as_bytes())
}

/// Decodes a value produced by [`encode`].
///
/// Malformed input is returned unchanged and the failure is logged.
#[must_use]
pub fn decode(coded: &str) -> String {
    match try_decode(coded) {
        Ok(plain) => plain,
        Err(reason) => {
            tracing::error!(reason, "Token decode failed, using stored value as-is");
            coded.to_owned()
        }
    }
}

fn try_decode(coded: &str) -> Result<String, &'static str> {
    let bytes = STANDARD.decode(coded).map_err(|_| "invalid base64")?;
    let escaped = String::from_utf8(bytes).map_err(|_| "invalid utf-8")?;
    urlencoding::decode(&escaped)
        .map(|s| s.into_owned())
        .map_err(|_| "invalid percent-encoding")
}
