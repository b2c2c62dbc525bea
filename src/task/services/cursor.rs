//! Opaque pagination cursor wrapping the store's continuation key.

use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use crate::task::ports::StoreKey;

/// Encodes a continuation key as an opaque URL-safe token.
#[must_use]
pub fn encode_cursor(key: &StoreKey) -> String {
    // StoreKey holds only a timestamp and a UUID; serialization cannot fail.
    let json = serde_json::to_vec(key).unwrap_or_default();
    URL_SAFE_NO_PAD.encode(json)
}

/// Decodes a token produced by [`encode_cursor`].
///
/// Returns `None` for anything that does not round-trip.
#[must_use]
pub fn decode_cursor(token: &str) -> Option<StoreKey> {
    let bytes = URL_SAFE_NO_PAD.decode(token.trim()).ok()?;
    serde_json::from_slice(&bytes).ok()
}
