use crate::TicketError;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Encodes bytes as URL-safe base64 without padding.
pub fn encode_base64(bytes: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Decodes URL-safe base64 without padding.
pub fn decode_base64(encoded: &str) -> Result<Vec<u8>, TicketError> {
    Ok(URL_SAFE_NO_PAD.decode(encoded)?)
}
