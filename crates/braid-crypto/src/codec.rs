//! Base64 codec for keys and signatures.
//!
//! All cryptographic material crosses the wire as standard base64 of the
//! raw bytes (Dilithium2 public keys, secret keys, detached signatures).

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// Encode raw bytes as standard base64.
pub fn encode(data: &[u8]) -> String {
    STANDARD.encode(data)
}

/// Decode standard base64 back to raw bytes.
pub fn decode(data: &str) -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(data)
}
