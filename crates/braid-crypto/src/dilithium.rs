use braid_core::types::{SignatureB64, WalletId};
use pqcrypto_dilithium::dilithium2;
use pqcrypto_traits::sign::{DetachedSignature, PublicKey, SecretKey};
use thiserror::Error;

use crate::codec;

#[derive(Debug, Error)]
pub enum SignatureError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("invalid public key length: expected {expected}, got {got}")]
    InvalidPublicKeyLength { expected: usize, got: usize },
    #[error("invalid base64 encoding")]
    InvalidEncoding,
}

/// Sign `message` with a Dilithium2 secret key. Returns a detached
/// signature in base64.
pub fn sign(secret_key_bytes: &[u8], message: &[u8]) -> Result<SignatureB64, SignatureError> {
    let sk = dilithium2::SecretKey::from_bytes(secret_key_bytes)
        .map_err(|_| SignatureError::InvalidSignature)?;
    let sig = dilithium2::detached_sign(message, &sk);
    Ok(SignatureB64(codec::encode(sig.as_bytes())))
}

/// Verify a detached Dilithium2 signature against raw byte inputs.
pub fn verify_signature(
    public_key_bytes: &[u8],
    message: &[u8],
    signature_bytes: &[u8],
) -> Result<(), SignatureError> {
    let pk = dilithium2::PublicKey::from_bytes(public_key_bytes).map_err(|_| {
        SignatureError::InvalidPublicKeyLength {
            expected: dilithium2::public_key_bytes(),
            got: public_key_bytes.len(),
        }
    })?;
    let sig = dilithium2::DetachedSignature::from_bytes(signature_bytes)
        .map_err(|_| SignatureError::InvalidSignature)?;
    dilithium2::verify_detached_signature(&sig, message, &pk)
        .map_err(|_| SignatureError::InvalidSignature)
}

/// Verify a transaction signature as it arrives off the wire: base64 wallet
/// key, base64 signature, raw preimage bytes.
///
/// Every failure mode (bad encoding, wrong-size buffers, a forged
/// signature) collapses to `false`; nothing escapes as a panic or error.
/// Safe to call concurrently.
pub fn verify(message: &[u8], signature: &SignatureB64, public_key: &WalletId) -> bool {
    let Ok(pk_bytes) = codec::decode(public_key.as_str()) else {
        return false;
    };
    let Ok(sig_bytes) = codec::decode(signature.as_str()) else {
        return false;
    };
    verify_signature(&pk_bytes, message, &sig_bytes).is_ok()
}
