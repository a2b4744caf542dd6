use braid_core::types::{SignatureB64, WalletId};
use pqcrypto_dilithium::dilithium2;
use pqcrypto_traits::sign::{PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::codec;
use crate::dilithium::{sign, SignatureError};

/// A Dilithium2 keypair held in base64, as stored in wallet keyfiles.
///
/// The secret key bytes are wiped on drop.
#[derive(Serialize, Deserialize)]
pub struct KeyPair {
    pub public_key: WalletId,
    secret_key: String,
}

impl KeyPair {
    /// Generate a fresh Dilithium2 keypair. Used by the wallet CLI only;
    /// the node never holds secret keys.
    pub fn generate() -> Self {
        let (pk, sk) = dilithium2::keypair();
        Self {
            public_key: WalletId::new(codec::encode(pk.as_bytes())),
            secret_key: codec::encode(sk.as_bytes()),
        }
    }

    /// Restore a keypair from encoded key material (e.g. a loaded keyfile).
    pub fn from_encoded(public_key: String, secret_key: String) -> Self {
        Self {
            public_key: WalletId::new(public_key),
            secret_key,
        }
    }

    /// Sign `message` with this keypair's secret key.
    pub fn sign(&self, message: &[u8]) -> Result<SignatureB64, SignatureError> {
        let sk = Zeroizing::new(
            codec::decode(&self.secret_key).map_err(|_| SignatureError::InvalidEncoding)?,
        );
        sign(&sk, message)
    }

    pub fn secret_key_b64(&self) -> &str {
        &self.secret_key
    }
}

impl Drop for KeyPair {
    fn drop(&mut self) {
        use zeroize::Zeroize;
        self.secret_key.zeroize();
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "KeyPair {{ public_key: {:?} }}", self.public_key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dilithium::verify;

    #[test]
    fn generated_keypair_signs_verifiably() {
        let kp = KeyPair::generate();
        let message = b"wallet keyfile round trip";
        let sig = kp.sign(message).unwrap();
        assert!(verify(message, &sig, &kp.public_key));
    }

    #[test]
    fn restored_keypair_matches_original() {
        let kp = KeyPair::generate();
        let restored =
            KeyPair::from_encoded(kp.public_key.as_str().into(), kp.secret_key_b64().into());
        let sig = restored.sign(b"hello").unwrap();
        assert!(verify(b"hello", &sig, &kp.public_key));
    }
}
