pub mod codec;
pub mod dilithium;
pub mod hash;
pub mod keypair;

pub use dilithium::{sign, verify, verify_signature, SignatureError};
pub use hash::{block_hash, sha256_hex};
pub use keypair::KeyPair;
