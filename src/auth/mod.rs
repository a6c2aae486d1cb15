pub mod jwt;
pub mod password;

pub use jwt::{Claims, create_token, validate_token};
pub use password::{hash_password, verify_password};

use sha2::{Digest, Sha256};

/// SHA-256 hash a token or fingerprint for safe database storage.
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}
