//! Salted one-way password digests.
//!
//! The salt is the user's `created_at` text, so the digest can be recomputed
//! at sign-in from the stored row alone.

/// Hex-encoded BLAKE3 digest of `salt || password`.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hasher.finalize().to_hex().to_string()
}

/// Compare `password` against a stored digest in constant time.
pub fn verify_password(salt: &str, password: &str, stored: &str) -> bool {
    match blake3::Hash::from_hex(stored) {
        Ok(expected) => {
            let mut hasher = blake3::Hasher::new();
            hasher.update(salt.as_bytes());
            hasher.update(password.as_bytes());
            hasher.finalize() == expected
        }
        Err(_) => false,
    }
}
