//! Password hashing and verification via bcrypt.

use bcrypt::BcryptError;

/// Verify a plaintext secret against a stored bcrypt hash.
///
/// A mismatch is a normal `false`, not an error. A stored hash that cannot be
/// parsed also yields `false` — the caller must not be able to distinguish a
/// corrupt hash from a wrong password — but is logged, since it means the
/// record needs repair.
pub fn verify_secret(secret: &str, stored_hash: &str) -> bool {
    match bcrypt::verify(secret, stored_hash) {
        Ok(matches) => matches,
        Err(err) => {
            tracing::warn!(error = %err, "stored password hash could not be verified");
            false
        }
    }
}

/// Hash a plaintext secret with the given bcrypt work factor.
pub fn hash_secret(secret: &str, cost: u32) -> Result<String, BcryptError> {
    bcrypt::hash(secret, cost)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Minimum cost keeps the test suite fast.
    const TEST_COST: u32 = 4;

    #[test]
    fn correct_secret_matches() {
        let hash = hash_secret("hunter2", TEST_COST).unwrap();
        assert!(verify_secret("hunter2", &hash));
    }

    #[test]
    fn wrong_secret_does_not_match() {
        let hash = hash_secret("hunter2", TEST_COST).unwrap();
        assert!(!verify_secret("wrong", &hash));
    }

    #[test]
    fn malformed_hash_is_a_mismatch() {
        assert!(!verify_secret("hunter2", "not-a-bcrypt-hash"));
    }

    #[test]
    fn hashes_are_salted() {
        let a = hash_secret("hunter2", TEST_COST).unwrap();
        let b = hash_secret("hunter2", TEST_COST).unwrap();
        assert_ne!(a, b);
    }
}
