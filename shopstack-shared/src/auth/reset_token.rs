/// One-time reset tokens for password and email changes
///
/// A reset token is an opaque random string mailed (out of band) to the
/// account holder. Only its SHA-256 hash is stored, together with an expiry
/// timestamp; the completion endpoint hashes the presented token and looks
/// the hash up, so a database leak never exposes a usable token.
///
/// # Example
///
/// ```
/// use shopstack_shared::auth::reset_token::{generate_reset_token, hash_reset_token};
///
/// let (token, hash) = generate_reset_token();
/// assert_eq!(hash, hash_reset_token(&token));
/// assert_eq!(hash.len(), 64);
/// ```

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use sha2::{Digest, Sha256};

/// Random bytes per token (hex-encoded to 48 characters)
const TOKEN_BYTES: usize = 24;

/// How long a reset token stays valid
pub const TOKEN_TTL_MINUTES: i64 = 30;

/// Generates a new reset token
///
/// Returns `(plaintext_token, sha256_hash)`. The plaintext goes to the user,
/// the hash into the database.
pub fn generate_reset_token() -> (String, String) {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);

    let token = hex::encode(bytes);
    let hash = hash_reset_token(&token);

    (token, hash)
}

/// Hashes a reset token with SHA-256
///
/// Deterministic, so the completion endpoint can look up the stored hash by
/// hashing whatever the caller presented.
pub fn hash_reset_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

/// Returns the expiry timestamp for a token issued now
pub fn token_expiry() -> DateTime<Utc> {
    Utc::now() + Duration::minutes(TOKEN_TTL_MINUTES)
}

/// Checks whether a stored expiry timestamp is still in the future
pub fn is_token_valid(expires_at: Option<DateTime<Utc>>) -> bool {
    match expires_at {
        Some(expiry) => Utc::now() < expiry,
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_reset_token() {
        let (token, hash) = generate_reset_token();

        assert_eq!(token.len(), TOKEN_BYTES * 2);
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_reset_token(&token));
    }

    #[test]
    fn test_tokens_are_unique() {
        let (token1, _) = generate_reset_token();
        let (token2, _) = generate_reset_token();

        assert_ne!(token1, token2);
    }

    #[test]
    fn test_hash_is_deterministic() {
        assert_eq!(hash_reset_token("abc123"), hash_reset_token("abc123"));
        assert_ne!(hash_reset_token("abc123"), hash_reset_token("abc124"));
    }

    #[test]
    fn test_token_expiry_is_in_future() {
        assert!(is_token_valid(Some(token_expiry())));
    }

    #[test]
    fn test_expired_or_missing_token_is_invalid() {
        assert!(!is_token_valid(Some(Utc::now() - Duration::minutes(1))));
        assert!(!is_token_valid(None));
    }
}
