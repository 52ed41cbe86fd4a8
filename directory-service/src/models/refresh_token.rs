use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

/// Registry record for a live refresh token. The token itself is never
/// stored, only its SHA-256 digest as the lookup key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshTokenEntry {
    /// User the token was issued to
    pub user_id: i64,
    /// Copied from the token's `exp` claim; used only for sweeping
    pub expires_at: DateTime<Utc>,
}

impl RefreshTokenEntry {
    pub fn new(user_id: i64, expires_at: DateTime<Utc>) -> Self {
        Self {
            user_id,
            expires_at,
        }
    }

    /// Hash a token using SHA-256
    pub fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_hash_is_stable_and_hides_token() {
        let hash = RefreshTokenEntry::hash_token("token_abc");

        assert_ne!(hash, "token_abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, RefreshTokenEntry::hash_token("token_abc"));
        assert_ne!(hash, RefreshTokenEntry::hash_token("token_abd"));
    }

    #[test]
    fn test_entry_expiry_boundary() {
        let now = Utc::now();
        let entry = RefreshTokenEntry::new(1, now + Duration::seconds(5));

        assert!(!entry.is_expired_at(now));
        assert!(entry.is_expired_at(now + Duration::seconds(5)));
        assert!(entry.is_expired_at(now + Duration::seconds(6)));
    }
}
