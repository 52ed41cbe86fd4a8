use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{de::DeserializeOwned, Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::config::JwtConfig;
use crate::models::Role;

/// JWT service for token generation and validation.
///
/// Holds no state beyond the HMAC secret and the two TTLs; rotating the
/// secret invalidates every outstanding token at once.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
}

/// Claims for access tokens (short-lived)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessTokenClaims {
    /// Subject (user ID), a string on the wire
    #[serde(with = "subject")]
    pub sub: i64,
    pub role: Role,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Claims for refresh tokens (long-lived)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshTokenClaims {
    /// Subject (user ID), a string on the wire
    #[serde(with = "subject")]
    pub sub: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Distinguishes tokens minted for the same user in the same second
    pub jti: String,
}

/// The registered `sub` claim is a string; user ids are numeric.
mod subject {
    use super::*;

    pub fn serialize<S: Serializer>(id: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(id)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        String::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

impl RefreshTokenClaims {
    pub fn expires_at(&self) -> DateTime<Utc> {
        Utc.timestamp_opt(self.exp, 0)
            .single()
            .unwrap_or_else(Utc::now)
    }
}

trait Expiring {
    fn exp(&self) -> i64;
}

impl Expiring for AccessTokenClaims {
    fn exp(&self) -> i64 {
        self.exp
    }
}

impl Expiring for RefreshTokenClaims {
    fn exp(&self) -> i64 {
        self.exp
    }
}

impl JwtService {
    pub fn new(config: &JwtConfig) -> Result<Self, anyhow::Error> {
        if config.secret.is_empty() {
            return Err(anyhow::anyhow!("JWT secret must not be empty"));
        }

        let access_token_ttl = Duration::try_minutes(config.access_token_expiry_minutes)
            .ok_or_else(|| anyhow::anyhow!("Access token expiry out of range"))?;
        let refresh_token_ttl = Duration::try_days(config.refresh_token_expiry_days)
            .ok_or_else(|| anyhow::anyhow!("Refresh token expiry out of range"))?;

        tracing::info!("JWT service initialized with HS256 secret");

        Ok(Self::with_ttls(
            config.secret.as_bytes(),
            access_token_ttl,
            refresh_token_ttl,
        ))
    }

    pub fn with_ttls(secret: &[u8], access_token_ttl: Duration, refresh_token_ttl: Duration) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            access_token_ttl,
            refresh_token_ttl,
        }
    }

    /// Generate an access token for a user
    pub fn generate_access_token(&self, user_id: i64, role: Role) -> Result<String, anyhow::Error> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.access_token_ttl)
            .ok_or_else(|| anyhow::anyhow!("Access token expiry overflows"))?;

        let claims = AccessTokenClaims {
            sub: user_id,
            role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode access token: {}", e))
    }

    /// Generate a refresh token for a user, returning it with its claims
    pub fn generate_refresh_token(
        &self,
        user_id: i64,
    ) -> Result<(String, RefreshTokenClaims), anyhow::Error> {
        let now = Utc::now();
        let exp = now
            .checked_add_signed(self.refresh_token_ttl)
            .ok_or_else(|| anyhow::anyhow!("Refresh token expiry overflows"))?;

        let claims = RefreshTokenClaims {
            sub: user_id,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| anyhow::anyhow!("Failed to encode refresh token: {}", e))?;

        Ok((token, claims))
    }

    /// Validate and decode an access token
    pub fn validate_access_token(&self, token: &str) -> Result<AccessTokenClaims, anyhow::Error> {
        self.validate(token)
            .map_err(|e| anyhow::anyhow!("Invalid access token: {}", e))
    }

    /// Validate and decode a refresh token
    pub fn validate_refresh_token(
        &self,
        token: &str,
    ) -> Result<RefreshTokenClaims, anyhow::Error> {
        self.validate(token)
            .map_err(|e| anyhow::anyhow!("Invalid refresh token: {}", e))
    }

    /// Signature, shape and expiry check. A token is dead from the second
    /// its `exp` is reached, so the library's leeway is disabled and the
    /// boundary re-checked here.
    fn validate<T>(&self, token: &str) -> Result<T, anyhow::Error>
    where
        T: DeserializeOwned + Expiring,
    {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub", "iat"]);

        let claims = decode::<T>(token, &self.decoding_key, &validation)?.claims;

        if Utc::now().timestamp() >= claims.exp() {
            return Err(anyhow::anyhow!("token expired"));
        }

        Ok(claims)
    }
}
