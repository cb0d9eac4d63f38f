//! Stateless session tokens (HS256 JWT).
//!
//! The token is the whole session: no server-side record exists, so logout is
//! purely a cookie deletion and issued tokens stay valid until `exp`.

use super::now_unix;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id.
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies session tokens with a single shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_seconds: i64,
}

impl TokenIssuer {
    #[must_use]
    pub fn new(secret: &SecretString, ttl_seconds: i64) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl_seconds,
        }
    }

    /// Issue a token for the given user, valid for the configured TTL.
    ///
    /// # Errors
    /// Returns an error if JWT encoding fails.
    pub fn issue(&self, user_id: Uuid) -> anyhow::Result<String> {
        let now = now_unix();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now,
            exp: now + self.ttl_seconds,
        };
        Ok(encode(&Header::default(), &claims, &self.encoding)?)
    }

    /// Verify signature and expiry, returning the user id carried in `sub`.
    ///
    /// Any failure (bad signature, expired, malformed sub) yields `None`; the
    /// caller maps that to a single "login again" response.
    #[must_use]
    pub fn verify(&self, token: &str) -> Option<Uuid> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation).ok()?;
        Uuid::parse_str(&data.claims.sub).ok()
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}
