//! Bearer token issuance and verification.
//!
//! Tokens are HS256 JWTs carrying only the user id, valid for 30 days.
//! Verification is stateless; revocation is out of scope.

use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use denfit_core::UserId;

use super::AuthError;

const TOKEN_LIFETIME_SECS: i64 = 30 * 24 * 60 * 60;

/// JWT claims embedded in every bearer token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject, the user id.
    pub sub: i32,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
}

/// Issue a signed bearer token for a user.
///
/// # Errors
///
/// Returns `AuthError::TokenInvalid` if signing fails.
pub fn issue_token(user_id: UserId, secret: &SecretString) -> Result<String, AuthError> {
    let now = Utc::now().timestamp();
    let claims = TokenClaims {
        sub: user_id.as_i32(),
        iat: now,
        exp: now + TOKEN_LIFETIME_SECS,
    };

    let key = EncodingKey::from_secret(secret.expose_secret().as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AuthError::TokenInvalid(format!("JWT encode: {e}")))
}

/// Decode and verify a bearer token, returning the user id it names.
///
/// # Errors
///
/// Returns `AuthError::TokenExpired` if past expiry, `AuthError::TokenInvalid`
/// for any other verification failure.
pub fn decode_token(token: &str, secret: &SecretString) -> Result<UserId, AuthError> {
    let key = DecodingKey::from_secret(secret.expose_secret().as_bytes());

    // Only `exp` can be required here: the registered-claim check treats
    // `sub` as a string, and ours is numeric. The typed struct already
    // guarantees sub and iat are present.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_required_spec_claims(&["exp"]);

    jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .map(|data| UserId::new(data.claims.sub))
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}
