//! JWT claim decoding for session expiry checks.
//!
//! The client never holds the signing secret, so signatures are not
//! verified here; the server remains the authority on token validity. The
//! claims are only read to learn who the session belongs to and when it
//! stops being usable.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    #[error("malformed token: {0}")]
    Malformed(#[from] jsonwebtoken::errors::Error),
    #[error("token has no expiry claim")]
    MissingExpiry,
}

/// Claims the API puts in session tokens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    #[serde(default, alias = "_id", alias = "userId")]
    pub id: Option<String>,
    #[serde(default)]
    pub exp: Option<u64>,
    #[serde(default)]
    pub iat: Option<u64>,
}

/// Decode a token's claims without verifying its signature.
///
/// # Errors
///
/// Returns [`TokenError::Malformed`] when the token is not a decodable JWT.
pub fn decode_claims(token: &str) -> Result<TokenClaims, TokenError> {
    let data = jsonwebtoken::dangerous::insecure_decode::<TokenClaims>(token)?;
    Ok(data.claims)
}

/// Expiry of `token` in seconds since the Unix epoch.
///
/// # Errors
///
/// Returns a [`TokenError`] when the token is malformed or carries no `exp`.
pub fn expiry(token: &str) -> Result<u64, TokenError> {
    decode_claims(token)?.exp.ok_or(TokenError::MissingExpiry)
}

/// A token expiring at `exp` is unusable from that second on.
#[must_use]
pub fn is_expired_at(exp: u64, now: u64) -> bool {
    exp <= now
}

/// Current time in seconds since the Unix epoch.
#[must_use]
pub fn now_secs() -> u64 {
    let Ok(duration) = SystemTime::now().duration_since(UNIX_EPOCH) else {
        return 0;
    };
    duration.as_secs()
}
