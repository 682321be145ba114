use std::time::{SystemTime, UNIX_EPOCH};

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::state::security_config::SecurityConfig;

/// Claims included in backend-issued access tokens.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// External user identifier (users.sub)
    pub sub: String,
    pub email: String,
    /// Issued-at (seconds since epoch)
    pub iat: i64,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

/// Mint an access token valid for `security.token_ttl` from `now`.
pub fn mint_access_token(
    sub: &str,
    email: &str,
    now: SystemTime,
    security: &SecurityConfig,
) -> Result<String, AppError> {
    let iat = now
        .duration_since(UNIX_EPOCH)
        .map_err(|_| AppError::internal("system clock is before the unix epoch"))?
        .as_secs() as i64;
    let exp = iat + security.token_ttl.as_secs() as i64;

    let claims = Claims {
        sub: sub.to_string(),
        email: email.to_string(),
        iat,
        exp,
    };

    encode(
        &Header::new(security.algorithm),
        &claims,
        &EncodingKey::from_secret(&security.jwt_secret),
    )
    .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
}

/// Verify a token and return its claims.
///
/// Expired tokens map to `UNAUTHORIZED_EXPIRED_JWT`; every other decode failure
/// (signature, algorithm, malformed) maps to `UNAUTHORIZED_INVALID_JWT`.
pub fn verify_access_token(token: &str, security: &SecurityConfig) -> Result<Claims, AppError> {
    let validation = Validation::new(security.algorithm);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(&security.jwt_secret),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::unauthorized_expired_jwt(),
        _ => AppError::unauthorized_invalid_jwt(),
    })
}
