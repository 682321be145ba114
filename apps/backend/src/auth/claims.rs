//! Claims carried through request extensions once a bearer token is verified.

use serde::{Deserialize, Serialize};

use super::jwt::Claims;

/// Inserted by `JwtExtract`; extractors read it instead of re-verifying.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct BackendClaims {
    /// External user identifier (users.sub)
    pub sub: String,
    pub email: String,
    /// Expiry (seconds since epoch)
    pub exp: i64,
}

impl From<Claims> for BackendClaims {
    fn from(claims: Claims) -> Self {
        Self {
            sub: claims.sub,
            email: claims.email,
            exp: claims.exp,
        }
    }
}
