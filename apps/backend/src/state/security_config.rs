use std::time::Duration;

use jsonwebtoken::Algorithm;

/// Browsing sessions outlive a typical visit; sellers return after days.
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: Vec<u8>,
    pub algorithm: Algorithm,
    pub token_ttl: Duration,
}

impl SecurityConfig {
    pub fn new(jwt_secret: impl Into<Vec<u8>>) -> Self {
        Self {
            jwt_secret: jwt_secret.into(),
            algorithm: Algorithm::HS256,
            token_ttl: DEFAULT_TOKEN_TTL,
        }
    }

    pub fn with_token_ttl(mut self, ttl: Duration) -> Self {
        self.token_ttl = ttl;
        self
    }
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self::new(b"default_secret_for_tests_only".to_vec())
    }
}
