mod error_shape;
mod health;
mod rate_limiting;
mod security_headers;
