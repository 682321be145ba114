use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::http::header::HeaderMap;
use actix_web::{FromRequest, HttpRequest};

use crate::error::AppError;
use crate::errors::ErrorCode;

pub const DEVICE_TOKEN_HEADER: &str = "x-device-token";
pub const DEVICE_TOKEN_MIN_LEN: usize = 16;
pub const DEVICE_TOKEN_MAX_LEN: usize = 64;

fn is_valid_device_token(token: &str) -> bool {
    (DEVICE_TOKEN_MIN_LEN..=DEVICE_TOKEN_MAX_LEN).contains(&token.len())
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// `X-Device-Token` if sent. A present but malformed token is an error.
pub fn parse_device_token(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(DEVICE_TOKEN_HEADER) else {
        return Ok(None);
    };

    let token = value.to_str().ok().unwrap_or_default();
    check_device_token(token).map(Some)
}

/// Validate a device token from any source (header or login body).
pub fn check_device_token(raw: &str) -> Result<String, AppError> {
    let token = raw.trim();
    if !is_valid_device_token(token) {
        return Err(AppError::bad_request(
            ErrorCode::InvalidDeviceToken,
            format!(
                "Device token must be {DEVICE_TOKEN_MIN_LEN}-{DEVICE_TOKEN_MAX_LEN} characters of [A-Za-z0-9_-]"
            ),
        ));
    }
    Ok(token.to_string())
}

/// Required anonymous device identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceToken(pub String);

impl FromRequest for DeviceToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse_device_token(req.headers()).and_then(|token| {
            token.map(DeviceToken).ok_or_else(|| {
                AppError::bad_request(ErrorCode::InvalidDeviceToken, "X-Device-Token header is required")
            })
        }))
    }
}

/// Optional device identity; `None` when the header is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaybeDeviceToken(pub Option<String>);

impl FromRequest for MaybeDeviceToken {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse_device_token(req.headers()).map(MaybeDeviceToken))
    }
}
