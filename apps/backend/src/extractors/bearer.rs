use actix_web::http::header::{HeaderMap, AUTHORIZATION};

use crate::error::AppError;

/// Pull the token out of `Authorization: Bearer <token>`.
///
/// Returns `Ok(None)` when the header is absent so callers can decide whether
/// authentication is optional. A header that is present but malformed is an error.
pub fn parse_bearer(headers: &HeaderMap) -> Result<Option<String>, AppError> {
    let Some(value) = headers.get(AUTHORIZATION) else {
        return Ok(None);
    };

    let value = value
        .to_str()
        .map_err(|_| AppError::unauthorized_missing_bearer())?;

    let mut parts = value.split_whitespace();
    match (parts.next(), parts.next(), parts.next()) {
        (Some(scheme), Some(token), None) if scheme.eq_ignore_ascii_case("Bearer") => {
            Ok(Some(token.to_string()))
        }
        _ => Err(AppError::unauthorized_missing_bearer()),
    }
}
