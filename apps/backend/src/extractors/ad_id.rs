use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Positive ad id from the `{ad_id}` path segment. Existence is checked by the
/// service that loads the ad.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct AdId(pub i64);

fn parse_ad_id(raw: Option<&str>) -> Result<AdId, AppError> {
    let raw = raw.ok_or_else(|| {
        AppError::bad_request(ErrorCode::InvalidAdId, "Missing ad_id parameter")
    })?;

    let id = raw.parse::<i64>().map_err(|_| {
        AppError::bad_request(ErrorCode::InvalidAdId, format!("Invalid ad id: {raw}"))
    })?;

    if id <= 0 {
        return Err(AppError::bad_request(
            ErrorCode::InvalidAdId,
            format!("Ad id must be positive, got: {id}"),
        ));
    }

    Ok(AdId(id))
}

impl FromRequest for AdId {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        ready(parse_ad_id(req.match_info().get("ad_id")))
    }
}
