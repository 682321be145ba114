//! ETag helpers for optimistic concurrency on ads.
//!
//! Ads carry a `lock_version` that is bumped on every owner mutation. The
//! detail endpoint exposes it as `ETag: "ad-{id}-v{version}"` and mutating
//! endpoints require the client to echo it back in `If-Match`.

use actix_web::http::header::IF_MATCH;
use actix_web::HttpRequest;

use crate::error::AppError;
use crate::errors::ErrorCode;

/// Format: `"ad-{id}-v{version}"` (quoted, as HTTP requires).
///
/// ```
/// # use bazaar_backend::http::etag::ad_etag;
/// assert_eq!(ad_etag(123, 5), r#""ad-123-v5""#);
/// ```
pub fn ad_etag(id: i64, version: i32) -> String {
    format!(r#""ad-{id}-v{version}""#)
}

/// Parse `(id, version)` out of an ad ETag. Surrounding quotes and a weak
/// `W/` prefix are tolerated.
pub fn parse_ad_etag(raw: &str) -> Result<(i64, i32), AppError> {
    let s = raw.trim();
    let s = s.strip_prefix("W/").unwrap_or(s).trim_matches('"');

    let malformed = || {
        AppError::bad_request(
            ErrorCode::InvalidHeader,
            format!("Invalid ETag format: expected \"ad-{{id}}-v{{version}}\", got: \"{s}\""),
        )
    };

    let rest = s.strip_prefix("ad-").ok_or_else(malformed)?;
    let (id, version) = rest.rsplit_once("-v").ok_or_else(malformed)?;
    let id = id.parse::<i64>().map_err(|_| malformed())?;
    let version = version.parse::<i32>().map_err(|_| malformed())?;

    Ok((id, version))
}

/// Read the lock version the client expects from `If-Match`.
///
/// Missing header is 428; an ETag for a different ad is treated as stale (412).
pub fn expected_version(req: &HttpRequest, ad_id: i64) -> Result<i32, AppError> {
    let header = req.headers().get(IF_MATCH).ok_or_else(|| {
        AppError::precondition_required("If-Match header with the ad ETag is required")
    })?;

    let raw = header.to_str().map_err(|_| {
        AppError::bad_request(ErrorCode::InvalidHeader, "If-Match is not valid ASCII")
    })?;

    let (id, version) = parse_ad_etag(raw)?;
    if id != ad_id {
        return Err(AppError::precondition_failed(
            ErrorCode::OptimisticLock,
            format!("ETag refers to ad {id}, not ad {ad_id}"),
        ));
    }

    Ok(version)
}
