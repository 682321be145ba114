use std::ops::{Deref, DerefMut};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use bytes::BytesMut;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use serde_json::Error as JsonError;
use tracing::{debug, warn};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::logging::pii::Redacted;
use crate::trace_ctx;

pub const DEFAULT_JSON_LIMIT: usize = 256 * 1024;

/// Maximum accepted JSON body, registered as app data. Falls back to
/// [`DEFAULT_JSON_LIMIT`] when absent.
#[derive(Debug, Clone, Copy)]
pub struct JsonLimit(pub usize);

/// JSON body extractor whose failures render as problem+json 400s with a
/// sanitized detail instead of actix's plain-text errors.
#[derive(Debug)]
pub struct ValidatedJson<T>(pub T);

impl<T> ValidatedJson<T> {
    pub fn into_inner(self) -> T {
        self.0
    }
}

impl<T> Deref for ValidatedJson<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for ValidatedJson<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> FromRequest for ValidatedJson<T>
where
    T: DeserializeOwned + 'static,
{
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let mut payload = payload.take();
        let limit = req
            .app_data::<JsonLimit>()
            .map_or(DEFAULT_JSON_LIMIT, |l| l.0);

        // Read before the future so no borrow of `req` crosses an await.
        let content_type = req
            .headers()
            .get("content-type")
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("")
            .to_string();

        Box::pin(async move {
            let trace_id = trace_ctx::trace_id();

            let mut body = BytesMut::new();
            while let Some(chunk) = payload.next().await {
                let chunk = chunk.map_err(|e| {
                    warn!(trace_id = %trace_id, error = %e, "Failed to read request body chunk");
                    AppError::bad_request(ErrorCode::BadRequest, "Failed to read request body")
                })?;
                if body.len() + chunk.len() > limit {
                    return Err(AppError::bad_request(
                        ErrorCode::BadRequest,
                        format!("Request body exceeds {limit} bytes"),
                    ));
                }
                body.extend_from_slice(&chunk);
            }

            let parsed = serde_json::from_slice::<T>(&body).map_err(|e| {
                debug!(
                    trace_id = %trace_id,
                    error = %Redacted(&e.to_string()),
                    content_type = %content_type,
                    body_size = body.len(),
                    "JSON parsing failed"
                );
                AppError::bad_request(ErrorCode::BadRequest, classify_json_error(&e))
            })?;

            Ok(ValidatedJson(parsed))
        })
    }
}

/// Detail text that never echoes body content back.
fn classify_json_error(error: &JsonError) -> String {
    match error.classify() {
        serde_json::error::Category::Syntax => {
            format!("Invalid JSON at line {}", error.line())
        }
        serde_json::error::Category::Eof => "Invalid JSON: unexpected end of input".to_string(),
        serde_json::error::Category::Data => {
            "Invalid JSON: wrong types or missing fields".to_string()
        }
        serde_json::error::Category::Io => "Invalid JSON: I/O error while reading body".to_string(),
    }
}
