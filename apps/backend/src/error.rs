use actix_web::error::ResponseError;
use actix_web::http::{header, StatusCode};
use actix_web::HttpResponse;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::errors::ErrorCode;
use crate::trace_ctx;

/// RFC 7807 body. `code` is the stable machine-readable contract.
#[derive(Debug, Serialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {detail}")]
    Validation { code: ErrorCode, detail: String },
    #[error("Bad request: {detail}")]
    BadRequest { code: ErrorCode, detail: String },
    #[error("Not found: {detail}")]
    NotFound { code: ErrorCode, detail: String },
    #[error("Unauthorized: {code}")]
    Unauthorized { code: ErrorCode },
    #[error("Forbidden: {detail}")]
    Forbidden { code: ErrorCode, detail: String },
    #[error("Conflict: {detail}")]
    Conflict { code: ErrorCode, detail: String },
    #[error("Precondition failed: {detail}")]
    PreconditionFailed { code: ErrorCode, detail: String },
    #[error("Precondition required: {detail}")]
    PreconditionRequired { detail: String },
    #[error("Database error: {detail}")]
    Db { code: ErrorCode, detail: String },
    #[error("Database unavailable")]
    DbUnavailable,
    #[error("Timeout: {detail}")]
    Timeout { detail: String },
    #[error("Internal error: {detail}")]
    Internal { detail: String },
    #[error("Configuration error: {detail}")]
    Config { detail: String },
}

impl AppError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::Validation { code, .. }
            | AppError::BadRequest { code, .. }
            | AppError::NotFound { code, .. }
            | AppError::Unauthorized { code }
            | AppError::Forbidden { code, .. }
            | AppError::Conflict { code, .. }
            | AppError::PreconditionFailed { code, .. }
            | AppError::Db { code, .. } => *code,
            AppError::PreconditionRequired { .. } => ErrorCode::PreconditionRequired,
            AppError::DbUnavailable => ErrorCode::DbUnavailable,
            AppError::Timeout { .. } => ErrorCode::DbTimeout,
            AppError::Internal { .. } => ErrorCode::Internal,
            AppError::Config { .. } => ErrorCode::ConfigError,
        }
    }

    fn detail(&self) -> String {
        match self {
            AppError::Validation { detail, .. }
            | AppError::BadRequest { detail, .. }
            | AppError::NotFound { detail, .. }
            | AppError::Forbidden { detail, .. }
            | AppError::Conflict { detail, .. }
            | AppError::PreconditionFailed { detail, .. }
            | AppError::PreconditionRequired { detail }
            | AppError::Db { detail, .. }
            | AppError::Timeout { detail } => detail.clone(),
            AppError::Unauthorized { code } => match code {
                ErrorCode::UnauthorizedMissingBearer => "Missing or malformed Bearer token",
                ErrorCode::UnauthorizedInvalidJwt => "Invalid JWT",
                ErrorCode::UnauthorizedExpiredJwt => "Token expired",
                ErrorCode::UnauthorizedNoOwner => {
                    "Sign in or send an X-Device-Token header to use favorites"
                }
                _ => "Authentication required",
            }
            .to_string(),
            AppError::DbUnavailable => "Database unavailable".to_string(),
            // Never leak internals to clients; the detail is logged instead.
            AppError::Internal { .. } | AppError::Config { .. } => {
                "An internal error occurred".to_string()
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } | AppError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AppError::Conflict { .. } => StatusCode::CONFLICT,
            AppError::PreconditionFailed { .. } => StatusCode::PRECONDITION_FAILED,
            AppError::PreconditionRequired { .. } => StatusCode::PRECONDITION_REQUIRED,
            AppError::DbUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            AppError::Db { .. } | AppError::Internal { .. } | AppError::Config { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn invalid(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Validation {
            code,
            detail: detail.into(),
        }
    }

    pub fn bad_request(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::BadRequest {
            code,
            detail: detail.into(),
        }
    }

    pub fn not_found(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::NotFound {
            code,
            detail: detail.into(),
        }
    }

    pub fn unauthorized_missing_bearer() -> Self {
        Self::Unauthorized {
            code: ErrorCode::UnauthorizedMissingBearer,
        }
    }

    pub fn unauthorized_invalid_jwt() -> Self {
        Self::Unauthorized {
            code: ErrorCode::UnauthorizedInvalidJwt,
        }
    }

    pub fn unauthorized_expired_jwt() -> Self {
        Self::Unauthorized {
            code: ErrorCode::UnauthorizedExpiredJwt,
        }
    }

    pub fn unauthorized_no_owner() -> Self {
        Self::Unauthorized {
            code: ErrorCode::UnauthorizedNoOwner,
        }
    }

    pub fn forbidden(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Forbidden {
            code,
            detail: detail.into(),
        }
    }

    pub fn forbidden_user_not_found() -> Self {
        Self::forbidden(ErrorCode::ForbiddenUserNotFound, "User not found in database")
    }

    pub fn conflict(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::Conflict {
            code,
            detail: detail.into(),
        }
    }

    pub fn precondition_failed(code: ErrorCode, detail: impl Into<String>) -> Self {
        Self::PreconditionFailed {
            code,
            detail: detail.into(),
        }
    }

    pub fn precondition_required(detail: impl Into<String>) -> Self {
        Self::PreconditionRequired {
            detail: detail.into(),
        }
    }

    pub fn db(detail: impl Into<String>) -> Self {
        Self::Db {
            code: ErrorCode::DbError,
            detail: detail.into(),
        }
    }

    pub fn db_unavailable() -> Self {
        Self::DbUnavailable
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }

    pub fn config(detail: impl Into<String>) -> Self {
        Self::Config {
            detail: detail.into(),
        }
    }

    fn humanize_code(code: &str) -> String {
        code.split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    None => String::new(),
                    Some(first) => {
                        first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                    }
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(kind, detail) => {
                let code = match kind {
                    ValidationKind::Title => ErrorCode::InvalidTitle,
                    ValidationKind::Description => ErrorCode::InvalidDescription,
                    ValidationKind::Price => ErrorCode::InvalidPrice,
                    ValidationKind::PriceRange => ErrorCode::InvalidPriceRange,
                    ValidationKind::Currency => ErrorCode::InvalidCurrency,
                    ValidationKind::Category => ErrorCode::InvalidCategory,
                    ValidationKind::Subcategory => ErrorCode::InvalidSubcategory,
                    ValidationKind::City => ErrorCode::UnknownCity,
                    ValidationKind::Photos => ErrorCode::InvalidPhotos,
                    ValidationKind::DisplayName => ErrorCode::InvalidDisplayName,
                    ValidationKind::Phone => ErrorCode::InvalidPhone,
                    ValidationKind::Coordinates => ErrorCode::InvalidCoordinates,
                    ValidationKind::Pagination => ErrorCode::InvalidPagination,
                    ValidationKind::Rating => ErrorCode::InvalidRating,
                    ValidationKind::SelfRating => ErrorCode::CannotRateSelf,
                    ValidationKind::Email => ErrorCode::InvalidEmail,
                    ValidationKind::ProviderSub => ErrorCode::InvalidProviderSub,
                    _ => ErrorCode::ValidationError,
                };
                AppError::invalid(code, detail)
            }
            DomainError::Forbidden(detail) => AppError::forbidden(ErrorCode::NotAdOwner, detail),
            DomainError::Conflict(kind, detail) => match kind {
                ConflictKind::OptimisticLock => {
                    AppError::precondition_failed(ErrorCode::OptimisticLock, detail)
                }
                ConflictKind::ProviderSubMismatch => {
                    AppError::conflict(ErrorCode::ProviderSubMismatch, detail)
                }
                ConflictKind::UniqueEmail => AppError::conflict(ErrorCode::UniqueEmail, detail),
                ConflictKind::Other(ref name) if name == "Unique" => {
                    AppError::conflict(ErrorCode::UniqueViolation, detail)
                }
                _ => AppError::conflict(ErrorCode::Conflict, detail),
            },
            DomainError::NotFound(kind, detail) => {
                let code = match kind {
                    NotFoundKind::Ad => ErrorCode::AdNotFound,
                    NotFoundKind::User => ErrorCode::UserNotFound,
                    NotFoundKind::Seller => ErrorCode::SellerNotFound,
                    NotFoundKind::City => ErrorCode::CityNotFound,
                    _ => ErrorCode::NotFound,
                };
                AppError::not_found(code, detail)
            }
            DomainError::Infra(kind, detail) => match kind {
                InfraErrorKind::DbUnavailable => AppError::DbUnavailable,
                InfraErrorKind::Timeout => AppError::Timeout { detail },
                InfraErrorKind::DataCorruption => AppError::Db {
                    code: ErrorCode::DataCorruption,
                    detail,
                },
                _ => AppError::db(detail),
            },
        }
    }
}

impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        AppError::from(crate::infra::db_errors::map_db_err(e))
    }
}

impl From<db_infra::DbInfraError> for AppError {
    fn from(e: db_infra::DbInfraError) -> Self {
        AppError::config(e.to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status();
        let code = self.code().as_str();
        let trace_id = trace_ctx::trace_id();

        if status.is_server_error() {
            error!(trace_id = %trace_id, code, error = %self, "request failed");
        }

        let problem = ProblemDetails {
            type_: format!("https://bazaar.example/errors/{code}"),
            title: Self::humanize_code(code),
            status: status.as_u16(),
            detail: self.detail(),
            code: code.to_string(),
            trace_id: trace_id.clone(),
        };

        let mut builder = HttpResponse::build(status);
        builder
            .content_type("application/problem+json")
            .insert_header(("x-trace-id", trace_id));

        if status == StatusCode::UNAUTHORIZED {
            builder.insert_header((header::WWW_AUTHENTICATE, "Bearer"));
        }
        if status == StatusCode::SERVICE_UNAVAILABLE {
            builder.insert_header((header::RETRY_AFTER, "1"));
        }

        builder.json(problem)
    }
}
