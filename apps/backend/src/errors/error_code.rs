//! Error codes for the Bazaar backend API.
//!
//! Every code is SCREAMING_SNAKE_CASE and maps 1:1 to the string that appears
//! in the `code` field of problem responses. Add new codes here; never pass
//! ad-hoc strings as error codes.

use core::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Authentication & Authorization
    UnauthorizedMissingBearer,
    UnauthorizedInvalidJwt,
    UnauthorizedExpiredJwt,
    /// Neither a bearer token nor a device token identified the caller
    UnauthorizedNoOwner,
    Forbidden,
    ForbiddenUserNotFound,
    NotAdOwner,

    // Request Validation
    ValidationError,
    BadRequest,
    InvalidHeader,
    InvalidDeviceToken,
    InvalidAdId,
    InvalidEmail,
    InvalidProviderSub,
    InvalidTitle,
    InvalidDescription,
    InvalidPrice,
    InvalidPriceRange,
    InvalidCurrency,
    InvalidCategory,
    InvalidSubcategory,
    UnknownCity,
    InvalidPhotos,
    InvalidDisplayName,
    InvalidPhone,
    InvalidCoordinates,
    InvalidPagination,
    InvalidRating,
    CannotRateSelf,
    PreconditionRequired,

    // Resource Not Found
    AdNotFound,
    UserNotFound,
    SellerNotFound,
    CityNotFound,
    NotFound,

    // Business Logic Conflicts
    ProviderSubMismatch,
    UniqueEmail,
    /// Stale `If-Match` (HTTP 412)
    OptimisticLock,
    Conflict,

    // System Errors
    DbError,
    DbUnavailable,
    DbTimeout,
    UniqueViolation,
    FkViolation,
    CheckViolation,
    DataCorruption,
    Internal,
    ConfigError,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        Self::UnauthorizedMissingBearer,
        Self::UnauthorizedInvalidJwt,
        Self::UnauthorizedExpiredJwt,
        Self::UnauthorizedNoOwner,
        Self::Forbidden,
        Self::ForbiddenUserNotFound,
        Self::NotAdOwner,
        Self::ValidationError,
        Self::BadRequest,
        Self::InvalidHeader,
        Self::InvalidDeviceToken,
        Self::InvalidAdId,
        Self::InvalidEmail,
        Self::InvalidProviderSub,
        Self::InvalidTitle,
        Self::InvalidDescription,
        Self::InvalidPrice,
        Self::InvalidPriceRange,
        Self::InvalidCurrency,
        Self::InvalidCategory,
        Self::InvalidSubcategory,
        Self::UnknownCity,
        Self::InvalidPhotos,
        Self::InvalidDisplayName,
        Self::InvalidPhone,
        Self::InvalidCoordinates,
        Self::InvalidPagination,
        Self::InvalidRating,
        Self::CannotRateSelf,
        Self::PreconditionRequired,
        Self::AdNotFound,
        Self::UserNotFound,
        Self::SellerNotFound,
        Self::CityNotFound,
        Self::NotFound,
        Self::ProviderSubMismatch,
        Self::UniqueEmail,
        Self::OptimisticLock,
        Self::Conflict,
        Self::DbError,
        Self::DbUnavailable,
        Self::DbTimeout,
        Self::UniqueViolation,
        Self::FkViolation,
        Self::CheckViolation,
        Self::DataCorruption,
        Self::Internal,
        Self::ConfigError,
    ];

    /// The exact string that appears in HTTP responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnauthorizedMissingBearer => "UNAUTHORIZED_MISSING_BEARER",
            Self::UnauthorizedInvalidJwt => "UNAUTHORIZED_INVALID_JWT",
            Self::UnauthorizedExpiredJwt => "UNAUTHORIZED_EXPIRED_JWT",
            Self::UnauthorizedNoOwner => "UNAUTHORIZED_NO_OWNER",
            Self::Forbidden => "FORBIDDEN",
            Self::ForbiddenUserNotFound => "FORBIDDEN_USER_NOT_FOUND",
            Self::NotAdOwner => "NOT_AD_OWNER",

            Self::ValidationError => "VALIDATION_ERROR",
            Self::BadRequest => "BAD_REQUEST",
            Self::InvalidHeader => "INVALID_HEADER",
            Self::InvalidDeviceToken => "INVALID_DEVICE_TOKEN",
            Self::InvalidAdId => "INVALID_AD_ID",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidProviderSub => "INVALID_PROVIDER_SUB",
            Self::InvalidTitle => "INVALID_TITLE",
            Self::InvalidDescription => "INVALID_DESCRIPTION",
            Self::InvalidPrice => "INVALID_PRICE",
            Self::InvalidPriceRange => "INVALID_PRICE_RANGE",
            Self::InvalidCurrency => "INVALID_CURRENCY",
            Self::InvalidCategory => "INVALID_CATEGORY",
            Self::InvalidSubcategory => "INVALID_SUBCATEGORY",
            Self::UnknownCity => "UNKNOWN_CITY",
            Self::InvalidPhotos => "INVALID_PHOTOS",
            Self::InvalidDisplayName => "INVALID_DISPLAY_NAME",
            Self::InvalidPhone => "INVALID_PHONE",
            Self::InvalidCoordinates => "INVALID_COORDINATES",
            Self::InvalidPagination => "INVALID_PAGINATION",
            Self::InvalidRating => "INVALID_RATING",
            Self::CannotRateSelf => "CANNOT_RATE_SELF",
            Self::PreconditionRequired => "PRECONDITION_REQUIRED",

            Self::AdNotFound => "AD_NOT_FOUND",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::SellerNotFound => "SELLER_NOT_FOUND",
            Self::CityNotFound => "CITY_NOT_FOUND",
            Self::NotFound => "NOT_FOUND",

            Self::ProviderSubMismatch => "PROVIDER_SUB_MISMATCH",
            Self::UniqueEmail => "UNIQUE_EMAIL",
            Self::OptimisticLock => "OPTIMISTIC_LOCK",
            Self::Conflict => "CONFLICT",

            Self::DbError => "DB_ERROR",
            Self::DbUnavailable => "DB_UNAVAILABLE",
            Self::DbTimeout => "DB_TIMEOUT",
            Self::UniqueViolation => "UNIQUE_VIOLATION",
            Self::FkViolation => "FK_VIOLATION",
            Self::CheckViolation => "CHECK_VIOLATION",
            Self::DataCorruption => "DATA_CORRUPTION",
            Self::Internal => "INTERNAL",
            Self::ConfigError => "CONFIG_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
