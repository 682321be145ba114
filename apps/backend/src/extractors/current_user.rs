use actix_web::dev::Payload;
use actix_web::{web, FromRequest, HttpMessage, HttpRequest};
use serde::{Deserialize, Serialize};

use super::bearer::parse_bearer;
use crate::auth::claims::BackendClaims;
use crate::auth::jwt::verify_access_token;
use crate::db::require_db;
use crate::db::txn::SharedTxn;
use crate::error::AppError;
use crate::logging::security;
use crate::repos::users;
use crate::state::app_state::AppState;

/// Signed-in user resolved from the bearer token.
///
/// Claims are read from request extensions when `JwtExtract` already ran;
/// otherwise the `Authorization` header is verified here, so the extractor also
/// works on public scopes.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: i64,
    pub sub: String,
    pub email: String,
}

pub(crate) fn app_state(req: &HttpRequest) -> Result<web::Data<AppState>, AppError> {
    req.app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| AppError::internal("AppState not available"))
}

/// Verified claims for this request, or `None` when no bearer was sent.
pub(crate) fn request_claims(req: &HttpRequest) -> Result<Option<BackendClaims>, AppError> {
    if let Some(claims) = req.extensions().get::<BackendClaims>() {
        return Ok(Some(claims.clone()));
    }

    let Some(token) = parse_bearer(req.headers())? else {
        return Ok(None);
    };

    let state = app_state(req)?;
    let claims = verify_access_token(&token, &state.security).inspect_err(|e| {
        security::token_rejected(e.code().as_str());
    })?;
    Ok(Some(claims.into()))
}

pub(crate) async fn resolve(req: &HttpRequest, claims: BackendClaims) -> Result<CurrentUser, AppError> {
    let state = app_state(req)?;

    let user = if let Some(shared_txn) = SharedTxn::from_req(req) {
        users::find_user_by_sub(shared_txn.transaction(), &claims.sub).await?
    } else {
        let db = require_db(&state)?;
        users::find_user_by_sub(db, &claims.sub).await?
    };

    let user = user.ok_or_else(AppError::forbidden_user_not_found)?;

    Ok(CurrentUser {
        id: user.id,
        sub: claims.sub,
        email: claims.email,
    })
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = std::pin::Pin<Box<dyn std::future::Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let req = req.clone();

        Box::pin(async move {
            let claims = request_claims(&req)?.ok_or_else(AppError::unauthorized_missing_bearer)?;
            resolve(&req, claims).await
        })
    }
}
