use std::time::SystemTime;

use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::mint_access_token;
use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::extractors::device_token::check_device_token;
use crate::extractors::ValidatedJson;
use crate::services::{favorites, users};
use crate::state::app_state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    pub name: Option<String>,
    #[serde(default)]
    pub provider_sub: String,
    /// Anonymous identity whose favorites move onto the account
    pub device_token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user_id: i64,
    pub merged_favorites: u64,
}

/// POST /api/auth/login
///
/// Called by the frontend after the identity provider callback. Creates or
/// reuses the user for `email`, migrates device favorites, returns a JWT.
async fn login(
    http_req: HttpRequest,
    body: ValidatedJson<LoginRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let LoginRequest {
        email,
        name,
        provider_sub,
        device_token,
    } = body.into_inner();
    let device_token = device_token.as_deref().map(check_device_token).transpose()?;

    let (user, email, merged_favorites) = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move {
            let (user, email) =
                users::ensure_user(txn, &email, name.as_deref(), &provider_sub).await?;
            let merged = match device_token {
                Some(token) => favorites::merge_device(txn, &token, user.id).await?,
                None => 0,
            };
            Ok((user, email, merged))
        })
    })
    .await?;

    let token = mint_access_token(&user.sub, &email, SystemTime::now(), &app_state.security)?;

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        user_id: user.id,
        merged_favorites,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/login").route(web::post().to(login)));
}
