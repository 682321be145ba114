use actix_web::{web, HttpRequest};
use serde::{Deserialize, Serialize};
use serde_with::rust::double_option;
use time::OffsetDateTime;

use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::repos::users::User;
use crate::services::users::{self as user_service, ProfilePatch};
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct MeResponse {
    id: i64,
    email: Option<String>,
    display_name: String,
    phone: Option<String>,
    city_label: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    member_since: OffsetDateTime,
}

impl MeResponse {
    fn new(user: User, email: Option<String>) -> Self {
        Self {
            id: user.id,
            email,
            display_name: user.display_name,
            phone: user.phone,
            city_label: user.city_label,
            member_since: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UpdateMeRequest {
    display_name: Option<String>,
    #[serde(default, with = "double_option")]
    phone: Option<Option<String>>,
    #[serde(default, with = "double_option")]
    city_label: Option<Option<String>>,
}

/// GET /api/me
async fn get_me(
    http_req: HttpRequest,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<web::Json<MeResponse>, AppError> {
    let (profile, email) = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { user_service::get_profile(txn, user.id).await })
    })
    .await?;

    Ok(web::Json(MeResponse::new(profile, email)))
}

/// PATCH /api/me
async fn update_me(
    http_req: HttpRequest,
    user: CurrentUser,
    body: ValidatedJson<UpdateMeRequest>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<MeResponse>, AppError> {
    let body = body.into_inner();
    let patch = ProfilePatch {
        display_name: body.display_name,
        phone: body.phone,
        city_label: body.city_label,
    };
    let cities = app_state.cities.clone();

    let (profile, email) = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move {
            user_service::update_profile(txn, user.id, patch, &cities).await?;
            user_service::get_profile(txn, user.id).await
        })
    })
    .await?;

    Ok(web::Json(MeResponse::new(profile, email)))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(get_me))
            .route(web::patch().to(update_me)),
    );
}
