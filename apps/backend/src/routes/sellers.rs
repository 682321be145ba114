use actix_web::{web, HttpRequest};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::extractors::{CurrentUser, ValidatedJson};
use crate::repos::ratings::RatingSummary;
use crate::services::sellers::{self as seller_service, SellerProfile};
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct SellerProfileResponse {
    id: i64,
    display_name: String,
    city_label: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    member_since: OffsetDateTime,
    rating: RatingSummary,
    active_ads: u64,
}

impl From<SellerProfile> for SellerProfileResponse {
    fn from(profile: SellerProfile) -> Self {
        Self {
            id: profile.user.id,
            display_name: profile.user.display_name,
            city_label: profile.user.city_label,
            member_since: profile.user.created_at,
            rating: profile.rating,
            active_ads: profile.active_ads,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RateRequest {
    score: i64,
}

#[derive(Debug, Serialize)]
struct RateResponse {
    seller_id: i64,
    score: i64,
    rating: RatingSummary,
}

/// GET /api/sellers/{seller_id}
async fn get_seller(
    http_req: HttpRequest,
    path: web::Path<i64>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<SellerProfileResponse>, AppError> {
    let seller_id = path.into_inner();

    let profile = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { seller_service::seller_profile(txn, seller_id).await })
    })
    .await?;

    Ok(web::Json(profile.into()))
}

/// PUT /api/sellers/{seller_id}/rating
async fn rate_seller(
    http_req: HttpRequest,
    path: web::Path<i64>,
    user: CurrentUser,
    body: ValidatedJson<RateRequest>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<RateResponse>, AppError> {
    let seller_id = path.into_inner();
    let score = body.score;

    let rating = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { seller_service::rate_seller(txn, seller_id, user.id, score).await })
    })
    .await?;

    Ok(web::Json(RateResponse {
        seller_id,
        score,
        rating,
    }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/{seller_id}").route(web::get().to(get_seller)))
        .service(web::resource("/{seller_id}/rating").route(web::put().to(rate_seller)));
}
