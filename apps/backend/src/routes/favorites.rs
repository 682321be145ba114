use actix_web::{web, HttpRequest};
use serde::Serialize;

use super::ads::AdSummary;
use crate::db::txn::with_txn;
use crate::error::AppError;
use crate::extractors::{AdId, CurrentUser, DeviceToken, FavoriteOwner};
use crate::services::favorites as favorite_service;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct FavoritesResponse {
    items: Vec<AdSummary>,
}

#[derive(Debug, Serialize)]
struct FavoriteIdsResponse {
    ad_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
struct FavoriteStateResponse {
    ad_id: i64,
    is_favorite: bool,
}

#[derive(Debug, Serialize)]
struct MergeResponse {
    merged: u64,
}

/// GET /api/favorites, newest favorite first.
async fn list_favorites(
    http_req: HttpRequest,
    FavoriteOwner(owner): FavoriteOwner,
    app_state: web::Data<AppState>,
) -> Result<web::Json<FavoritesResponse>, AppError> {
    let ads = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { favorite_service::list(txn, &owner).await })
    })
    .await?;

    Ok(web::Json(FavoritesResponse {
        items: ads.into_iter().map(AdSummary::from).collect(),
    }))
}

/// GET /api/favorites/ids
async fn favorite_ids(
    http_req: HttpRequest,
    FavoriteOwner(owner): FavoriteOwner,
    app_state: web::Data<AppState>,
) -> Result<web::Json<FavoriteIdsResponse>, AppError> {
    let ad_ids = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { favorite_service::ids(txn, &owner).await })
    })
    .await?;

    Ok(web::Json(FavoriteIdsResponse { ad_ids }))
}

/// PUT /api/favorites/{ad_id}
async fn add_favorite(
    http_req: HttpRequest,
    ad_id: AdId,
    FavoriteOwner(owner): FavoriteOwner,
    app_state: web::Data<AppState>,
) -> Result<web::Json<FavoriteStateResponse>, AppError> {
    with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { favorite_service::add(txn, ad_id.0, &owner).await })
    })
    .await?;

    Ok(web::Json(FavoriteStateResponse {
        ad_id: ad_id.0,
        is_favorite: true,
    }))
}

/// DELETE /api/favorites/{ad_id}
async fn remove_favorite(
    http_req: HttpRequest,
    ad_id: AdId,
    FavoriteOwner(owner): FavoriteOwner,
    app_state: web::Data<AppState>,
) -> Result<web::Json<FavoriteStateResponse>, AppError> {
    with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { favorite_service::remove(txn, ad_id.0, &owner).await })
    })
    .await?;

    Ok(web::Json(FavoriteStateResponse {
        ad_id: ad_id.0,
        is_favorite: false,
    }))
}

/// POST /api/favorites/{ad_id}/toggle
async fn toggle_favorite(
    http_req: HttpRequest,
    ad_id: AdId,
    FavoriteOwner(owner): FavoriteOwner,
    app_state: web::Data<AppState>,
) -> Result<web::Json<FavoriteStateResponse>, AppError> {
    let is_favorite = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { favorite_service::toggle(txn, ad_id.0, &owner).await })
    })
    .await?;

    Ok(web::Json(FavoriteStateResponse {
        ad_id: ad_id.0,
        is_favorite,
    }))
}

/// POST /api/favorites/merge (bearer + `X-Device-Token`)
async fn merge_favorites(
    http_req: HttpRequest,
    user: CurrentUser,
    DeviceToken(token): DeviceToken,
    app_state: web::Data<AppState>,
) -> Result<web::Json<MergeResponse>, AppError> {
    let merged = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { favorite_service::merge_device(txn, &token, user.id).await })
    })
    .await?;

    Ok(web::Json(MergeResponse { merged }))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("").route(web::get().to(list_favorites)))
        .service(web::resource("/ids").route(web::get().to(favorite_ids)))
        .service(web::resource("/merge").route(web::post().to(merge_favorites)))
        .service(
            web::resource("/{ad_id}")
                .route(web::put().to(add_favorite))
                .route(web::delete().to(remove_favorite)),
        )
        .service(web::resource("/{ad_id}/toggle").route(web::post().to(toggle_favorite)));
}
