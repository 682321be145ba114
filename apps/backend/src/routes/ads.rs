//! Ad routes: public listing and detail, owner-only mutations.

use actix_web::http::header::{ETAG, LOCATION};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::db::txn::with_txn;
use crate::domain::ad_rules::{AdPatch, RawAd};
use crate::domain::listing::{ListingFilter, ListingParams, Page};
use crate::error::AppError;
use crate::extractors::{AdId, CurrentUser, MaybeDeviceToken, MaybeUser, ValidatedJson};
use crate::http::etag::{ad_etag, expected_version};
use crate::repos::ads::{Ad, AdStatus};
use crate::repos::users::User;
use crate::services::ads::{self as ad_service, AdDetail, SellerContact, Viewer};
use crate::state::app_state::AppState;

/// Card shown in listings and favorites.
#[derive(Debug, Serialize)]
pub struct AdSummary {
    pub id: i64,
    pub title: String,
    pub price: Option<i64>,
    pub currency: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub city_label: String,
    pub thumbnail: Option<String>,
    pub views_count: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Ad> for AdSummary {
    fn from(ad: Ad) -> Self {
        Self {
            id: ad.id,
            thumbnail: ad.photos.into_iter().next(),
            title: ad.title,
            price: ad.price,
            currency: ad.currency,
            category: ad.category,
            subcategory: ad.subcategory,
            city_label: ad.city_label,
            views_count: ad.views_count,
            created_at: ad.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AdResponse {
    pub id: i64,
    pub seller_id: i64,
    pub title: String,
    pub description: String,
    pub price: Option<i64>,
    pub currency: String,
    pub category: String,
    pub subcategory: Option<String>,
    pub city_label: String,
    pub photos: Vec<String>,
    pub status: AdStatus,
    pub views_count: i64,
    pub contact_reveals: i64,
    pub lock_version: i32,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<Ad> for AdResponse {
    fn from(ad: Ad) -> Self {
        Self {
            id: ad.id,
            seller_id: ad.seller_id,
            title: ad.title,
            description: ad.description,
            price: ad.price,
            currency: ad.currency,
            category: ad.category,
            subcategory: ad.subcategory,
            city_label: ad.city_label,
            photos: ad.photos,
            status: ad.status,
            views_count: ad.views_count,
            contact_reveals: ad.contact_reveals,
            lock_version: ad.lock_version,
            created_at: ad.created_at,
            updated_at: ad.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct SellerSummary {
    id: i64,
    display_name: String,
    city_label: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    member_since: OffsetDateTime,
}

impl From<User> for SellerSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            display_name: user.display_name,
            city_label: user.city_label,
            member_since: user.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
struct AdDetailResponse {
    #[serde(flatten)]
    ad: AdResponse,
    seller: SellerSummary,
    is_favorite: bool,
}

#[derive(Debug, Serialize)]
struct ContactResponse {
    display_name: String,
    phone: Option<String>,
    email: Option<String>,
}

impl From<SellerContact> for ContactResponse {
    fn from(contact: SellerContact) -> Self {
        Self {
            display_name: contact.display_name,
            phone: contact.phone,
            email: contact.email,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct CreateAdRequest {
    title: String,
    description: Option<String>,
    price: Option<i64>,
    currency: Option<String>,
    category: String,
    subcategory: Option<String>,
    city_label: String,
    photos: Option<Vec<String>>,
}

impl From<CreateAdRequest> for RawAd {
    fn from(req: CreateAdRequest) -> Self {
        RawAd {
            title: req.title,
            description: req.description,
            price: req.price,
            currency: req.currency,
            category: req.category,
            subcategory: req.subcategory,
            city_label: req.city_label,
            photos: req.photos,
        }
    }
}

/// Absent fields are kept; `null` clears `price` and `subcategory`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PatchAdRequest {
    title: Option<String>,
    description: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    price: Option<Option<i64>>,
    currency: Option<String>,
    category: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    subcategory: Option<Option<String>>,
    city_label: Option<String>,
    photos: Option<Vec<String>>,
}

impl From<PatchAdRequest> for AdPatch {
    fn from(req: PatchAdRequest) -> Self {
        AdPatch {
            title: req.title,
            description: req.description,
            price: req.price,
            currency: req.currency,
            category: req.category,
            subcategory: req.subcategory,
            city_label: req.city_label,
            photos: req.photos,
        }
    }
}

fn with_etag(mut builder: actix_web::HttpResponseBuilder, ad: Ad) -> HttpResponse {
    builder
        .insert_header((ETAG, ad_etag(ad.id, ad.lock_version)))
        .json(AdResponse::from(ad))
}

/// GET /api/ads
async fn list_ads(
    http_req: HttpRequest,
    query: web::Query<ListingParams>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<Page<AdSummary>>, AppError> {
    let filter = ListingFilter::from_params(query.into_inner(), &app_state.cities)?;

    let page = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { ad_service::list_ads(txn, &filter).await })
    })
    .await?;

    Ok(web::Json(page.map(AdSummary::from)))
}

/// POST /api/ads
async fn create_ad(
    http_req: HttpRequest,
    user: CurrentUser,
    body: ValidatedJson<CreateAdRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let raw = RawAd::from(body.into_inner());
    let cities = app_state.cities.clone();

    let ad = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { ad_service::create_ad(txn, user.id, raw, &cities).await })
    })
    .await?;

    let mut builder = HttpResponse::Created();
    builder.insert_header((LOCATION, format!("/api/ads/{}", ad.id)));
    Ok(with_etag(builder, ad))
}

/// GET /api/ads/{ad_id}
///
/// Counts a view for everyone but the seller and answers with the ad's ETag
/// so the seller can edit with `If-Match`.
async fn get_ad(
    http_req: HttpRequest,
    ad_id: AdId,
    user: MaybeUser,
    device: MaybeDeviceToken,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let viewer = Viewer {
        user_id: user.id(),
        device_token: device.0,
        peer: http_req
            .connection_info()
            .realip_remote_addr()
            .map(str::to_string),
    };
    let today = OffsetDateTime::now_utc().date();

    let AdDetail {
        ad,
        seller,
        is_favorite,
    } = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { ad_service::ad_detail(txn, ad_id.0, &viewer, today).await })
    })
    .await?;

    Ok(HttpResponse::Ok()
        .insert_header((ETAG, ad_etag(ad.id, ad.lock_version)))
        .json(AdDetailResponse {
            ad: AdResponse::from(ad),
            seller: SellerSummary::from(seller),
            is_favorite,
        }))
}

/// PATCH /api/ads/{ad_id} (requires `If-Match`)
async fn patch_ad(
    http_req: HttpRequest,
    ad_id: AdId,
    user: CurrentUser,
    body: ValidatedJson<PatchAdRequest>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let expected = expected_version(&http_req, ad_id.0)?;
    let patch = AdPatch::from(body.into_inner());
    let cities = app_state.cities.clone();

    let ad = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move {
            ad_service::update_ad(txn, ad_id.0, user.id, expected, patch, &cities).await
        })
    })
    .await?;

    Ok(with_etag(HttpResponse::Ok(), ad))
}

async fn change_status(
    http_req: HttpRequest,
    ad_id: AdId,
    user: CurrentUser,
    app_state: web::Data<AppState>,
    status: AdStatus,
) -> Result<HttpResponse, AppError> {
    let ad = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { ad_service::set_ad_status(txn, ad_id.0, user.id, status).await })
    })
    .await?;

    Ok(with_etag(HttpResponse::Ok(), ad))
}

/// POST /api/ads/{ad_id}/archive
async fn archive_ad(
    http_req: HttpRequest,
    ad_id: AdId,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    change_status(http_req, ad_id, user, app_state, AdStatus::Archived).await
}

/// POST /api/ads/{ad_id}/restore
async fn restore_ad(
    http_req: HttpRequest,
    ad_id: AdId,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    change_status(http_req, ad_id, user, app_state, AdStatus::Active).await
}

/// DELETE /api/ads/{ad_id}
async fn delete_ad(
    http_req: HttpRequest,
    ad_id: AdId,
    user: CurrentUser,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { ad_service::delete_ad(txn, ad_id.0, user.id).await })
    })
    .await?;

    Ok(HttpResponse::NoContent().finish())
}

/// GET /api/ads/{ad_id}/contact
async fn reveal_contact(
    http_req: HttpRequest,
    ad_id: AdId,
    app_state: web::Data<AppState>,
) -> Result<web::Json<ContactResponse>, AppError> {
    let contact = with_txn(Some(&http_req), &app_state, move |txn| {
        Box::pin(async move { ad_service::reveal_contact(txn, ad_id.0).await })
    })
    .await?;

    Ok(web::Json(contact.into()))
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("")
            .route(web::get().to(list_ads))
            .route(web::post().to(create_ad)),
    )
    .service(
        web::resource("/{ad_id}")
            .route(web::get().to(get_ad))
            .route(web::patch().to(patch_ad))
            .route(web::delete().to(delete_ad)),
    )
    .service(web::resource("/{ad_id}/archive").route(web::post().to(archive_ad)))
    .service(web::resource("/{ad_id}/restore").route(web::post().to(restore_ad)))
    .service(web::resource("/{ad_id}/contact").route(web::get().to(reveal_contact)));
}
