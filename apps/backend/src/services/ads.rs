//! Ad lifecycle: posting, detail views, owner edits and the public listing.

use sea_orm::ConnectionTrait;
use time::Date;
use tracing::{debug, info};

use crate::catalog::cities::CityDirectory;
use crate::domain::ad_rules::{AdDraft, AdPatch, RawAd};
use crate::domain::listing::{ListingFilter, Page};
use crate::domain::owner::{viewer_key, OwnerKey};
use crate::error::AppError;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::logging::security;
use crate::repos::ads::{self, Ad, AdStatus};
use crate::repos::users::{self, User};
use crate::repos::{favorites, views};

/// Who is looking at an ad. Any combination of identities may be absent.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub user_id: Option<i64>,
    pub device_token: Option<String>,
    pub peer: Option<String>,
}

impl Viewer {
    fn owner_key(&self) -> Option<OwnerKey> {
        match (self.user_id, &self.device_token) {
            (Some(id), _) => Some(OwnerKey::User(id)),
            (None, Some(token)) => Some(OwnerKey::Device(token.clone())),
            (None, None) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdDetail {
    pub ad: Ad,
    pub seller: User,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SellerContact {
    pub display_name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
}

fn ad_not_found(ad_id: i64) -> DomainError {
    DomainError::not_found(NotFoundKind::Ad, format!("Ad {ad_id} not found"))
}

fn raw_of(ad: &Ad) -> RawAd {
    RawAd {
        title: ad.title.clone(),
        description: Some(ad.description.clone()),
        price: ad.price,
        currency: Some(ad.currency.clone()),
        category: ad.category.clone(),
        subcategory: ad.subcategory.clone(),
        city_label: ad.city_label.clone(),
        photos: Some(ad.photos.clone()),
    }
}

/// Load an ad the caller must own. Someone else's ad is 403, a missing one 404.
async fn load_owned<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    user_id: i64,
) -> Result<Ad, AppError> {
    let ad = ads::find_by_id(conn, ad_id)
        .await?
        .ok_or_else(|| ad_not_found(ad_id))?;

    if ad.seller_id != user_id {
        security::ownership_denied(user_id, ad_id);
        return Err(DomainError::forbidden("Only the seller may modify this ad").into());
    }
    Ok(ad)
}

pub async fn create_ad<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
    raw: RawAd,
    cities: &CityDirectory,
) -> Result<Ad, AppError> {
    let draft = AdDraft::validate(raw, cities)?;
    let ad = ads::create(conn, seller_id, &draft).await?;

    info!(ad_id = ad.id, seller_id, category = %ad.category, city = %ad.city_label, "Ad created");
    Ok(ad)
}

/// Detail for any viewer. Archived ads only exist for their seller. Views by
/// anyone but the seller are counted once per viewer per day.
pub async fn ad_detail<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    viewer: &Viewer,
    today: Date,
) -> Result<AdDetail, AppError> {
    let mut ad = ads::find_by_id(conn, ad_id)
        .await?
        .ok_or_else(|| ad_not_found(ad_id))?;

    let is_owner = viewer.user_id == Some(ad.seller_id);
    if !ad.is_active() && !is_owner {
        return Err(ad_not_found(ad_id).into());
    }

    if !is_owner {
        let key = viewer_key(viewer.user_id, viewer.device_token.as_deref(), viewer.peer.as_deref());
        if let Some(key) = key {
            if views::record_view(conn, ad_id, &key, today).await? {
                ad.views_count += 1;
            }
        } else {
            debug!(ad_id, "View without any viewer identity not counted");
        }
    }

    let seller = users::find_user_by_id(conn, ad.seller_id).await?.ok_or_else(|| {
        DomainError::infra(
            crate::errors::domain::InfraErrorKind::DataCorruption,
            format!("ad {ad_id} references missing seller {}", ad.seller_id),
        )
    })?;

    let is_favorite = match viewer.owner_key() {
        Some(owner) => favorites::exists(conn, ad_id, &owner).await?,
        None => false,
    };

    Ok(AdDetail {
        ad,
        seller,
        is_favorite,
    })
}

/// Apply an owner edit guarded by the version the client last saw.
pub async fn update_ad<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    user_id: i64,
    expected_version: i32,
    patch: AdPatch,
    cities: &CityDirectory,
) -> Result<Ad, AppError> {
    let current = load_owned(conn, ad_id, user_id).await?;

    if current.lock_version != expected_version {
        return Err(DomainError::conflict(
            ConflictKind::OptimisticLock,
            format!(
                "Ad changed since it was read (expected version {expected_version}, current {})",
                current.lock_version
            ),
        )
        .into());
    }
    if patch.is_empty() {
        return Ok(current);
    }

    let draft = AdDraft::apply_patch(raw_of(&current), patch, cities)?;
    let ad = ads::update_content(conn, ad_id, expected_version, &draft).await?;

    info!(ad_id, version = ad.lock_version, "Ad updated");
    Ok(ad)
}

/// Move an ad to `status`. Repeating a transition is a no-op.
pub async fn set_ad_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    user_id: i64,
    status: AdStatus,
) -> Result<Ad, AppError> {
    load_owned(conn, ad_id, user_id).await?;

    if ads::set_status(conn, ad_id, status).await? {
        info!(ad_id, ?status, "Ad status changed");
    }

    Ok(ads::find_by_id(conn, ad_id)
        .await?
        .ok_or_else(|| ad_not_found(ad_id))?)
}

pub async fn delete_ad<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    user_id: i64,
) -> Result<(), AppError> {
    load_owned(conn, ad_id, user_id).await?;
    ads::delete(conn, ad_id).await?;

    info!(ad_id, seller_id = user_id, "Ad deleted");
    Ok(())
}

pub async fn list_ads<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    filter: &ListingFilter,
) -> Result<Page<Ad>, AppError> {
    Ok(ads::list(conn, filter).await?)
}

/// Seller contact details for an active ad. Every reveal is counted.
pub async fn reveal_contact<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
) -> Result<SellerContact, AppError> {
    let ad = ads::find_by_id(conn, ad_id)
        .await?
        .filter(Ad::is_active)
        .ok_or_else(|| ad_not_found(ad_id))?;

    let seller = users::find_user_by_id(conn, ad.seller_id)
        .await?
        .ok_or_else(|| DomainError::not_found(NotFoundKind::Seller, "Seller not found"))?;
    let email = users::find_credentials_by_user_id(conn, ad.seller_id)
        .await?
        .map(|c| c.email);

    ads::increment_contact_reveals(conn, ad_id).await?;

    Ok(SellerContact {
        display_name: seller.display_name,
        phone: seller.phone,
        email,
    })
}
