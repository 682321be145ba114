use sea_orm::ConnectionTrait;
use tracing::info;

use crate::domain::owner::OwnerKey;
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::repos::ads::{self, Ad};
use crate::repos::favorites;

/// Archived ads can only be favorited by their seller; everyone else gets 404.
async fn require_visible_ad<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    owner: &OwnerKey,
) -> Result<(), AppError> {
    match ads::find_by_id(conn, ad_id).await? {
        Some(ad) if ad.is_active() || owner.user_id() == Some(ad.seller_id) => Ok(()),
        _ => Err(DomainError::not_found(NotFoundKind::Ad, format!("Ad {ad_id} not found")).into()),
    }
}

/// Idempotent. Returns whether a new favorite was stored.
pub async fn add<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    owner: &OwnerKey,
) -> Result<bool, AppError> {
    require_visible_ad(conn, ad_id, owner).await?;
    Ok(favorites::add(conn, ad_id, owner).await?)
}

/// Idempotent. Removing something that is not a favorite is fine.
pub async fn remove<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    owner: &OwnerKey,
) -> Result<bool, AppError> {
    Ok(favorites::remove(conn, ad_id, owner).await?)
}

/// Flip the favorite state; returns the new state.
pub async fn toggle<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    owner: &OwnerKey,
) -> Result<bool, AppError> {
    if favorites::remove(conn, ad_id, owner).await? {
        return Ok(false);
    }
    add(conn, ad_id, owner).await?;
    Ok(true)
}

pub async fn list<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner: &OwnerKey,
) -> Result<Vec<Ad>, AppError> {
    Ok(favorites::list_ads(conn, owner).await?)
}

pub async fn ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner: &OwnerKey,
) -> Result<Vec<i64>, AppError> {
    Ok(favorites::list_ids(conn, owner).await?)
}

/// Move a device's anonymous favorites onto `user_id`. Run inside one transaction.
pub async fn merge_device<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    device_token: &str,
    user_id: i64,
) -> Result<u64, AppError> {
    let added = favorites::merge_device_into_user(conn, device_token, user_id).await?;
    if added > 0 {
        info!(user_id, added, "Merged device favorites into account");
    }
    Ok(added)
}
