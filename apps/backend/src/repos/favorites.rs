use sea_orm::ConnectionTrait;

use super::ads::{decode_all, Ad};
use crate::adapters::favorites_sea;
use crate::domain::owner::OwnerKey;
use crate::errors::domain::DomainError;

pub async fn add<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    owner: &OwnerKey,
) -> Result<bool, DomainError> {
    Ok(favorites_sea::insert_if_absent(conn, ad_id, owner).await?)
}

pub async fn remove<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    owner: &OwnerKey,
) -> Result<bool, DomainError> {
    Ok(favorites_sea::delete(conn, ad_id, owner).await?)
}

pub async fn exists<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    owner: &OwnerKey,
) -> Result<bool, DomainError> {
    Ok(favorites_sea::exists(conn, ad_id, owner).await?)
}

pub async fn list_ads<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner: &OwnerKey,
) -> Result<Vec<Ad>, DomainError> {
    decode_all(favorites_sea::list_active_ads(conn, owner).await?)
}

pub async fn list_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner: &OwnerKey,
) -> Result<Vec<i64>, DomainError> {
    Ok(favorites_sea::list_active_ad_ids(conn, owner).await?)
}

/// Move a device's favorites onto a user. Ads the user already has are skipped;
/// every device row is removed. Returns how many user favorites were added.
///
/// Callers run this inside one transaction.
pub async fn merge_device_into_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    device_token: &str,
    user_id: i64,
) -> Result<u64, DomainError> {
    let owner = OwnerKey::User(user_id);
    let mut added = 0;

    for ad_id in favorites_sea::device_ad_ids(conn, device_token).await? {
        if favorites_sea::insert_if_absent(conn, ad_id, &owner).await? {
            added += 1;
        }
    }
    favorites_sea::delete_for_device(conn, device_token).await?;

    Ok(added)
}
