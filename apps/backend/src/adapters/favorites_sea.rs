//! SeaORM adapter for favorites owned by a user or by an anonymous device.

use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, EntityTrait, JoinType, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set,
};
use time::OffsetDateTime;

use crate::domain::owner::OwnerKey;
use crate::entities::ads::{self, AdStatus};
use crate::entities::favorites;

fn owned_by(owner: &OwnerKey) -> Condition {
    match owner {
        OwnerKey::User(id) => Condition::all().add(favorites::Column::UserId.eq(*id)),
        OwnerKey::Device(token) => {
            Condition::all().add(favorites::Column::DeviceToken.eq(token.as_str()))
        }
    }
}

/// `true` when a new row was written.
pub async fn insert_if_absent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    owner: &OwnerKey,
) -> Result<bool, sea_orm::DbErr> {
    let (user_id, device_token, conflict_col) = match owner {
        OwnerKey::User(id) => (Some(*id), None, favorites::Column::UserId),
        OwnerKey::Device(token) => (None, Some(token.clone()), favorites::Column::DeviceToken),
    };

    let row = favorites::ActiveModel {
        id: NotSet,
        ad_id: Set(ad_id),
        user_id: Set(user_id),
        device_token: Set(device_token),
        created_at: Set(OffsetDateTime::now_utc()),
    };

    let rows = favorites::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([favorites::Column::AdId, conflict_col])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(rows == 1)
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    owner: &OwnerKey,
) -> Result<bool, sea_orm::DbErr> {
    let result = favorites::Entity::delete_many()
        .filter(favorites::Column::AdId.eq(ad_id))
        .filter(owned_by(owner))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn exists<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    owner: &OwnerKey,
) -> Result<bool, sea_orm::DbErr> {
    let n = favorites::Entity::find()
        .filter(favorites::Column::AdId.eq(ad_id))
        .filter(owned_by(owner))
        .count(conn)
        .await?;
    Ok(n > 0)
}

/// ACTIVE ads the owner favorited, most recently favorited first.
pub async fn list_active_ads<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner: &OwnerKey,
) -> Result<Vec<ads::Model>, sea_orm::DbErr> {
    ads::Entity::find()
        .join(JoinType::InnerJoin, ads::Relation::Favorites.def())
        .filter(owned_by(owner))
        .filter(ads::Column::Status.eq(AdStatus::Active))
        .order_by_desc(favorites::Column::CreatedAt)
        .order_by_desc(favorites::Column::Id)
        .all(conn)
        .await
}

pub async fn list_active_ad_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    owner: &OwnerKey,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    ads::Entity::find()
        .select_only()
        .column(ads::Column::Id)
        .join(JoinType::InnerJoin, ads::Relation::Favorites.def())
        .filter(owned_by(owner))
        .filter(ads::Column::Status.eq(AdStatus::Active))
        .order_by_desc(favorites::Column::CreatedAt)
        .order_by_desc(favorites::Column::Id)
        .into_tuple()
        .all(conn)
        .await
}

/// Ad ids of every favorite held by a device, oldest first.
pub async fn device_ad_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    device_token: &str,
) -> Result<Vec<i64>, sea_orm::DbErr> {
    favorites::Entity::find()
        .select_only()
        .column(favorites::Column::AdId)
        .filter(favorites::Column::DeviceToken.eq(device_token))
        .order_by_asc(favorites::Column::Id)
        .into_tuple()
        .all(conn)
        .await
}

pub async fn delete_for_device<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    device_token: &str,
) -> Result<u64, sea_orm::DbErr> {
    let result = favorites::Entity::delete_many()
        .filter(favorites::Column::DeviceToken.eq(device_token))
        .exec(conn)
        .await?;
    Ok(result.rows_affected)
}
