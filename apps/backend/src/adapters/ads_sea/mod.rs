//! SeaORM adapter for ads.

use sea_orm::sea_query::{Expr, LikeExpr, NullOrdering, Order};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use time::OffsetDateTime;

use crate::entities::ads::{self, AdStatus};
use crate::infra::db_errors::OPTIMISTIC_LOCK_PREFIX;

pub mod dto;

pub use dto::{AdWrite, ListingQuery, ListingSort};

// Adapter functions return DbErr; repos map to DomainError via From<DbErr>.

pub async fn create<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
    dto: AdWrite,
) -> Result<ads::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    ads::ActiveModel {
        id: NotSet,
        seller_id: Set(seller_id),
        title: Set(dto.title),
        description: Set(dto.description),
        price: Set(dto.price),
        currency: Set(dto.currency),
        category: Set(dto.category),
        subcategory: Set(dto.subcategory),
        city_label: Set(dto.city_label),
        photos: Set(dto.photos_json),
        status: Set(AdStatus::Active),
        search_text: Set(dto.search_text),
        views_count: Set(0),
        contact_reveals: Set(0),
        lock_version: Set(0),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn find_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
) -> Result<Option<ads::Model>, sea_orm::DbErr> {
    ads::Entity::find_by_id(ad_id).one(conn).await
}

/// Rewrite the content columns if `lock_version` still equals `expected_version`.
/// A stale version yields a `DbErr::Custom` carrying the optimistic-lock prefix.
pub async fn update_content<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    expected_version: i32,
    dto: AdWrite,
) -> Result<ads::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();

    let result = ads::Entity::update_many()
        .col_expr(ads::Column::Title, Expr::val(dto.title).into())
        .col_expr(ads::Column::Description, Expr::val(dto.description).into())
        .col_expr(ads::Column::Price, Expr::val(dto.price).into())
        .col_expr(ads::Column::Currency, Expr::val(dto.currency).into())
        .col_expr(ads::Column::Category, Expr::val(dto.category).into())
        .col_expr(ads::Column::Subcategory, Expr::val(dto.subcategory).into())
        .col_expr(ads::Column::CityLabel, Expr::val(dto.city_label).into())
        .col_expr(ads::Column::Photos, Expr::val(dto.photos_json).into())
        .col_expr(ads::Column::SearchText, Expr::val(dto.search_text).into())
        .col_expr(ads::Column::UpdatedAt, Expr::val(now).into())
        .col_expr(
            ads::Column::LockVersion,
            Expr::col(ads::Column::LockVersion).add(1),
        )
        .filter(ads::Column::Id.eq(ad_id))
        .filter(ads::Column::LockVersion.eq(expected_version))
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return match find_by_id(conn, ad_id).await? {
            Some(ad) => Err(sea_orm::DbErr::Custom(format!(
                "{OPTIMISTIC_LOCK_PREFIX} ad={ad_id} expected={expected_version} actual={}",
                ad.lock_version
            ))),
            None => Err(sea_orm::DbErr::RecordNotFound("ad".to_string())),
        };
    }

    find_by_id(conn, ad_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("ad".to_string()))
}

/// Move the ad to `status`. No-op (and no version bump) when already there.
pub async fn set_status<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    status: AdStatus,
) -> Result<bool, sea_orm::DbErr> {
    let result = ads::Entity::update_many()
        .col_expr(ads::Column::Status, Expr::val(status).into())
        .col_expr(
            ads::Column::UpdatedAt,
            Expr::val(OffsetDateTime::now_utc()).into(),
        )
        .col_expr(
            ads::Column::LockVersion,
            Expr::col(ads::Column::LockVersion).add(1),
        )
        .filter(ads::Column::Id.eq(ad_id))
        .filter(ads::Column::Status.ne(status))
        .exec(conn)
        .await?;
    Ok(result.rows_affected > 0)
}

pub async fn delete<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
) -> Result<bool, sea_orm::DbErr> {
    let result = ads::Entity::delete_by_id(ad_id).exec(conn).await?;
    Ok(result.rows_affected > 0)
}

pub async fn increment_views<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
) -> Result<(), sea_orm::DbErr> {
    ads::Entity::update_many()
        .col_expr(
            ads::Column::ViewsCount,
            Expr::col(ads::Column::ViewsCount).add(1),
        )
        .filter(ads::Column::Id.eq(ad_id))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn increment_contact_reveals<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
) -> Result<(), sea_orm::DbErr> {
    ads::Entity::update_many()
        .col_expr(
            ads::Column::ContactReveals,
            Expr::col(ads::Column::ContactReveals).add(1),
        )
        .filter(ads::Column::Id.eq(ad_id))
        .exec(conn)
        .await?;
    Ok(())
}

pub async fn count_active_by_seller<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
) -> Result<u64, sea_orm::DbErr> {
    ads::Entity::find()
        .filter(ads::Column::SellerId.eq(seller_id))
        .filter(ads::Column::Status.eq(AdStatus::Active))
        .count(conn)
        .await
}

/// Escape LIKE metacharacters with `\`.
pub fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

pub async fn list_active<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    query: ListingQuery,
) -> Result<Vec<ads::Model>, sea_orm::DbErr> {
    let mut select = ads::Entity::find().filter(ads::Column::Status.eq(AdStatus::Active));

    if let Some(city) = query.city_label {
        select = select.filter(ads::Column::CityLabel.eq(city));
    }
    if let Some(category) = query.category {
        select = select.filter(ads::Column::Category.eq(category));
    }
    if let Some(subcategory) = query.subcategory {
        select = select.filter(ads::Column::Subcategory.eq(subcategory));
    }
    if let Some(seller_id) = query.seller_id {
        select = select.filter(ads::Column::SellerId.eq(seller_id));
    }
    if let Some(min) = query.price_min {
        select = select.filter(ads::Column::Price.gte(min));
    }
    if let Some(max) = query.price_max {
        select = select.filter(ads::Column::Price.lte(max));
    }
    if query.with_photos {
        select = select.filter(ads::Column::Photos.ne("[]"));
    }
    if let Some(needle) = query.needle {
        let pattern = LikeExpr::new(format!("%{}%", escape_like(&needle))).escape('\\');
        select = select.filter(ads::Column::SearchText.like(pattern));
    }

    select = match query.sort {
        ListingSort::Newest => select.order_by_desc(ads::Column::CreatedAt),
        ListingSort::PriceAsc => {
            select.order_by_with_nulls(ads::Column::Price, Order::Asc, NullOrdering::Last)
        }
        ListingSort::PriceDesc => {
            select.order_by_with_nulls(ads::Column::Price, Order::Desc, NullOrdering::Last)
        }
        ListingSort::Popular => select.order_by_desc(ads::Column::ViewsCount),
    };

    select
        .order_by_desc(ads::Column::Id)
        .offset(query.offset)
        .limit(query.limit)
        .all(conn)
        .await
}
