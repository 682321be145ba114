//! SeaORM adapter for seller ratings.

use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, QuerySelect, Set};
use time::OffsetDateTime;

use crate::entities::seller_ratings;

/// Insert or replace the rater's score for this seller.
pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
    rater_id: i64,
    score: i16,
) -> Result<(), sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    let row = seller_ratings::ActiveModel {
        id: NotSet,
        seller_id: Set(seller_id),
        rater_id: Set(rater_id),
        score: Set(score),
        created_at: Set(now),
        updated_at: Set(now),
    };

    seller_ratings::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                seller_ratings::Column::SellerId,
                seller_ratings::Column::RaterId,
            ])
            .update_columns([
                seller_ratings::Column::Score,
                seller_ratings::Column::UpdatedAt,
            ])
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;
    Ok(())
}

/// `(sum of scores, number of ratings)` for a seller.
pub async fn totals<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
) -> Result<(i64, i64), sea_orm::DbErr> {
    let row: Option<(Option<i64>, i64)> = seller_ratings::Entity::find()
        .select_only()
        .column_as(seller_ratings::Column::Score.sum(), "total")
        .column_as(seller_ratings::Column::Id.count(), "n")
        .filter(seller_ratings::Column::SellerId.eq(seller_id))
        .into_tuple()
        .one(conn)
        .await?;

    Ok(row.map(|(sum, n)| (sum.unwrap_or(0), n)).unwrap_or((0, 0)))
}
