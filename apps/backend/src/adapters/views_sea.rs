//! SeaORM adapter for per-day view dedup rows.

use sea_orm::sea_query::OnConflict;
use sea_orm::{ConnectionTrait, EntityTrait, NotSet, Set};
use time::Date;

use crate::entities::ad_views;

/// Insert `(ad_id, viewer_key, day)`; `true` when the row is new.
pub async fn insert_if_absent<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    viewer_key: &str,
    day: Date,
) -> Result<bool, sea_orm::DbErr> {
    let row = ad_views::ActiveModel {
        id: NotSet,
        ad_id: Set(ad_id),
        viewer_key: Set(viewer_key.to_string()),
        viewed_on: Set(day),
    };

    let rows = ad_views::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([
                ad_views::Column::AdId,
                ad_views::Column::ViewerKey,
                ad_views::Column::ViewedOn,
            ])
            .do_nothing()
            .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(rows == 1)
}
