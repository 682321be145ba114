use sea_orm::ConnectionTrait;
use time::Date;

use crate::adapters::{ads_sea, views_sea};
use crate::errors::domain::DomainError;

/// Count one view per viewer per ad per UTC day. Returns `true` if this call counted.
pub async fn record_view<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    ad_id: i64,
    viewer_key: &str,
    today: Date,
) -> Result<bool, DomainError> {
    let inserted = views_sea::insert_if_absent(conn, ad_id, viewer_key, today).await?;
    if inserted {
        ads_sea::increment_views(conn, ad_id).await?;
    }
    Ok(inserted)
}
