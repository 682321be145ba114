use bazaar_backend::db::require_db;
use bazaar_backend::repos::{ads, views};
use time::macros::date;

use crate::support::build_test_state;
use crate::support::factory::{create_test_ad, create_test_user, raw_ad};

#[actix_web::test]
async fn views_count_once_per_viewer_per_day() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Snowboard")).await?;
    let db = require_db(&state)?;

    let monday = date!(2026 - 03 - 02);
    let tuesday = date!(2026 - 03 - 03);

    assert!(views::record_view(db, ad.id, "d:device-aaaaaaaaaaaa", monday).await?);
    assert!(!views::record_view(db, ad.id, "d:device-aaaaaaaaaaaa", monday).await?);
    assert!(views::record_view(db, ad.id, "ip:203.0.113.9", monday).await?);
    assert!(views::record_view(db, ad.id, "d:device-aaaaaaaaaaaa", tuesday).await?);

    let stored = ads::find_by_id(db, ad.id).await?.unwrap();
    assert_eq!(stored.views_count, 3);

    Ok(())
}
