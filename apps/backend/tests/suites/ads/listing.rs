use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::test;
use bazaar_backend::db::require_db;
use bazaar_backend::domain::ad_rules::RawAd;
use bazaar_backend::repos::views;
use serde_json::Value;
use time::macros::date;

use crate::common::assert_problem;
use crate::support::factory::{create_test_ad, create_test_user, raw_ad};
use crate::support::{build_test_state, create_test_app};

fn priced(title: &str, price: Option<i64>) -> RawAd {
    RawAd {
        price,
        ..raw_ad(title)
    }
}

fn titles(page: &Value) -> Vec<String> {
    page["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap().to_string())
        .collect()
}

#[actix_web::test]
async fn listing_is_newest_first_and_paginates() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    for title in ["First ad", "Second ad", "Third ad"] {
        create_test_ad(&state, seller.id, raw_ad(title)).await?;
    }
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/api/ads?per_page=2").to_request();
    let first: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&first), vec!["Third ad", "Second ad"]);
    assert_eq!(first["page"], 1);
    assert_eq!(first["has_more"], true);
    assert_eq!(first["items"][0]["thumbnail"], "https://img.example/1.jpg");

    let req = test::TestRequest::get().uri("/api/ads?per_page=2&page=2").to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&second), vec!["First ad"]);
    assert_eq!(second["has_more"], false);

    Ok(())
}

#[actix_web::test]
async fn listing_hides_archived_ads() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let hidden = create_test_ad(&state, seller.id, raw_ad("Hidden lamp")).await?;
    create_test_ad(&state, seller.id, raw_ad("Visible lamp")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/ads/{}/archive", hidden.id))
        .insert_header((AUTHORIZATION, seller.bearer))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/ads").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&page), vec!["Visible lamp"]);

    Ok(())
}

#[actix_web::test]
async fn price_sorts_put_unpriced_ads_last() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    create_test_ad(&state, seller.id, priced("Cheap chair", Some(10))).await?;
    create_test_ad(&state, seller.id, priced("Ask for price", None)).await?;
    create_test_ad(&state, seller.id, priced("Fancy chair", Some(500))).await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/api/ads?sort=price_asc").to_request();
    let asc: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&asc), vec!["Cheap chair", "Fancy chair", "Ask for price"]);

    let req = test::TestRequest::get().uri("/api/ads?sort=price_desc").to_request();
    let desc: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&desc), vec!["Fancy chair", "Cheap chair", "Ask for price"]);

    let req = test::TestRequest::get()
        .uri("/api/ads?price_min=50&price_max=1000")
        .to_request();
    let ranged: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&ranged), vec!["Fancy chair"]);

    Ok(())
}

#[actix_web::test]
async fn listing_filters_by_city_category_and_text() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    create_test_ad(
        &state,
        seller.id,
        RawAd {
            city_label: "chicago".to_string(),
            ..raw_ad("Café table")
        },
    )
    .await?;
    create_test_ad(
        &state,
        seller.id,
        RawAd {
            category: "autos".to_string(),
            subcategory: Some("parts".to_string()),
            photos: None,
            ..raw_ad("Winter tires")
        },
    )
    .await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/api/ads?city=chicago").to_request();
    assert_eq!(titles(&test::call_and_read_body_json(&app, req).await), vec!["Café table"]);

    let req = test::TestRequest::get().uri("/api/ads?q=CAFE").to_request();
    assert_eq!(titles(&test::call_and_read_body_json(&app, req).await), vec!["Café table"]);

    let req = test::TestRequest::get()
        .uri("/api/ads?category=autos&subcategory=parts")
        .to_request();
    assert_eq!(titles(&test::call_and_read_body_json(&app, req).await), vec!["Winter tires"]);

    let req = test::TestRequest::get().uri("/api/ads?with_photos=true").to_request();
    assert_eq!(titles(&test::call_and_read_body_json(&app, req).await), vec!["Café table"]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/ads?seller_id={}", seller.id + 1000))
        .to_request();
    assert!(titles(&test::call_and_read_body_json(&app, req).await).is_empty());

    Ok(())
}

#[actix_web::test]
async fn listing_rejects_bad_parameters() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let cases = [
        ("/api/ads?price_min=10&price_max=5", "INVALID_PRICE_RANGE"),
        ("/api/ads?per_page=0", "INVALID_PAGINATION"),
        ("/api/ads?city=atlantis", "UNKNOWN_CITY"),
        ("/api/ads?category=pets", "INVALID_CATEGORY"),
        ("/api/ads?subcategory=cars", "INVALID_SUBCATEGORY"),
        ("/api/ads?sort=cheapest", "VALIDATION_ERROR"),
    ];
    for (uri, code) in cases {
        let req = test::TestRequest::get().uri(uri).to_request();
        assert_problem(test::call_service(&app, req).await, code, StatusCode::BAD_REQUEST).await;
    }

    let req = test::TestRequest::get().uri("/api/ads?page=first").to_request();
    assert_problem(test::call_service(&app, req).await, "BAD_REQUEST", StatusCode::BAD_REQUEST).await;

    Ok(())
}

#[actix_web::test]
async fn per_page_above_maximum_is_clamped() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/api/ads?per_page=500").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(page["per_page"], 50);

    Ok(())
}

#[actix_web::test]
async fn popular_sort_orders_by_views_then_newest() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let quiet = create_test_ad(&state, seller.id, raw_ad("Quiet ad")).await?;
    let busy = create_test_ad(&state, seller.id, raw_ad("Busy ad")).await?;
    let older_pair = create_test_ad(&state, seller.id, raw_ad("Older pair")).await?;
    let newer_pair = create_test_ad(&state, seller.id, raw_ad("Newer pair")).await?;

    let db = require_db(&state)?;
    let day = date!(2026 - 03 - 02);
    for viewer in ["ip:203.0.113.1", "ip:203.0.113.2", "ip:203.0.113.3"] {
        views::record_view(db, busy.id, viewer, day).await?;
    }
    for viewer in ["ip:203.0.113.1", "ip:203.0.113.2"] {
        views::record_view(db, older_pair.id, viewer, day).await?;
        views::record_view(db, newer_pair.id, viewer, day).await?;
    }

    let app = create_test_app(state).with_prod_routes().build().await;
    let req = test::TestRequest::get().uri("/api/ads?sort=popular").to_request();
    let page: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(titles(&page), vec!["Busy ad", "Newer pair", "Older pair", "Quiet ad"]);

    Ok(())
}
