use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::test;
use bazaar_backend::db::require_db;
use bazaar_backend::repos::ads;
use serde_json::Value;

use crate::common::assert_problem;
use crate::support::factory::{create_test_ad, create_test_user, raw_ad};
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn contact_reveal_is_counted() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Canoe")).await?;
    let app = create_test_app(state.clone()).with_prod_routes().build().await;

    for _ in 0..2 {
        let req = test::TestRequest::get()
            .uri(&format!("/api/ads/{}/contact", ad.id))
            .to_request();
        let contact: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(contact["display_name"], "seller seller");
        assert_eq!(contact["email"], seller.email);
        assert!(contact["phone"].is_null());
    }

    let stored = ads::find_by_id(require_db(&state)?, ad.id).await?.unwrap();
    assert_eq!(stored.contact_reveals, 2);

    Ok(())
}

#[actix_web::test]
async fn archived_ad_has_no_contact() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Canoe")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/ads/{}/archive", ad.id))
        .insert_header((AUTHORIZATION, seller.bearer))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/ads/{}/contact", ad.id))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "AD_NOT_FOUND", StatusCode::NOT_FOUND).await;

    Ok(())
}
