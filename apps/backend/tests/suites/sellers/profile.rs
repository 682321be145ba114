use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::Value;

use crate::common::assert_problem;
use crate::support::factory::{create_test_ad, create_test_user, raw_ad};
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn profile_counts_only_active_ads() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    create_test_ad(&state, seller.id, raw_ad("Tent")).await?;
    let archived = create_test_ad(&state, seller.id, raw_ad("Sleeping bag")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/ads/{}/archive", archived.id))
        .insert_header((AUTHORIZATION, seller.bearer))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri(&format!("/api/sellers/{}", seller.id))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["id"], seller.id);
    assert_eq!(profile["active_ads"], 1);
    assert_eq!(profile["rating"]["count"], 0);
    assert!(profile["rating"]["average"].is_null());
    assert!(profile.get("email").is_none());

    Ok(())
}

#[actix_web::test]
async fn unknown_seller_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/api/sellers/77777").to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "SELLER_NOT_FOUND",
        StatusCode::NOT_FOUND,
    )
    .await;

    let req = test::TestRequest::get().uri("/api/sellers/not-a-number").to_request();
    assert_problem(test::call_service(&app, req).await, "BAD_REQUEST", StatusCode::BAD_REQUEST).await;

    Ok(())
}
