use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::unique_helpers::unique_device_token;
use serde_json::{json, Value};

use crate::common::assert_problem;
use crate::support::factory::{create_test_ad, create_test_user, raw_ad};
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn bearer_wins_over_device_token() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let buyer = create_test_user(&state, "buyer").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Kayak")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;
    let device = unique_device_token();

    let req = test::TestRequest::put()
        .uri(&format!("/api/favorites/{}", ad.id))
        .insert_header((AUTHORIZATION, buyer.bearer.clone()))
        .insert_header(("x-device-token", device.as_str()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/favorites/ids")
        .insert_header((AUTHORIZATION, buyer.bearer.clone()))
        .to_request();
    let ids: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids["ad_ids"], json!([ad.id]));

    let req = test::TestRequest::get()
        .uri("/api/favorites/ids")
        .insert_header(("x-device-token", device.as_str()))
        .to_request();
    let ids: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids["ad_ids"], json!([]));

    // Detail reflects the favorite for the same user.
    let req = test::TestRequest::get()
        .uri(&format!("/api/ads/{}", ad.id))
        .insert_header((AUTHORIZATION, buyer.bearer))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["is_favorite"], true);

    Ok(())
}

#[actix_web::test]
async fn archived_ads_drop_out_of_favorites() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let buyer = create_test_user(&state, "buyer").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Kayak")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/favorites/{}", ad.id))
        .insert_header((AUTHORIZATION, buyer.bearer.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri(&format!("/api/ads/{}/archive", ad.id))
        .insert_header((AUTHORIZATION, seller.bearer.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/favorites")
        .insert_header((AUTHORIZATION, buyer.bearer.clone()))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(list["items"], json!([]));

    // Restoring brings it back; the favorite row was never removed.
    let req = test::TestRequest::post()
        .uri(&format!("/api/ads/{}/restore", ad.id))
        .insert_header((AUTHORIZATION, seller.bearer))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::get()
        .uri("/api/favorites/ids")
        .insert_header((AUTHORIZATION, buyer.bearer))
        .to_request();
    let ids: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids["ad_ids"], json!([ad.id]));

    Ok(())
}

#[actix_web::test]
async fn archived_ads_cannot_be_favorited_by_strangers() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let buyer = create_test_user(&state, "buyer").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Kayak")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;
    let device = unique_device_token();

    let req = test::TestRequest::post()
        .uri(&format!("/api/ads/{}/archive", ad.id))
        .insert_header((AUTHORIZATION, seller.bearer.clone()))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::put()
        .uri(&format!("/api/favorites/{}", ad.id))
        .insert_header(("x-device-token", device.as_str()))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "AD_NOT_FOUND", StatusCode::NOT_FOUND).await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/favorites/{}/toggle", ad.id))
        .insert_header((AUTHORIZATION, buyer.bearer.clone()))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "AD_NOT_FOUND", StatusCode::NOT_FOUND).await;

    let req = test::TestRequest::get()
        .uri("/api/favorites/ids")
        .insert_header((AUTHORIZATION, buyer.bearer))
        .to_request();
    let ids: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids["ad_ids"], json!([]));

    // The seller still sees their own archived ad.
    let req = test::TestRequest::put()
        .uri(&format!("/api/favorites/{}", ad.id))
        .insert_header((AUTHORIZATION, seller.bearer))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    Ok(())
}
