use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::unique_helpers::unique_device_token;
use serde_json::Value;

use crate::common::assert_problem;
use crate::support::factory::{create_test_ad, create_test_user, raw_ad};
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn device_can_add_list_and_remove() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let older = create_test_ad(&state, seller.id, raw_ad("Kayak")).await?;
    let newer = create_test_ad(&state, seller.id, raw_ad("Paddle")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;
    let device = unique_device_token();

    for ad_id in [older.id, newer.id, newer.id] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/favorites/{ad_id}"))
            .insert_header(("x-device-token", device.as_str()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["is_favorite"], true);
    }

    let req = test::TestRequest::get()
        .uri("/api/favorites")
        .insert_header(("x-device-token", device.as_str()))
        .to_request();
    let list: Value = test::call_and_read_body_json(&app, req).await;
    let titles: Vec<&str> = list["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, vec!["Paddle", "Kayak"]);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/favorites/{}", older.id))
        .insert_header(("x-device-token", device.as_str()))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["is_favorite"], false);

    let req = test::TestRequest::get()
        .uri("/api/favorites/ids")
        .insert_header(("x-device-token", device.as_str()))
        .to_request();
    let ids: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(ids["ad_ids"], serde_json::json!([newer.id]));

    Ok(())
}

#[actix_web::test]
async fn toggle_flips_state() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Kayak")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;
    let device = unique_device_token();

    let mut seen = Vec::new();
    for _ in 0..3 {
        let req = test::TestRequest::post()
            .uri(&format!("/api/favorites/{}/toggle", ad.id))
            .insert_header(("x-device-token", device.as_str()))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        seen.push(body["is_favorite"].as_bool().unwrap());
    }
    assert_eq!(seen, vec![true, false, true]);

    Ok(())
}

#[actix_web::test]
async fn favorites_need_an_owner() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/api/favorites").to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "UNAUTHORIZED_NO_OWNER",
        StatusCode::UNAUTHORIZED,
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/favorites")
        .insert_header(("x-device-token", "short"))
        .to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "INVALID_DEVICE_TOKEN",
        StatusCode::BAD_REQUEST,
    )
    .await;

    Ok(())
}

#[actix_web::test]
async fn favoriting_a_missing_ad_is_not_found() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::put()
        .uri("/api/favorites/424242")
        .insert_header(("x-device-token", unique_device_token()))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "AD_NOT_FOUND", StatusCode::NOT_FOUND).await;

    Ok(())
}
