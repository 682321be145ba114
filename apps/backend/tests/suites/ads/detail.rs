use actix_web::http::header::{AUTHORIZATION, ETAG};
use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::unique_helpers::unique_device_token;
use serde_json::Value;

use crate::common::assert_problem;
use crate::support::factory::{create_test_ad, create_test_user, raw_ad};
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn detail_counts_one_view_per_viewer_per_day() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Espresso machine")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;
    let uri = format!("/api/ads/{}", ad.id);

    let device_a = unique_device_token();
    let device_b = unique_device_token();

    for device in [&device_a, &device_a, &device_b] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .insert_header(("x-device-token", device.as_str()))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(
            resp.headers().get(ETAG).and_then(|v| v.to_str().ok()),
            Some(format!("\"ad-{}-v0\"", ad.id).as_str())
        );
    }

    // The seller's own visits are not counted.
    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((AUTHORIZATION, seller.bearer))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["views_count"], 2);
    assert_eq!(body["seller"]["id"], seller.id);
    assert_eq!(body["is_favorite"], false);

    Ok(())
}

#[actix_web::test]
async fn anonymous_view_without_identity_is_not_counted() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Bookshelf")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri(&format!("/api/ads/{}", ad.id)).to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["views_count"], 0);

    Ok(())
}

#[actix_web::test]
async fn archived_ad_is_visible_only_to_its_seller() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let buyer = create_test_user(&state, "buyer").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Old sofa")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/ads/{}/archive", ad.id))
        .insert_header((AUTHORIZATION, seller.bearer.clone()))
        .to_request();
    let archived: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(archived["status"], "ARCHIVED");

    let req = test::TestRequest::get()
        .uri(&format!("/api/ads/{}", ad.id))
        .insert_header((AUTHORIZATION, buyer.bearer))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "AD_NOT_FOUND", StatusCode::NOT_FOUND).await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/ads/{}", ad.id))
        .insert_header((AUTHORIZATION, seller.bearer))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    Ok(())
}

#[actix_web::test]
async fn detail_rejects_bad_and_missing_ids() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/api/ads/0").to_request();
    assert_problem(test::call_service(&app, req).await, "INVALID_AD_ID", StatusCode::BAD_REQUEST).await;

    let req = test::TestRequest::get().uri("/api/ads/abc").to_request();
    assert_problem(test::call_service(&app, req).await, "INVALID_AD_ID", StatusCode::BAD_REQUEST).await;

    let req = test::TestRequest::get().uri("/api/ads/999999").to_request();
    assert_problem(test::call_service(&app, req).await, "AD_NOT_FOUND", StatusCode::NOT_FOUND).await;

    Ok(())
}

#[actix_web::test]
async fn anonymous_views_are_keyed_by_client_ip() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let ad = create_test_ad(&state, seller.id, raw_ad("Road bike")).await?;
    let app = create_test_app(state).with_prod_routes().build().await;
    let uri = format!("/api/ads/{}", ad.id);

    for peer in ["203.0.113.10:40000", "203.0.113.11:40000", "203.0.113.10:40001"] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .peer_addr(peer.parse()?)
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    // Behind a proxy every request shares the peer; the forwarded client decides.
    for client in ["198.51.100.1", "198.51.100.2", "198.51.100.2"] {
        let req = test::TestRequest::get()
            .uri(&uri)
            .peer_addr("10.0.0.1:8080".parse()?)
            .insert_header(("x-forwarded-for", client))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);
    }

    let req = test::TestRequest::get()
        .uri(&uri)
        .insert_header((AUTHORIZATION, seller.bearer))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["views_count"], 4);

    Ok(())
}
