use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::unique_helpers::{unique_device_token, unique_email, unique_str};
use bazaar_backend::db::require_db;
use bazaar_backend::domain::owner::OwnerKey;
use bazaar_backend::repos::favorites;
use bazaar_backend::verify_access_token;
use serde_json::{json, Value};

use crate::common::assert_problem;
use crate::support::factory::{create_test_ad, create_test_user, raw_ad};
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn login_creates_then_reuses_user() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let security = state.security.clone();
    let app = create_test_app(state).with_prod_routes().build().await;

    let email = unique_email("login");
    let sub = unique_str("idp");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "name": "Ann Buyer", "provider_sub": sub }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let first: Value = test::read_body_json(resp).await;

    let claims = verify_access_token(first["token"].as_str().unwrap(), &security)?;
    assert_eq!(claims.email, email.to_lowercase());
    assert_eq!(claims.sub, sub);
    assert_eq!(first["merged_favorites"], 0);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "name": "Other Name", "provider_sub": sub }))
        .to_request();
    let second: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(second["user_id"], first["user_id"]);

    Ok(())
}

#[actix_web::test]
async fn login_with_different_provider_sub_conflicts() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;
    let email = unique_email("mismatch");

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "provider_sub": unique_str("idp") }))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::OK);

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": email, "provider_sub": unique_str("idp") }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem(resp, "PROVIDER_SUB_MISMATCH", StatusCode::CONFLICT).await;

    Ok(())
}

#[actix_web::test]
async fn login_validates_email_and_subject() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": "not-an-email", "provider_sub": "sub" }))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "INVALID_EMAIL", StatusCode::BAD_REQUEST).await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({ "email": unique_email("x"), "provider_sub": "  " }))
        .to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "INVALID_PROVIDER_SUB",
        StatusCode::BAD_REQUEST,
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .insert_header(("content-type", "application/json"))
        .set_payload("{\"email\": ")
        .to_request();
    assert_problem(test::call_service(&app, req).await, "BAD_REQUEST", StatusCode::BAD_REQUEST).await;

    Ok(())
}

#[actix_web::test]
async fn login_with_device_token_merges_favorites() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let first = create_test_ad(&state, seller.id, raw_ad("Road bike")).await?;
    let second = create_test_ad(&state, seller.id, raw_ad("Desk lamp")).await?;

    let device = unique_device_token();
    {
        let db = require_db(&state)?;
        let owner = OwnerKey::Device(device.clone());
        favorites::add(db, first.id, &owner).await?;
        favorites::add(db, second.id, &owner).await?;
    }

    let app = create_test_app(state.clone()).with_prod_routes().build().await;
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": unique_email("buyer"),
            "provider_sub": unique_str("idp"),
            "device_token": device,
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["merged_favorites"], 2);

    let db = require_db(&state)?;
    let user_id = body["user_id"].as_i64().unwrap();
    let mut ids = favorites::list_ids(db, &OwnerKey::User(user_id)).await?;
    ids.sort_unstable();
    assert_eq!(ids, vec![first.id, second.id]);
    assert!(favorites::list_ids(db, &OwnerKey::Device(device)).await?.is_empty());

    Ok(())
}

#[actix_web::test]
async fn login_rejects_malformed_device_token() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .set_json(json!({
            "email": unique_email("buyer"),
            "provider_sub": unique_str("idp"),
            "device_token": "bad token!",
        }))
        .to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "INVALID_DEVICE_TOKEN",
        StatusCode::BAD_REQUEST,
    )
    .await;

    Ok(())
}
