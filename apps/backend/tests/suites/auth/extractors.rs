use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::unique_helpers::{unique_email, unique_str};
use bazaar_backend::state::security_config::SecurityConfig;
use serde_json::Value;

use crate::common::assert_problem;
use crate::support::auth::{bearer_header, mint_expired_token};
use crate::support::factory::create_test_user;
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn me_requires_bearer() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/api/me").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(
        resp.headers().get("www-authenticate").and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );
    assert_problem(resp, "UNAUTHORIZED_MISSING_BEARER", StatusCode::UNAUTHORIZED).await;

    Ok(())
}

#[actix_web::test]
async fn expired_and_foreign_tokens_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let user = create_test_user(&state, "expired").await?;
    let expired = mint_expired_token(&user.sub, &user.email, &state.security);
    let foreign = bearer_header(
        &user.sub,
        &user.email,
        &SecurityConfig::new("a-completely-different-secret-value!!"),
    );
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header((AUTHORIZATION, format!("Bearer {expired}")))
        .to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "UNAUTHORIZED_EXPIRED_JWT",
        StatusCode::UNAUTHORIZED,
    )
    .await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header((AUTHORIZATION, foreign))
        .to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "UNAUTHORIZED_INVALID_JWT",
        StatusCode::UNAUTHORIZED,
    )
    .await;

    Ok(())
}

#[actix_web::test]
async fn valid_token_for_unknown_user_is_forbidden() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let bearer = bearer_header(&unique_str("ghost"), &unique_email("ghost"), &state.security);
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header((AUTHORIZATION, bearer))
        .to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "FORBIDDEN_USER_NOT_FOUND",
        StatusCode::FORBIDDEN,
    )
    .await;

    Ok(())
}

#[actix_web::test]
async fn invalid_bearer_on_optional_auth_route_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    // Favorites accept anonymous devices, but a broken token is never ignored.
    let req = test::TestRequest::get()
        .uri("/api/favorites")
        .insert_header((AUTHORIZATION, "Bearer not-a-jwt"))
        .to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "UNAUTHORIZED_INVALID_JWT",
        StatusCode::UNAUTHORIZED,
    )
    .await;

    Ok(())
}

#[actix_web::test]
async fn me_returns_profile_and_patch_updates_it() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let user = create_test_user(&state, "me").await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get()
        .uri("/api/me")
        .insert_header((AUTHORIZATION, user.bearer.clone()))
        .to_request();
    let me: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(me["id"], user.id);
    assert_eq!(me["email"], user.email);
    assert!(me["phone"].is_null());

    let req = test::TestRequest::patch()
        .uri("/api/me")
        .insert_header((AUTHORIZATION, user.bearer.clone()))
        .set_json(serde_json::json!({
            "display_name": "  Mia  ",
            "phone": "+1 (303) 555-0100",
            "city_label": "denver",
        }))
        .to_request();
    let updated: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(updated["display_name"], "Mia");
    assert_eq!(updated["phone"], "+1 (303) 555-0100");
    assert_eq!(updated["city_label"], "denver");

    // null clears, absent keeps
    let req = test::TestRequest::patch()
        .uri("/api/me")
        .insert_header((AUTHORIZATION, user.bearer.clone()))
        .set_json(serde_json::json!({ "phone": null }))
        .to_request();
    let cleared: Value = test::call_and_read_body_json(&app, req).await;
    assert!(cleared["phone"].is_null());
    assert_eq!(cleared["city_label"], "denver");

    let req = test::TestRequest::patch()
        .uri("/api/me")
        .insert_header((AUTHORIZATION, user.bearer.clone()))
        .set_json(serde_json::json!({ "city_label": "atlantis" }))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "UNKNOWN_CITY", StatusCode::BAD_REQUEST).await;

    let req = test::TestRequest::patch()
        .uri("/api/me")
        .insert_header((AUTHORIZATION, user.bearer))
        .set_json(serde_json::json!({ "phone": "call me" }))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "INVALID_PHONE", StatusCode::BAD_REQUEST).await;

    Ok(())
}
