use actix_web::http::header::AUTHORIZATION;
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

use crate::common::assert_problem;
use crate::support::factory::create_test_user;
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn rating_again_replaces_the_earlier_score() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let alice = create_test_user(&state, "alice").await?;
    let bob = create_test_user(&state, "bob").await?;
    let app = create_test_app(state).with_prod_routes().build().await;
    let uri = format!("/api/sellers/{}/rating", seller.id);

    for (rater, score) in [(&alice, 5), (&bob, 4), (&alice, 2)] {
        let req = test::TestRequest::put()
            .uri(&uri)
            .insert_header((AUTHORIZATION, rater.bearer.clone()))
            .set_json(json!({ "score": score }))
            .to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["score"], score);
    }

    let req = test::TestRequest::get()
        .uri(&format!("/api/sellers/{}", seller.id))
        .to_request();
    let profile: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(profile["rating"]["count"], 2);
    assert_eq!(profile["rating"]["average"], 3.0);

    Ok(())
}

#[actix_web::test]
async fn rating_rejects_self_bad_scores_and_unknown_sellers() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let buyer = create_test_user(&state, "buyer").await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/sellers/{}/rating", seller.id))
        .insert_header((AUTHORIZATION, seller.bearer))
        .set_json(json!({ "score": 5 }))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "CANNOT_RATE_SELF", StatusCode::BAD_REQUEST).await;

    for score in [0, 6] {
        let req = test::TestRequest::put()
            .uri(&format!("/api/sellers/{}/rating", seller.id))
            .insert_header((AUTHORIZATION, buyer.bearer.clone()))
            .set_json(json!({ "score": score }))
            .to_request();
        assert_problem(test::call_service(&app, req).await, "INVALID_RATING", StatusCode::BAD_REQUEST).await;
    }

    let req = test::TestRequest::put()
        .uri("/api/sellers/99999/rating")
        .insert_header((AUTHORIZATION, buyer.bearer))
        .set_json(json!({ "score": 3 }))
        .to_request();
    assert_problem(test::call_service(&app, req).await, "SELLER_NOT_FOUND", StatusCode::NOT_FOUND).await;

    Ok(())
}

#[actix_web::test]
async fn rating_requires_sign_in() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::put()
        .uri(&format!("/api/sellers/{}/rating", seller.id))
        .set_json(json!({ "score": 4 }))
        .to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "UNAUTHORIZED_MISSING_BEARER",
        StatusCode::UNAUTHORIZED,
    )
    .await;

    Ok(())
}
