use actix_web::http::header::{AUTHORIZATION, ETAG, LOCATION};
use actix_web::http::StatusCode;
use actix_web::test;
use serde_json::{json, Value};

use crate::common::{assert_problem, assert_problem_detail};
use crate::support::factory::create_test_user;
use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn create_ad_returns_created_with_etag() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::post()
        .uri("/api/ads")
        .insert_header((AUTHORIZATION, seller.bearer.clone()))
        .set_json(json!({
            "title": "  Vintage road bike ",
            "description": "Steel frame",
            "price": 25000,
            "category": "goods",
            "subcategory": "hobby",
            "city_label": "denver",
            "photos": ["https://img.example/a.jpg", "https://img.example/b.jpg"],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let location = resp.headers().get(LOCATION).unwrap().to_str()?.to_string();
    let etag = resp.headers().get(ETAG).unwrap().to_str()?.to_string();
    let body: Value = test::read_body_json(resp).await;

    let id = body["id"].as_i64().unwrap();
    assert_eq!(location, format!("/api/ads/{id}"));
    assert_eq!(etag, format!("\"ad-{id}-v0\""));
    assert_eq!(body["title"], "Vintage road bike");
    assert_eq!(body["seller_id"], seller.id);
    assert_eq!(body["currency"], "USD");
    assert_eq!(body["status"], "ACTIVE");
    assert_eq!(body["views_count"], 0);
    assert_eq!(body["photos"].as_array().unwrap().len(), 2);

    Ok(())
}

#[actix_web::test]
async fn create_ad_requires_sign_in() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::post()
        .uri("/api/ads")
        .set_json(json!({ "title": "Lamp", "category": "goods", "city_label": "denver" }))
        .to_request();
    assert_problem(
        test::call_service(&app, req).await,
        "UNAUTHORIZED_MISSING_BEARER",
        StatusCode::UNAUTHORIZED,
    )
    .await;

    Ok(())
}

#[actix_web::test]
async fn create_ad_rejects_invalid_fields() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let seller = create_test_user(&state, "seller").await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let cases = [
        (json!({ "title": "ab", "category": "goods", "city_label": "denver" }), "INVALID_TITLE"),
        (
            json!({ "title": "Lamp", "price": -1, "category": "goods", "city_label": "denver" }),
            "INVALID_PRICE",
        ),
        (json!({ "title": "Lamp", "category": "pets", "city_label": "denver" }), "INVALID_CATEGORY"),
        (
            json!({ "title": "Lamp", "category": "goods", "subcategory": "cars", "city_label": "denver" }),
            "INVALID_SUBCATEGORY",
        ),
        (json!({ "title": "Lamp", "category": "goods", "city_label": "atlantis" }), "UNKNOWN_CITY"),
        (
            json!({ "title": "Lamp", "category": "goods", "city_label": "denver", "photos": ["ftp://x"] }),
            "INVALID_PHOTOS",
        ),
    ];

    for (body, code) in cases {
        let req = test::TestRequest::post()
            .uri("/api/ads")
            .insert_header((AUTHORIZATION, seller.bearer.clone()))
            .set_json(body)
            .to_request();
        assert_problem(test::call_service(&app, req).await, code, StatusCode::BAD_REQUEST).await;
    }

    let req = test::TestRequest::post()
        .uri("/api/ads")
        .insert_header((AUTHORIZATION, seller.bearer))
        .set_json(json!({ "title": "Lamp", "category": "goods", "city_label": "denver", "colour": "red" }))
        .to_request();
    assert_problem_detail(
        test::call_service(&app, req).await,
        "BAD_REQUEST",
        StatusCode::BAD_REQUEST,
        "wrong types",
    )
    .await;

    Ok(())
}
