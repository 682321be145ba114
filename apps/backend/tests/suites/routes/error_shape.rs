use actix_web::test;
use serde_json::Value;

use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn errors_are_problem_json_with_trace_id() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/api/ads/999999").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    let headers = resp.headers().clone();
    assert_eq!(
        headers.get("content-type").and_then(|v| v.to_str().ok()),
        Some("application/problem+json")
    );
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(!request_id.is_empty());

    let problem: Value = test::read_body_json(resp).await;
    for key in ["type", "title", "status", "detail", "code", "trace_id"] {
        assert!(problem.get(key).is_some(), "problem is missing '{key}'");
    }
    assert_eq!(problem["status"], 404);
    assert_eq!(problem["code"], "AD_NOT_FOUND");
    assert_eq!(problem["trace_id"], request_id.as_str());
    assert!(problem["type"].as_str().unwrap().ends_with("AD_NOT_FOUND"));

    Ok(())
}

#[actix_web::test]
async fn unknown_route_is_plain_404() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/api/nothing-here").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status().as_u16(), 404);

    Ok(())
}
