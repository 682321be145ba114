use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test;
use bazaar_backend::catalog::cities::CityDirectory;
use bazaar_backend::{AppState, SecurityConfig};
use serde_json::Value;

use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn health_reports_database_and_migrations() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["db"], "ok");
    assert_eq!(body["app_version"], env!("CARGO_PKG_VERSION"));
    assert!(body["migrations"].as_str().unwrap().starts_with("m2026"));
    assert!(body["time"].is_string());

    Ok(())
}

#[actix_web::test]
async fn health_without_database_is_unavailable() -> Result<(), Box<dyn std::error::Error>> {
    let cities = Arc::new(CityDirectory::load_embedded()?);
    let state = AppState::new_without_db(SecurityConfig::default(), cities);
    let app = create_test_app(state).with_prod_routes().build().await;

    let req = test::TestRequest::get().uri("/health").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["db"], "unavailable");

    Ok(())
}
