use std::sync::Arc;

use actix_web::{test, web};
use bazaar_backend::catalog::cities::{City, CityDirectory};
use bazaar_backend::routes;
use serde_json::Value;

use crate::support::create_test_app;
use crate::support::test_state::test_state_builder;

#[actix_web::test]
async fn builder_uses_injected_city_directory() -> Result<(), Box<dyn std::error::Error>> {
    let cities = CityDirectory::from_cities(vec![City {
        label: "springfield".to_string(),
        name: "Springfield".to_string(),
        region: "Illinois".to_string(),
        lat: 39.7817,
        lon: -89.6501,
        population: 114_394,
    }])?;
    let state = test_state_builder()?.with_cities(Arc::new(cities)).build().await?;
    assert!(state.db.is_some());
    assert_eq!(state.cities.len(), 1);

    let app = create_test_app(state)
        .with_routes(|cfg| {
            cfg.service(web::scope("/api/catalog").configure(routes::catalog::configure_routes));
        })
        .build()
        .await;

    let req = test::TestRequest::get().uri("/api/catalog/cities").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let labels: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["label"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["springfield"]);

    Ok(())
}
