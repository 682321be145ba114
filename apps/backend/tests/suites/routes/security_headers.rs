use actix_web::http::header;
use actix_web::test;

use crate::support::{build_test_state, create_test_app};

#[actix_web::test]
async fn api_responses_carry_security_headers() -> Result<(), Box<dyn std::error::Error>> {
    let state = build_test_state().await?;
    let app = create_test_app(state).with_prod_routes().build().await;

    // Success and error responses alike
    for uri in ["/api/catalog/categories", "/api/ads/999999"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        let headers = resp.headers();

        assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff", "{uri}");
        assert_eq!(headers.get("x-frame-options").unwrap(), "DENY", "{uri}");
        assert!(headers.contains_key("content-security-policy"), "{uri}");
        assert!(headers.contains_key("strict-transport-security"), "{uri}");
        assert_eq!(headers.get(header::CACHE_CONTROL).unwrap(), "no-store", "{uri}");
    }

    Ok(())
}
