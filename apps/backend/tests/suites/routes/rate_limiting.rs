use std::net::SocketAddr;

use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_extensible_rate_limit::RateLimiter;
use actix_web::{test, web, App, HttpResponse};
use bazaar_backend::middleware::rate_limit::{api_rate_limit_config, auth_rate_limit_config};
use bazaar_backend::middleware::request_trace::RequestTrace;
use bazaar_backend::middleware::structured_logger::StructuredLogger;
use bazaar_backend::middleware::trace_span::TraceSpan;

async fn ok_handler() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

fn peer(ip: &str) -> SocketAddr {
    format!("{ip}:40000").parse().unwrap()
}

#[actix_web::test]
async fn auth_limit_is_per_client_ip() -> Result<(), Box<dyn std::error::Error>> {
    let backend = InMemoryBackend::builder().build();
    let limiter = RateLimiter::builder(backend, auth_rate_limit_config().build())
        .add_headers()
        .build();

    let app = test::init_service(
        App::new()
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .service(
                web::scope("/api/auth")
                    .wrap(limiter)
                    .route("/login", web::post().to(ok_handler)),
            ),
    )
    .await;

    for i in 0..5 {
        let req = test::TestRequest::post()
            .uri("/api/auth/login")
            .peer_addr(peer("10.0.0.1"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200, "request {} should pass", i + 1);
        assert!(resp.headers().contains_key("x-ratelimit-remaining"));
    }

    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(peer("10.0.0.1"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 429);

    // Another client still has its full allowance.
    let req = test::TestRequest::post()
        .uri("/api/auth/login")
        .peer_addr(peer("10.0.0.2"))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status().as_u16(), 200);

    Ok(())
}

#[actix_web::test]
async fn api_limit_allows_normal_browsing() -> Result<(), Box<dyn std::error::Error>> {
    let backend = InMemoryBackend::builder().build();
    let limiter = RateLimiter::builder(backend, api_rate_limit_config().build())
        .add_headers()
        .build();

    let app = test::init_service(
        App::new()
            .wrap(RequestTrace)
            .service(web::scope("/api").wrap(limiter).route("/ads", web::get().to(ok_handler))),
    )
    .await;

    for _ in 0..20 {
        let req = test::TestRequest::get()
            .uri("/api/ads")
            .peer_addr(peer("10.0.0.3"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 200);
    }

    Ok(())
}
