use actix_extensible_rate_limit::backend::memory::InMemoryBackend;
use actix_extensible_rate_limit::RateLimiter;
use actix_web::{web, App, HttpServer};
use bazaar_backend::config::app::Config;
use bazaar_backend::extractors::validated_json::JsonLimit;
use bazaar_backend::infra::state::build_state;
use bazaar_backend::middleware::cors::cors_middleware;
use bazaar_backend::middleware::rate_limit::{api_rate_limit_config, auth_rate_limit_config};
use bazaar_backend::middleware::{RequestTrace, SecurityHeaders, StructuredLogger, TraceSpan};
use bazaar_backend::routes;
use tracing::{error, info};

mod telemetry;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    telemetry::init_tracing();

    // Environment variables come from the runtime (docker env_file or a sourced .env).
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let app_state = match build_state()
        .with_env(config.runtime_env)
        .with_db(config.db_kind)
        .with_security(config.security())
        .build()
        .await
    {
        Ok(state) => state,
        Err(e) => {
            error!(error = %e, "failed to build application state");
            std::process::exit(1);
        }
    };

    info!(
        host = %config.host,
        port = config.port,
        db_kind = ?config.db_kind,
        cities = app_state.cities.len(),
        "Starting Bazaar backend"
    );

    let data = web::Data::new(app_state);
    let json_limit = JsonLimit(config.max_json_payload_size);

    // Counters live outside the factory so all workers share them.
    let auth_backend = InMemoryBackend::builder().build();
    let api_backend = InMemoryBackend::builder().build();

    HttpServer::new(move || {
        let auth_limiter =
            RateLimiter::builder(auth_backend.clone(), auth_rate_limit_config().build())
                .add_headers()
                .build();
        let api_limiter =
            RateLimiter::builder(api_backend.clone(), api_rate_limit_config().build())
                .add_headers()
                .build();

        App::new()
            .wrap(SecurityHeaders)
            .wrap(cors_middleware())
            .wrap(StructuredLogger)
            .wrap(TraceSpan)
            .wrap(RequestTrace)
            .app_data(data.clone())
            .app_data(json_limit)
            .configure(routes::configure_extractors)
            .service(web::scope("/health").configure(routes::health::configure_routes))
            .service(
                web::scope("/api/auth")
                    .wrap(auth_limiter)
                    .configure(routes::auth::configure_routes),
            )
            .service(
                web::scope("/api")
                    .wrap(api_limiter)
                    .configure(routes::configure_api),
            )
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
