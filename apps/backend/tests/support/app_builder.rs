use actix_http::Request;
use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, App, Error};
use bazaar_backend::middleware::{RequestTrace, SecurityHeaders, StructuredLogger, TraceSpan};
use bazaar_backend::routes;
use bazaar_backend::state::app_state::AppState;

type RouteConfigFn = Box<dyn Fn(&mut web::ServiceConfig) + Send + Sync>;

/// Builds an in-process app with the production middleware stack (minus CORS
/// and rate limiting).
pub struct TestAppBuilder {
    state: AppState,
    route_config: Option<RouteConfigFn>,
}

impl TestAppBuilder {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            route_config: None,
        }
    }

    pub fn with_prod_routes(mut self) -> Self {
        self.route_config = Some(Box::new(routes::configure) as RouteConfigFn);
        self
    }

    pub fn with_routes<F>(mut self, config_fn: F) -> Self
    where
        F: Fn(&mut web::ServiceConfig) + Send + Sync + 'static,
    {
        self.route_config = Some(Box::new(config_fn) as RouteConfigFn);
        self
    }

    pub async fn build(self) -> impl Service<Request, Response = ServiceResponse<BoxBody>, Error = Error> {
        let data = web::Data::new(self.state);
        let route_config = self.route_config;

        test::init_service(
            App::new()
                .wrap(SecurityHeaders)
                .wrap(StructuredLogger)
                .wrap(TraceSpan)
                .wrap(RequestTrace)
                .app_data(data)
                .configure(move |cfg| {
                    if let Some(config_fn) = &route_config {
                        config_fn(cfg);
                    }
                }),
        )
        .await
    }
}

pub fn create_test_app(state: AppState) -> TestAppBuilder {
    TestAppBuilder::new(state)
}
