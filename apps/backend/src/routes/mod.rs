use actix_web::{error, web, HttpRequest};

use crate::error::AppError;
use crate::errors::ErrorCode;
use crate::middleware::JwtExtract;

pub mod ads;
pub mod auth;
pub mod catalog;
pub mod favorites;
pub mod health;
pub mod me;
pub mod sellers;

fn query_error(err: error::QueryPayloadError, _req: &HttpRequest) -> actix_web::Error {
    AppError::bad_request(ErrorCode::BadRequest, format!("Invalid query string: {err}")).into()
}

fn path_error(err: error::PathError, _req: &HttpRequest) -> actix_web::Error {
    AppError::bad_request(ErrorCode::BadRequest, format!("Invalid path parameter: {err}")).into()
}

/// Render `web::Query` and `web::Path` failures as problem+json.
pub fn configure_extractors(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::QueryConfig::default().error_handler(query_error))
        .app_data(web::PathConfig::default().error_handler(path_error));
}

/// Everything mounted under `/api` except `/api/auth`.
pub fn configure_api(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/catalog").configure(catalog::configure_routes))
        .service(web::scope("/ads").configure(ads::configure_routes))
        .service(web::scope("/sellers").configure(sellers::configure_routes))
        .service(web::scope("/favorites").configure(favorites::configure_routes))
        .service(
            web::scope("/me")
                .wrap(JwtExtract)
                .configure(me::configure_routes),
        );
}

/// All routes without rate limiting, for tests and embedding.
///
/// `main.rs` mounts the same scopes but wraps `/api/auth` and `/api` in their
/// rate limiters.
pub fn configure(cfg: &mut web::ServiceConfig) {
    configure_extractors(cfg);
    cfg.service(web::scope("/health").configure(health::configure_routes))
        .service(web::scope("/api/auth").configure(auth::configure_routes))
        .service(web::scope("/api").configure(configure_api));
}
