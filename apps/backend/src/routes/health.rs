use actix_web::{web, HttpResponse};
use migration::get_latest_migration_version;
use sea_orm::{ConnectionTrait, Statement};
use serde::Serialize;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::warn;

use crate::db::require_db;
use crate::error::AppError;
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    app_version: &'static str,
    db: &'static str,
    migrations: String,
    time: String,
}

/// Liveness plus a `SELECT 1` round trip. 503 when the database does not answer.
async fn health(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let time = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "unknown".to_string());

    let (db, migrations) = match require_db(&app_state) {
        Ok(conn) => {
            let ping = conn
                .query_one(Statement::from_string(
                    conn.get_database_backend(),
                    "SELECT 1 AS health_check".to_string(),
                ))
                .await;
            match ping {
                Ok(_) => {
                    let migrations = match get_latest_migration_version(conn).await {
                        Ok(Some(version)) => version,
                        Ok(None) => "no_migrations".to_string(),
                        Err(_) => "unknown".to_string(),
                    };
                    ("ok", migrations)
                }
                Err(e) => {
                    warn!(error = %e, "health check query failed");
                    ("error", "unknown".to_string())
                }
            }
        }
        Err(_) => ("unavailable", "unknown".to_string()),
    };

    let healthy = db == "ok";
    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        app_version: env!("CARGO_PKG_VERSION"),
        db,
        migrations,
        time,
    };

    if healthy {
        Ok(HttpResponse::Ok().json(body))
    } else {
        Ok(HttpResponse::ServiceUnavailable().json(body))
    }
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("", web::get().to(health));
}
