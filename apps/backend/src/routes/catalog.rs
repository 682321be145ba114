use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::catalog::categories::Category;
use crate::catalog::cities::City;
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind};
use crate::state::app_state::AppState;

#[derive(Debug, Serialize)]
struct CategoryResponse {
    slug: &'static str,
    subcategories: &'static [&'static str],
}

#[derive(Debug, Deserialize)]
struct NearestQuery {
    lat: f64,
    lon: f64,
}

fn city_not_found(detail: String) -> AppError {
    DomainError::not_found(NotFoundKind::City, detail).into()
}

/// GET /api/catalog/cities, most populous first.
async fn list_cities(app_state: web::Data<AppState>) -> Result<web::Json<Vec<City>>, AppError> {
    Ok(web::Json(app_state.cities.all().cloned().collect()))
}

async fn get_city(
    label: web::Path<String>,
    app_state: web::Data<AppState>,
) -> Result<web::Json<City>, AppError> {
    let label = label.into_inner();
    app_state
        .cities
        .get(&label)
        .cloned()
        .map(web::Json)
        .ok_or_else(|| city_not_found(format!("City '{label}' not found")))
}

/// GET /api/catalog/cities/nearest?lat=..&lon=..
async fn nearest_city(
    query: web::Query<NearestQuery>,
    app_state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let nearest = app_state
        .cities
        .nearest(query.lat, query.lon)?
        .ok_or_else(|| city_not_found("No cities are configured".to_string()))?;
    Ok(HttpResponse::Ok().json(nearest))
}

async fn list_categories() -> web::Json<Vec<CategoryResponse>> {
    web::Json(
        Category::ALL
            .iter()
            .map(|c| CategoryResponse {
                slug: c.slug(),
                subcategories: c.subcategories(),
            })
            .collect(),
    )
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource("/cities").route(web::get().to(list_cities)))
        .service(web::resource("/cities/nearest").route(web::get().to(nearest_city)))
        .service(web::resource("/cities/{label}").route(web::get().to(get_city)))
        .service(web::resource("/categories").route(web::get().to(list_categories)));
}
