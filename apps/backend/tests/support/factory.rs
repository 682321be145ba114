//! Seed data written straight through the repos, outside any request.

use backend_test_support::unique_helpers::{unique_email, unique_str};
use bazaar_backend::db::require_db;
use bazaar_backend::domain::ad_rules::RawAd;
use bazaar_backend::repos::ads::Ad;
use bazaar_backend::repos::users;
use bazaar_backend::services::ads as ad_service;
use bazaar_backend::state::app_state::AppState;
use bazaar_backend::AppError;

use super::auth::bearer_header;

#[derive(Debug, Clone)]
pub struct TestUser {
    pub id: i64,
    pub sub: String,
    pub email: String,
    /// Ready-to-send `Authorization` value
    pub bearer: String,
}

pub async fn create_test_user(state: &AppState, prefix: &str) -> Result<TestUser, AppError> {
    let db = require_db(state)?;
    let sub = unique_str(prefix);
    let email = unique_email(prefix).to_lowercase();

    let user = users::create_user(db, &sub, &format!("{prefix} seller")).await?;
    users::create_credentials(db, user.id, &email, Some(&sub)).await?;

    Ok(TestUser {
        id: user.id,
        bearer: bearer_header(&sub, &email, &state.security),
        sub,
        email,
    })
}

/// A valid ad in Denver's electronics section.
pub fn raw_ad(title: &str) -> RawAd {
    RawAd {
        title: title.to_string(),
        description: Some(format!("{title} in good condition")),
        price: Some(100),
        currency: None,
        category: "goods".to_string(),
        subcategory: Some("electronics".to_string()),
        city_label: "denver".to_string(),
        photos: Some(vec!["https://img.example/1.jpg".to_string()]),
    }
}

pub async fn create_test_ad(state: &AppState, seller_id: i64, raw: RawAd) -> Result<Ad, AppError> {
    let db = require_db(state)?;
    ad_service::create_ad(db, seller_id, raw, &state.cities).await
}
