use sea_orm::ConnectionTrait;
use tracing::info;

use crate::domain::profile_rules::validate_score;
use crate::error::AppError;
use crate::errors::domain::{DomainError, NotFoundKind, ValidationKind};
use crate::repos::ads;
use crate::repos::ratings::{self, RatingSummary};
use crate::repos::users::{self, User};

#[derive(Debug, Clone, PartialEq)]
pub struct SellerProfile {
    pub user: User,
    pub rating: RatingSummary,
    pub active_ads: u64,
}

async fn require_seller<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
) -> Result<User, AppError> {
    users::find_user_by_id(conn, seller_id).await?.ok_or_else(|| {
        DomainError::not_found(NotFoundKind::Seller, format!("Seller {seller_id} not found")).into()
    })
}

pub async fn seller_profile<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
) -> Result<SellerProfile, AppError> {
    let user = require_seller(conn, seller_id).await?;
    let rating = ratings::summary(conn, seller_id).await?;
    let active_ads = ads::count_active_by_seller(conn, seller_id).await?;

    Ok(SellerProfile {
        user,
        rating,
        active_ads,
    })
}

/// Record `rater_id`'s score for a seller, replacing any earlier score.
pub async fn rate_seller<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
    rater_id: i64,
    score: i64,
) -> Result<RatingSummary, AppError> {
    if seller_id == rater_id {
        return Err(DomainError::validation(ValidationKind::SelfRating, "You cannot rate yourself").into());
    }
    let score = validate_score(score)?;
    require_seller(conn, seller_id).await?;

    ratings::upsert(conn, seller_id, rater_id, score).await?;
    info!(seller_id, rater_id, score, "Seller rated");

    Ok(ratings::summary(conn, seller_id).await?)
}
