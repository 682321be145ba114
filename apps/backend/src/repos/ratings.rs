use sea_orm::ConnectionTrait;
use serde::Serialize;

use crate::adapters::ratings_sea;
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RatingSummary {
    /// Mean score rounded to two decimals; `None` when unrated
    pub average: Option<f64>,
    pub count: i64,
}

impl RatingSummary {
    pub fn from_totals(sum: i64, count: i64) -> Self {
        let average = (count > 0).then(|| ((sum as f64 / count as f64) * 100.0).round() / 100.0);
        Self { average, count }
    }
}

pub async fn upsert<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
    rater_id: i64,
    score: i16,
) -> Result<(), DomainError> {
    ratings_sea::upsert(conn, seller_id, rater_id, score).await?;
    Ok(())
}

pub async fn summary<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    seller_id: i64,
) -> Result<RatingSummary, DomainError> {
    let (sum, count) = ratings_sea::totals(conn, seller_id).await?;
    Ok(RatingSummary::from_totals(sum, count))
}
