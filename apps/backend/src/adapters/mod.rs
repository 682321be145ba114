//! SeaORM adapters. Functions here return `DbErr`; repos translate to `DomainError`.

pub mod ads_sea;
pub mod favorites_sea;
pub mod ratings_sea;
pub mod users_sea;
pub mod views_sea;
