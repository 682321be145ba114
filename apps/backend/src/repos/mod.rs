//! Repositories: domain models over the SeaORM adapters, errors as `DomainError`.

pub mod ads;
pub mod favorites;
pub mod ratings;
pub mod users;
pub mod views;
