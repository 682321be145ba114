//! User repository functions (generic over ConnectionTrait).

use sea_orm::ConnectionTrait;
use time::OffsetDateTime;

use crate::adapters::users_sea as users_adapter;
use crate::adapters::users_sea::{CredentialsCreate, ProfileUpdate, UserCreate};
use crate::errors::domain::DomainError;

#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub sub: String,
    pub display_name: String,
    pub phone: Option<String>,
    pub city_label: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserCredentials {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub provider_sub: Option<String>,
    pub last_login: Option<OffsetDateTime>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

pub async fn find_credentials_by_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
) -> Result<Option<UserCredentials>, DomainError> {
    let credential = users_adapter::find_credentials_by_email(conn, email).await?;
    Ok(credential.map(UserCredentials::from))
}

pub async fn find_credentials_by_user_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<UserCredentials>, DomainError> {
    let credential = users_adapter::find_credentials_by_user_id(conn, user_id).await?;
    Ok(credential.map(UserCredentials::from))
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    sub: &str,
    display_name: &str,
) -> Result<User, DomainError> {
    let user = users_adapter::create_user(conn, UserCreate::new(sub, display_name)).await?;
    Ok(User::from(user))
}

pub async fn create_credentials<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    email: &str,
    provider_sub: Option<&str>,
) -> Result<UserCredentials, DomainError> {
    let mut dto = CredentialsCreate::new(user_id, email);
    if let Some(sub) = provider_sub {
        dto = dto.with_provider_sub(sub);
    }
    let credential = users_adapter::create_credentials(conn, dto).await?;
    Ok(UserCredentials::from(credential))
}

pub async fn record_login<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    credentials_id: i64,
    link_provider_sub: Option<&str>,
) -> Result<(), DomainError> {
    users_adapter::record_login(conn, credentials_id, link_provider_sub.map(str::to_string))
        .await?;
    Ok(())
}

pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<User>, DomainError> {
    let user = users_adapter::find_user_by_id(conn, user_id).await?;
    Ok(user.map(User::from))
}

pub async fn find_users_by_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_ids: Vec<i64>,
) -> Result<Vec<User>, DomainError> {
    let users = users_adapter::find_users_by_ids(conn, user_ids).await?;
    Ok(users.into_iter().map(User::from).collect())
}

pub async fn find_user_by_sub<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    sub: &str,
) -> Result<Option<User>, DomainError> {
    let user = users_adapter::find_user_by_sub(conn, sub).await?;
    Ok(user.map(User::from))
}

pub async fn update_profile<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    update: ProfileUpdate,
) -> Result<User, DomainError> {
    let updated = users_adapter::update_profile(conn, user_id, update).await?;
    Ok(User::from(updated))
}

// Conversions between SeaORM models and domain models

impl From<crate::entities::users::Model> for User {
    fn from(model: crate::entities::users::Model) -> Self {
        Self {
            id: model.id,
            sub: model.sub,
            display_name: model.display_name,
            phone: model.phone,
            city_label: model.city_label,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<crate::entities::user_credentials::Model> for UserCredentials {
    fn from(model: crate::entities::user_credentials::Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            email: model.email,
            provider_sub: model.provider_sub,
            last_login: model.last_login,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
