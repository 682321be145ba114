//! SeaORM adapter for users and their login credentials.

use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, NotSet, QueryFilter, Set,
};
use time::OffsetDateTime;

use crate::entities::{user_credentials, users};

pub mod dto;

pub use dto::{CredentialsCreate, ProfileUpdate, UserCreate};

// Adapter functions return DbErr; repos map to DomainError via From<DbErr>.

pub async fn find_credentials_by_email<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    email: &str,
) -> Result<Option<user_credentials::Model>, sea_orm::DbErr> {
    user_credentials::Entity::find()
        .filter(user_credentials::Column::Email.eq(email))
        .one(conn)
        .await
}

pub async fn find_credentials_by_user_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<user_credentials::Model>, sea_orm::DbErr> {
    user_credentials::Entity::find()
        .filter(user_credentials::Column::UserId.eq(user_id))
        .one(conn)
        .await
}

pub async fn create_user<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: UserCreate,
) -> Result<users::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    users::ActiveModel {
        id: NotSet,
        sub: Set(dto.sub),
        display_name: Set(dto.display_name),
        phone: Set(None),
        city_label: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

pub async fn create_credentials<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    dto: CredentialsCreate,
) -> Result<user_credentials::Model, sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();
    user_credentials::ActiveModel {
        id: NotSet,
        user_id: Set(dto.user_id),
        email: Set(dto.email),
        provider_sub: Set(dto.provider_sub),
        last_login: Set(Some(now)),
        created_at: Set(now),
        updated_at: Set(now),
    }
    .insert(conn)
    .await
}

/// Stamp `last_login`, and link `provider_sub` when the row has none yet.
pub async fn record_login<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    credentials_id: i64,
    provider_sub: Option<String>,
) -> Result<(), sea_orm::DbErr> {
    let now = OffsetDateTime::now_utc();

    user_credentials::Entity::update_many()
        .col_expr(user_credentials::Column::LastLogin, Expr::val(Some(now)).into())
        .col_expr(user_credentials::Column::UpdatedAt, Expr::val(now).into())
        .filter(user_credentials::Column::Id.eq(credentials_id))
        .exec(conn)
        .await?;

    if let Some(sub) = provider_sub {
        user_credentials::Entity::update_many()
            .col_expr(user_credentials::Column::ProviderSub, Expr::val(Some(sub)).into())
            .filter(user_credentials::Column::Id.eq(credentials_id))
            .filter(user_credentials::Column::ProviderSub.is_null())
            .exec(conn)
            .await?;
    }
    Ok(())
}

pub async fn find_user_by_id<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find_by_id(user_id).one(conn).await
}

pub async fn find_users_by_ids<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_ids: Vec<i64>,
) -> Result<Vec<users::Model>, sea_orm::DbErr> {
    if user_ids.is_empty() {
        return Ok(Vec::new());
    }
    users::Entity::find()
        .filter(users::Column::Id.is_in(user_ids))
        .all(conn)
        .await
}

pub async fn find_user_by_sub<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    sub: &str,
) -> Result<Option<users::Model>, sea_orm::DbErr> {
    users::Entity::find()
        .filter(users::Column::Sub.eq(sub))
        .one(conn)
        .await
}

pub async fn update_profile<C: ConnectionTrait + Send + Sync>(
    conn: &C,
    user_id: i64,
    dto: ProfileUpdate,
) -> Result<users::Model, sea_orm::DbErr> {
    let mut update = users::Entity::update_many()
        .col_expr(users::Column::UpdatedAt, Expr::val(OffsetDateTime::now_utc()).into())
        .filter(users::Column::Id.eq(user_id));

    if let Some(name) = dto.display_name {
        update = update.col_expr(users::Column::DisplayName, Expr::val(name).into());
    }
    if let Some(phone) = dto.phone {
        update = update.col_expr(users::Column::Phone, Expr::val(phone).into());
    }
    if let Some(city) = dto.city_label {
        update = update.col_expr(users::Column::CityLabel, Expr::val(city).into());
    }
    update.exec(conn).await?;

    find_user_by_id(conn, user_id)
        .await?
        .ok_or_else(|| sea_orm::DbErr::RecordNotFound("user".to_string()))
}
