use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Users {
    Table,
    Id,
    Sub,
    DisplayName,
    Phone,
    CityLabel,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserCredentials {
    Table,
    Id,
    UserId,
    Email,
    ProviderSub,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Ads {
    Table,
    Id,
    SellerId,
    Title,
    Description,
    Price,
    Currency,
    Category,
    Subcategory,
    CityLabel,
    Photos,
    Status,
    SearchText,
    ViewsCount,
    ContactReveals,
    LockVersion,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AdViews {
    Table,
    Id,
    AdId,
    ViewerKey,
    ViewedOn,
}

#[derive(Iden)]
enum Favorites {
    Table,
    Id,
    AdId,
    UserId,
    DeviceToken,
    CreatedAt,
}

#[derive(Iden)]
enum SellerRatings {
    Table,
    Id,
    SellerId,
    RaterId,
    Score,
    CreatedAt,
    UpdatedAt,
}

fn pk(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .primary_key()
        .auto_increment()
        .to_owned()
}

fn timestamp(col: impl IntoIden) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // users
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk(Users::Id))
                    .col(ColumnDef::new(Users::Sub).string().not_null())
                    .col(ColumnDef::new(Users::DisplayName).string_len(50).not_null())
                    .col(ColumnDef::new(Users::Phone).string_len(20).null())
                    .col(ColumnDef::new(Users::CityLabel).string_len(64).null())
                    .col(timestamp(Users::CreatedAt))
                    .col(timestamp(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_users_sub_unique")
                    .table(Users::Table)
                    .col(Users::Sub)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // user_credentials
        manager
            .create_table(
                Table::create()
                    .table(UserCredentials::Table)
                    .if_not_exists()
                    .col(pk(UserCredentials::Id))
                    .col(
                        ColumnDef::new(UserCredentials::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserCredentials::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(UserCredentials::ProviderSub)
                            .string()
                            .null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(UserCredentials::LastLogin)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(timestamp(UserCredentials::CreatedAt))
                    .col(timestamp(UserCredentials::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_credentials_user_id")
                            .from(UserCredentials::Table, UserCredentials::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_user_credentials_user_id")
                    .table(UserCredentials::Table)
                    .col(UserCredentials::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ads
        manager
            .create_table(
                Table::create()
                    .table(Ads::Table)
                    .if_not_exists()
                    .col(pk(Ads::Id))
                    .col(ColumnDef::new(Ads::SellerId).big_integer().not_null())
                    .col(ColumnDef::new(Ads::Title).string_len(120).not_null())
                    .col(ColumnDef::new(Ads::Description).text().not_null())
                    .col(ColumnDef::new(Ads::Price).big_integer().null())
                    .col(
                        ColumnDef::new(Ads::Currency)
                            .string_len(3)
                            .not_null()
                            .default("USD"),
                    )
                    .col(ColumnDef::new(Ads::Category).string_len(32).not_null())
                    .col(ColumnDef::new(Ads::Subcategory).string_len(32).null())
                    .col(ColumnDef::new(Ads::CityLabel).string_len(64).not_null())
                    .col(
                        ColumnDef::new(Ads::Photos)
                            .text()
                            .not_null()
                            .default("[]"),
                    )
                    .col(
                        ColumnDef::new(Ads::Status)
                            .string_len(16)
                            .not_null()
                            .default("ACTIVE"),
                    )
                    .col(ColumnDef::new(Ads::SearchText).text().not_null())
                    .col(
                        ColumnDef::new(Ads::ViewsCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Ads::ContactReveals)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Ads::LockVersion)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(timestamp(Ads::CreatedAt))
                    .col(timestamp(Ads::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ads_seller_id")
                            .from(Ads::Table, Ads::SellerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // ad_views
        manager
            .create_table(
                Table::create()
                    .table(AdViews::Table)
                    .if_not_exists()
                    .col(pk(AdViews::Id))
                    .col(ColumnDef::new(AdViews::AdId).big_integer().not_null())
                    .col(ColumnDef::new(AdViews::ViewerKey).string_len(80).not_null())
                    .col(ColumnDef::new(AdViews::ViewedOn).date().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_ad_views_ad_id")
                            .from(AdViews::Table, AdViews::AdId)
                            .to(Ads::Table, Ads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_ad_views_ad_viewer_day")
                    .table(AdViews::Table)
                    .col(AdViews::AdId)
                    .col(AdViews::ViewerKey)
                    .col(AdViews::ViewedOn)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // favorites: owned by exactly one of user_id / device_token
        manager
            .create_table(
                Table::create()
                    .table(Favorites::Table)
                    .if_not_exists()
                    .col(pk(Favorites::Id))
                    .col(ColumnDef::new(Favorites::AdId).big_integer().not_null())
                    .col(ColumnDef::new(Favorites::UserId).big_integer().null())
                    .col(ColumnDef::new(Favorites::DeviceToken).string_len(64).null())
                    .col(timestamp(Favorites::CreatedAt))
                    .check(
                        Expr::expr(Expr::col(Favorites::UserId).is_null())
                            .ne(Expr::col(Favorites::DeviceToken).is_null()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_ad_id")
                            .from(Favorites::Table, Favorites::AdId)
                            .to(Ads::Table, Ads::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_favorites_user_id")
                            .from(Favorites::Table, Favorites::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_favorites_ad_user")
                    .table(Favorites::Table)
                    .col(Favorites::AdId)
                    .col(Favorites::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_favorites_ad_device")
                    .table(Favorites::Table)
                    .col(Favorites::AdId)
                    .col(Favorites::DeviceToken)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // seller_ratings
        manager
            .create_table(
                Table::create()
                    .table(SellerRatings::Table)
                    .if_not_exists()
                    .col(pk(SellerRatings::Id))
                    .col(
                        ColumnDef::new(SellerRatings::SellerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SellerRatings::RaterId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(SellerRatings::Score)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(SellerRatings::Score).between(1, 5)),
                    )
                    .col(timestamp(SellerRatings::CreatedAt))
                    .col(timestamp(SellerRatings::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seller_ratings_seller_id")
                            .from(SellerRatings::Table, SellerRatings::SellerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_seller_ratings_rater_id")
                            .from(SellerRatings::Table, SellerRatings::RaterId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_seller_ratings_seller_rater")
                    .table(SellerRatings::Table)
                    .col(SellerRatings::SellerId)
                    .col(SellerRatings::RaterId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse dependency order
        manager
            .drop_table(Table::drop().table(SellerRatings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Favorites::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AdViews::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Ads::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserCredentials::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
