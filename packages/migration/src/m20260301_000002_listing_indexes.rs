use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::Index;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Ads {
    Table,
    Status,
    CityLabel,
    Category,
    SellerId,
    CreatedAt,
}

#[derive(Iden)]
enum Favorites {
    Table,
    UserId,
    DeviceToken,
}

// (index name, table)
const INDEXES: &[(&str, &str)] = &[
    ("idx_ads_status_city_category", "ads"),
    ("idx_ads_seller_id", "ads"),
    ("idx_ads_created_at", "ads"),
    ("idx_favorites_user_id", "favorites"),
    ("idx_favorites_device_token", "favorites"),
];

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Listing filter: status is always constrained, city/category usually are
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[0].0)
                    .table(Ads::Table)
                    .col(Ads::Status)
                    .col(Ads::CityLabel)
                    .col(Ads::Category)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[1].0)
                    .table(Ads::Table)
                    .col(Ads::SellerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[2].0)
                    .table(Ads::Table)
                    .col(Ads::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[3].0)
                    .table(Favorites::Table)
                    .col(Favorites::UserId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name(INDEXES[4].0)
                    .table(Favorites::Table)
                    .col(Favorites::DeviceToken)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        for (name, table) in INDEXES.iter().rev() {
            manager
                .drop_index(Index::drop().name(*name).table(Alias::new(*table)).to_owned())
                .await?;
        }
        Ok(())
    }
}
