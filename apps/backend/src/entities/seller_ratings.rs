use sea_orm::entity::prelude::*;
use time::OffsetDateTime;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "seller_ratings")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub seller_id: i64,
    pub rater_id: i64,
    /// 1..=5
    pub score: i16,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::SellerId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Seller,
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::RaterId",
        to = "super::users::Column::Id",
        on_delete = "Cascade"
    )]
    Rater,
}

impl ActiveModelBehavior for ActiveModel {}
