use sea_orm::entity::prelude::*;
use time::Date;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "ad_views")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub ad_id: i64,
    /// `u:{user_id}`, `d:{device_token}` or `ip:{peer}`
    pub viewer_key: String,
    /// UTC day of the view
    pub viewed_on: Date,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::ads::Entity",
        from = "Column::AdId",
        to = "super::ads::Column::Id",
        on_delete = "Cascade"
    )]
    Ad,
}

impl Related<super::ads::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ad.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
