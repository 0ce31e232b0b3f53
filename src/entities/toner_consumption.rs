use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Consumption sample recorded for consumable issuances. Append-only except
/// for `is_flagged`, which an operator may dismiss back to false.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "toner_consumption")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub product_id: i32,
    pub dept_id: i32,
    pub quantity: i32,
    pub consumption_date: DateTimeUtc,
    pub requested_by: Option<String>,
    pub approved_by: Option<String>,
    pub is_flagged: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id"
    )]
    Product,
    #[sea_orm(
        belongs_to = "super::department::Entity",
        from = "Column::DeptId",
        to = "super::department::Column::Id"
    )]
    Department,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl Related<super::department::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Department.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
