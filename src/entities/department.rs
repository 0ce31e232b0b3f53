use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Requesting department. Static reference data.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "departments")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub is_it_department: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::transaction_history::Entity")]
    TransactionHistory,
    #[sea_orm(has_many = "super::toner_consumption::Entity")]
    TonerConsumption,
}

impl Related<super::transaction_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionHistory.def()
    }
}

impl Related<super::toner_consumption::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TonerConsumption.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
