use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// One physical receipt against a purchase request item. Append-only; an
/// item may accumulate many partial receipts.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "receiving_transactions")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub purchase_request_item_id: i32,
    pub received_qty: i32,
    pub received_date: DateTimeUtc,
    pub received_by: Option<String>,
    pub is_damaged: bool,
    pub damage_notes: Option<String>,
    pub photo_url: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::purchase_request_item::Entity",
        from = "Column::PurchaseRequestItemId",
        to = "super::purchase_request_item::Column::Id"
    )]
    Item,
}

impl Related<super::purchase_request_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Item.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
