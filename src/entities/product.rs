use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Categories whose issuances are recorded as consumption samples and
/// screened by the abuse detector.
pub const CONSUMABLE_CATEGORIES: [&str; 3] = ["Toner", "Ribbon", "Rollos"];

/// Catalog product. `current_stock` is only ever mutated through
/// `services::stock::adjust_stock` so that it stays in step with the ledger.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub sku: String,
    pub supplier_barcode: Option<String>,
    pub manufacturer_item_name: String,
    pub internal_item_name: Option<String>,
    pub category: Option<String>,
    pub current_stock: i32,
    pub min_threshold: i32,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::purchase_request_item::Entity")]
    PurchaseRequestItems,
    #[sea_orm(has_many = "super::transaction_history::Entity")]
    TransactionHistory,
    #[sea_orm(has_many = "super::toner_consumption::Entity")]
    TonerConsumption,
}

impl Related<super::purchase_request_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PurchaseRequestItems.def()
    }
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

impl Model {
    /// Whether issuances of this product produce consumption samples.
    pub fn is_consumable(&self) -> bool {
        self.category
            .as_deref()
            .map_or(false, |c| CONSUMABLE_CATEGORIES.contains(&c))
    }
}
