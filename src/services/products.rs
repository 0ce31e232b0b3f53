use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, QueryOrder,
};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::entities::product;
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "SKU must not be empty"))]
    pub sku: String,
    pub supplier_barcode: Option<String>,
    #[validate(length(min = 1, message = "Manufacturer item name must not be empty"))]
    pub manufacturer_item_name: String,
    pub internal_item_name: Option<String>,
    pub category: Option<String>,
    #[serde(default)]
    pub current_stock: i32,
    #[serde(default = "default_min_threshold")]
    pub min_threshold: i32,
}

fn default_min_threshold() -> i32 {
    10
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct ProductPatch {
    pub supplier_barcode: Option<String>,
    pub manufacturer_item_name: Option<String>,
    pub internal_item_name: Option<String>,
    pub category: Option<String>,
    pub min_threshold: Option<i32>,
}

/// Catalog service. Stock quantities are read here but never written;
/// mutations go through receiving and issuance so the ledger stays complete.
#[derive(Clone)]
pub struct ProductService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ProductService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<product::Model>, ServiceError> {
        let products = product::Entity::find()
            .order_by_asc(product::Column::Id)
            .all(&*self.db)
            .await?;
        Ok(products)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<product::Model, ServiceError> {
        product::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product {} not found", id)))
    }

    /// Scanner lookup: matches the internal SKU first, then the supplier
    /// barcode printed on the carton.
    #[instrument(skip(self))]
    pub async fn get_by_code(&self, code: &str) -> Result<product::Model, ServiceError> {
        product::Entity::find()
            .filter(
                Condition::any()
                    .add(product::Column::Sku.eq(code))
                    .add(product::Column::SupplierBarcode.eq(code)),
            )
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Product with code {} not found", code)))
    }

    #[instrument(skip(self, input))]
    pub async fn create(&self, input: NewProduct) -> Result<product::Model, ServiceError> {
        let existing = product::Entity::find()
            .filter(product::Column::Sku.eq(input.sku.as_str()))
            .one(&*self.db)
            .await?;
        if existing.is_some() {
            return Err(ServiceError::InvalidOperation(format!(
                "Product with SKU {} already exists",
                input.sku
            )));
        }

        let model = product::ActiveModel {
            sku: Set(input.sku),
            supplier_barcode: Set(input.supplier_barcode),
            manufacturer_item_name: Set(input.manufacturer_item_name),
            internal_item_name: Set(input.internal_item_name),
            category: Set(input.category),
            current_stock: Set(input.current_stock),
            min_threshold: Set(input.min_threshold),
            ..Default::default()
        };

        let created = model.insert(&*self.db).await?;
        info!(product_id = created.id, sku = %created.sku, "Product created");
        self.event_sender
            .send_or_log(Event::ProductCreated(created.id))
            .await;
        Ok(created)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: i32,
        patch: ProductPatch,
    ) -> Result<product::Model, ServiceError> {
        let existing = self.get(id).await?;

        let mut model: product::ActiveModel = existing.into();
        if let Some(barcode) = patch.supplier_barcode {
            model.supplier_barcode = Set(Some(barcode));
        }
        if let Some(name) = patch.manufacturer_item_name {
            model.manufacturer_item_name = Set(name);
        }
        if let Some(name) = patch.internal_item_name {
            model.internal_item_name = Set(Some(name));
        }
        if let Some(category) = patch.category {
            model.category = Set(Some(category));
        }
        if let Some(threshold) = patch.min_threshold {
            model.min_threshold = Set(threshold);
        }

        let updated = model.update(&*self.db).await?;
        self.event_sender
            .send_or_log(Event::ProductUpdated(updated.id))
            .await;
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;
        let model: product::ActiveModel = existing.into();
        model.delete(&*self.db).await?;

        info!(product_id = id, "Product deleted");
        self.event_sender
            .send_or_log(Event::ProductDeleted(id))
            .await;
        Ok(())
    }

    /// Products at or below their reorder threshold.
    #[instrument(skip(self))]
    pub async fn low_stock(&self) -> Result<Vec<product::Model>, ServiceError> {
        let products = self.list().await?;
        Ok(products
            .into_iter()
            .filter(|p| p.current_stock <= p.min_threshold)
            .collect())
    }
}
