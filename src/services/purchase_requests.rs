use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::entities::{
    product,
    purchase_request::{self, RequestStatus},
    purchase_request_item::{self, ItemStatus},
    receiving_transaction,
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

// Serialize is required by the derived length check on `items`: validation
// errors embed the offending value as a parameter.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewRequestItem {
    pub product_id: i32,
    #[validate(range(min = 1, message = "Requested quantity must be positive"))]
    pub requested_qty: i32,
    pub expected_delivery_date: Option<chrono::DateTime<Utc>>,
    pub supplier_name: Option<String>,
    pub unit_price: Option<rust_decimal::Decimal>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewPurchaseRequest {
    pub requested_by: Option<String>,
    pub notes: Option<String>,
    #[validate(length(min = 1, message = "A request needs at least one item"))]
    pub items: Vec<NewRequestItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestPatch {
    pub status: Option<String>,
    pub notes: Option<String>,
}

/// A created request together with its line items.
#[derive(Debug, Serialize)]
pub struct RequestWithItems {
    #[serde(flatten)]
    pub request: purchase_request::Model,
    pub items: Vec<purchase_request_item::Model>,
}

/// A request line joined with its product, as shown on the request detail
/// screen.
#[derive(Debug, Serialize)]
pub struct ItemWithProduct {
    #[serde(flatten)]
    pub item: purchase_request_item::Model,
    pub product: Option<product::Model>,
}

/// A pending line for the receiving screen: which open requests still expect
/// delivery of a scanned product, and how much has already arrived.
#[derive(Debug, Serialize)]
pub struct PendingItem {
    #[serde(flatten)]
    pub item: purchase_request_item::Model,
    pub request_qr: Option<String>,
    pub requested_by: Option<String>,
    pub already_received: i32,
}

#[derive(Clone)]
pub struct PurchaseRequestService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl PurchaseRequestService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Creates a request header plus its items in one transaction. The QR
    /// identifier needs the row id, so the header is first inserted with a
    /// throwaway placeholder and then updated to `REQ_<id>` before commit; no
    /// placeholder is ever visible outside the transaction.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: NewPurchaseRequest,
    ) -> Result<RequestWithItems, ServiceError> {
        for item in &input.items {
            item.validate()?;
        }

        let txn = self.db.begin().await?;

        let header = purchase_request::ActiveModel {
            request_qr: Set(format!("TEMP_{}", Utc::now().timestamp_millis())),
            requested_by: Set(input.requested_by),
            request_date: Set(Utc::now()),
            status: Set(RequestStatus::Pending.as_str().to_string()),
            notes: Set(input.notes),
            ..Default::default()
        };
        let header = header.insert(&txn).await?;

        let request_qr = format!("REQ_{}", header.id);
        let mut header_update: purchase_request::ActiveModel = header.into();
        header_update.request_qr = Set(request_qr.clone());
        let header = header_update.update(&txn).await?;

        let mut items = Vec::with_capacity(input.items.len());
        for item in input.items {
            let model = purchase_request_item::ActiveModel {
                request_id: Set(Some(header.id)),
                product_id: Set(Some(item.product_id)),
                requested_qty: Set(item.requested_qty),
                expected_delivery_date: Set(item.expected_delivery_date),
                supplier_name: Set(item.supplier_name),
                unit_price: Set(item.unit_price),
                status: Set(ItemStatus::Pending.as_str().to_string()),
                ..Default::default()
            };
            items.push(model.insert(&txn).await?);
        }

        txn.commit().await?;

        info!(request_id = header.id, qr = %request_qr, "Purchase request created");
        self.event_sender
            .send_or_log(Event::PurchaseRequestCreated {
                request_id: header.id,
                request_qr,
            })
            .await;

        Ok(RequestWithItems {
            request: header,
            items,
        })
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<purchase_request::Model>, ServiceError> {
        let requests = purchase_request::Entity::find()
            .order_by_desc(purchase_request::Column::RequestDate)
            .all(&*self.db)
            .await?;
        Ok(requests)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<purchase_request::Model, ServiceError> {
        purchase_request::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Purchase request {} not found", id)))
    }

    #[instrument(skip(self))]
    pub async fn items_for_request(
        &self,
        request_id: i32,
    ) -> Result<Vec<ItemWithProduct>, ServiceError> {
        // 404 for an unknown request, not an empty list.
        self.get(request_id).await?;

        let rows = purchase_request_item::Entity::find()
            .filter(purchase_request_item::Column::RequestId.eq(request_id))
            .find_also_related(product::Entity)
            .order_by_asc(purchase_request_item::Column::Id)
            .all(&*self.db)
            .await?;

        Ok(rows
            .into_iter()
            .map(|(item, product)| ItemWithProduct { item, product })
            .collect())
    }

    /// Pending request lines for a scanned product code, each with its
    /// cumulative received quantity.
    #[instrument(skip(self))]
    pub async fn pending_items_by_code(
        &self,
        code: &str,
    ) -> Result<Vec<PendingItem>, ServiceError> {
        let product = product::Entity::find()
            .filter(
                sea_orm::Condition::any()
                    .add(product::Column::Sku.eq(code))
                    .add(product::Column::SupplierBarcode.eq(code)),
            )
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with code {} not found", code))
            })?;

        let rows = purchase_request_item::Entity::find()
            .filter(purchase_request_item::Column::ProductId.eq(product.id))
            .filter(purchase_request_item::Column::Status.eq(ItemStatus::Pending.as_str()))
            .find_also_related(purchase_request::Entity)
            .order_by_asc(purchase_request_item::Column::Id)
            .all(&*self.db)
            .await?;

        let mut pending = Vec::with_capacity(rows.len());
        for (item, request) in rows {
            let receipts = receiving_transaction::Entity::find()
                .filter(receiving_transaction::Column::PurchaseRequestItemId.eq(item.id))
                .all(&*self.db)
                .await?;
            let already_received: i32 = receipts.iter().map(|r| r.received_qty).sum();

            pending.push(PendingItem {
                item,
                request_qr: request.as_ref().map(|r| r.request_qr.clone()),
                requested_by: request.and_then(|r| r.requested_by),
                already_received,
            });
        }

        Ok(pending)
    }

    #[instrument(skip(self, patch))]
    pub async fn update(
        &self,
        id: i32,
        patch: RequestPatch,
    ) -> Result<purchase_request::Model, ServiceError> {
        let existing = self.get(id).await?;

        let mut model: purchase_request::ActiveModel = existing.into();
        if let Some(status) = patch.status {
            let status = RequestStatus::parse(&status).ok_or_else(|| {
                ServiceError::ValidationError(format!("Unknown request status: {}", status))
            })?;
            model.status = Set(status.as_str().to_string());
        }
        if let Some(notes) = patch.notes {
            model.notes = Set(Some(notes));
        }

        let updated = model.update(&*self.db).await?;
        Ok(updated)
    }

    /// Deletes a request with its items and their receiving records. Ledger
    /// entries referencing the request are kept; the audit trail outlives the
    /// request itself.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        let existing = self.get(id).await?;

        let txn = self.db.begin().await?;

        let items = purchase_request_item::Entity::find()
            .filter(purchase_request_item::Column::RequestId.eq(id))
            .all(&txn)
            .await?;

        for item in &items {
            receiving_transaction::Entity::delete_many()
                .filter(receiving_transaction::Column::PurchaseRequestItemId.eq(item.id))
                .exec(&txn)
                .await?;
        }

        purchase_request_item::Entity::delete_many()
            .filter(purchase_request_item::Column::RequestId.eq(id))
            .exec(&txn)
            .await?;

        let model: purchase_request::ActiveModel = existing.into();
        model.delete(&txn).await?;

        txn.commit().await?;

        info!(request_id = id, "Purchase request deleted");
        self.event_sender
            .send_or_log(Event::PurchaseRequestDeleted(id))
            .await;
        Ok(())
    }
}
