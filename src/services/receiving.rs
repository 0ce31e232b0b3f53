use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use validator::Validate;

use crate::entities::{
    purchase_request::{self, RequestStatus},
    purchase_request_item::{self, ItemStatus},
    receiving_transaction,
    transaction_history::{self, TransactionType},
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::stock;

pub const REASON_PURCHASE_RECEIPT: &str = "PURCHASE_RECEIPT";

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ReceiveItemInput {
    pub purchase_request_item_id: i32,
    #[validate(range(min = 1, message = "Received quantity must be positive"))]
    pub received_qty: i32,
    pub received_by: Option<String>,
    #[serde(default)]
    pub is_damaged: bool,
    pub damage_notes: Option<String>,
    pub photo_url: Option<String>,
}

/// One entry of an item's receiving timeline, oldest first.
#[derive(Debug, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TimelineEvent {
    Created {
        date: chrono::DateTime<Utc>,
        request_qr: Option<String>,
        requested_by: Option<String>,
    },
    Received {
        date: chrono::DateTime<Utc>,
        quantity: i32,
        received_by: Option<String>,
        is_damaged: bool,
    },
    Completed {
        date: chrono::DateTime<Utc>,
    },
}

impl TimelineEvent {
    fn date(&self) -> chrono::DateTime<Utc> {
        match self {
            TimelineEvent::Created { date, .. }
            | TimelineEvent::Received { date, .. }
            | TimelineEvent::Completed { date } => *date,
        }
    }
}

/// Reconciles physical deliveries against purchase request lines: records
/// the receipt, mutates stock, writes the IN ledger entry and promotes item
/// and request statuses once the requested quantity is covered.
#[derive(Clone)]
pub struct ReceivingService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ReceivingService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Records one physical receipt. Everything up to status promotion runs
    /// in a single transaction; either the receipt, the stock increment, the
    /// ledger entry and any promotions all land, or none do.
    #[instrument(skip(self, input))]
    pub async fn receive_item(
        &self,
        input: ReceiveItemInput,
    ) -> Result<receiving_transaction::Model, ServiceError> {
        let txn = self.db.begin().await?;

        let item = purchase_request_item::Entity::find_by_id(input.purchase_request_item_id)
            .one(&txn)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!(
                    "Purchase request item {} not found",
                    input.purchase_request_item_id
                ))
            })?;

        let receiving = receiving_transaction::ActiveModel {
            purchase_request_item_id: Set(item.id),
            received_qty: Set(input.received_qty),
            received_date: Set(Utc::now()),
            received_by: Set(input.received_by.clone()),
            is_damaged: Set(input.is_damaged),
            damage_notes: Set(input.damage_notes),
            photo_url: Set(input.photo_url),
            ..Default::default()
        };
        let receiving = receiving.insert(&txn).await?;

        // Orphaned lines (product deleted after the request was placed) still
        // record the receipt but cannot touch stock or the ledger.
        if let Some(product_id) = item.product_id {
            stock::adjust_stock(&txn, product_id, receiving.received_qty).await?;

            let entry = transaction_history::ActiveModel {
                product_id: Set(Some(product_id)),
                user_id: Set(input.received_by),
                quantity: Set(receiving.received_qty),
                transaction_type: Set(TransactionType::In.as_str().to_string()),
                reason_code: Set(Some(REASON_PURCHASE_RECEIPT.to_string())),
                trans_date: Set(Utc::now()),
                reference_request_id: Set(item.request_id),
                ..Default::default()
            };
            entry.insert(&txn).await?;
        }

        let receipts = receiving_transaction::Entity::find()
            .filter(receiving_transaction::Column::PurchaseRequestItemId.eq(item.id))
            .all(&txn)
            .await?;
        let cumulative: i32 = receipts.iter().map(|r| r.received_qty).sum();

        if cumulative > item.requested_qty {
            warn!(
                item_id = item.id,
                cumulative,
                requested = item.requested_qty,
                "Over-receipt on purchase request item"
            );
        }

        let mut item_completed = false;
        let mut request_completed = None;
        if cumulative >= item.requested_qty && ItemStatus::parse(&item.status) != Some(ItemStatus::Received)
        {
            item_completed = true;
            let request_id = item.request_id;
            let mut item_update: purchase_request_item::ActiveModel = item.clone().into();
            item_update.status = Set(ItemStatus::Received.as_str().to_string());
            item_update.update(&txn).await?;

            if let Some(request_id) = request_id {
                let open_siblings = purchase_request_item::Entity::find()
                    .filter(purchase_request_item::Column::RequestId.eq(request_id))
                    .filter(
                        purchase_request_item::Column::Status.eq(ItemStatus::Pending.as_str()),
                    )
                    .all(&txn)
                    .await?;

                if open_siblings.is_empty() {
                    if let Some(request) =
                        purchase_request::Entity::find_by_id(request_id).one(&txn).await?
                    {
                        let mut request_update: purchase_request::ActiveModel = request.into();
                        request_update.status =
                            Set(RequestStatus::Received.as_str().to_string());
                        request_update.update(&txn).await?;
                        request_completed = Some(request_id);
                    }
                }
            }
        }

        txn.commit().await?;

        info!(
            receiving_id = receiving.id,
            item_id = item.id,
            qty = receiving.received_qty,
            cumulative,
            "Item received"
        );

        if let Some(product_id) = item.product_id {
            self.event_sender
                .send_or_log(Event::StockReceived {
                    product_id,
                    quantity: receiving.received_qty,
                    request_id: item.request_id,
                })
                .await;
        }
        if item_completed {
            self.event_sender
                .send_or_log(Event::PurchaseRequestItemReceived {
                    item_id: item.id,
                    cumulative_qty: cumulative,
                    requested_qty: item.requested_qty,
                })
                .await;
        }
        if let Some(request_id) = request_completed {
            self.event_sender
                .send_or_log(Event::PurchaseRequestCompleted(request_id))
                .await;
        }

        Ok(receiving)
    }

    /// All receipts recorded against an item, oldest first.
    #[instrument(skip(self))]
    pub async fn receipts_for_item(
        &self,
        item_id: i32,
    ) -> Result<Vec<receiving_transaction::Model>, ServiceError> {
        let receipts = receiving_transaction::Entity::find()
            .filter(receiving_transaction::Column::PurchaseRequestItemId.eq(item_id))
            .order_by_asc(receiving_transaction::Column::ReceivedDate)
            .all(&*self.db)
            .await?;
        Ok(receipts)
    }

    /// Assembles the delivery history of a request line: creation, each
    /// partial receipt in arrival order, and a completion marker once the
    /// line has been promoted.
    #[instrument(skip(self))]
    pub async fn timeline(&self, item_id: i32) -> Result<Vec<TimelineEvent>, ServiceError> {
        let item = purchase_request_item::Entity::find_by_id(item_id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Purchase request item {} not found", item_id))
            })?;

        let request = match item.request_id {
            Some(request_id) => {
                purchase_request::Entity::find_by_id(request_id)
                    .one(&*self.db)
                    .await?
            }
            None => None,
        };

        let receipts = self.receipts_for_item(item_id).await?;

        let mut events = Vec::with_capacity(receipts.len() + 2);
        if let Some(request) = &request {
            events.push(TimelineEvent::Created {
                date: request.request_date,
                request_qr: Some(request.request_qr.clone()),
                requested_by: request.requested_by.clone(),
            });
        }

        let last_received_date = receipts.last().map(|r| r.received_date);
        for receipt in receipts {
            events.push(TimelineEvent::Received {
                date: receipt.received_date,
                quantity: receipt.received_qty,
                received_by: receipt.received_by,
                is_damaged: receipt.is_damaged,
            });
        }

        if ItemStatus::parse(&item.status) == Some(ItemStatus::Received) {
            // Manual promotion can leave a line Received with no receipts.
            events.push(TimelineEvent::Completed {
                date: last_received_date.unwrap_or_else(Utc::now),
            });
        }

        // Ascending by date; the stable sort keeps the construction order
        // (created, receipts, completed) for equal timestamps.
        events.sort_by_key(TimelineEvent::date);

        Ok(events)
    }
}
