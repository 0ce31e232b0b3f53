use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, Condition, DatabaseConnection, EntityTrait,
    QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::entities::{
    product, toner_consumption,
    transaction_history::{self, TransactionType},
};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};
use crate::services::consumption::{AbuseCheck, ConsumptionService};
use crate::services::stock;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct IssueStockInput {
    /// Internal SKU or supplier barcode of the product being drawn.
    #[validate(length(min = 1, message = "Product code must not be empty"))]
    pub code: String,
    #[validate(range(min = 1, message = "Quantity must be positive"))]
    pub quantity: i32,
    pub dept_id: i32,
    pub requested_by: Option<String>,
    pub reason_code: Option<String>,
}

/// Outcome of an issuance: the OUT ledger entry, plus an advisory abuse
/// warning when a consumable draw exceeded its department's trailing average.
#[derive(Debug, Serialize)]
pub struct IssueOutcome {
    pub transaction: transaction_history::Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<AbuseCheck>,
}

/// Issues stock to departments: decrements stock, writes the OUT ledger
/// entry and, for consumables, records a screened consumption sample.
#[derive(Clone)]
pub struct IssuanceService {
    db: Arc<DatabaseConnection>,
    consumption: Arc<ConsumptionService>,
    event_sender: EventSender,
}

impl IssuanceService {
    pub fn new(
        db: Arc<DatabaseConnection>,
        consumption: Arc<ConsumptionService>,
        event_sender: EventSender,
    ) -> Self {
        Self {
            db,
            consumption,
            event_sender,
        }
    }

    /// Issues stock against a scanned product code. Resolution, the
    /// availability pre-check and the abuse screen run first; the decrement,
    /// the OUT entry and any consumption sample then land in one
    /// transaction.
    #[instrument(skip(self, input))]
    pub async fn issue(&self, input: IssueStockInput) -> Result<IssueOutcome, ServiceError> {
        let product = product::Entity::find()
            .filter(
                Condition::any()
                    .add(product::Column::Sku.eq(input.code.as_str()))
                    .add(product::Column::SupplierBarcode.eq(input.code.as_str())),
            )
            .one(&*self.db)
            .await?
            .ok_or_else(|| {
                ServiceError::NotFound(format!("Product with code {} not found", input.code))
            })?;

        if product.current_stock < input.quantity {
            return Err(ServiceError::InsufficientStock {
                available: product.current_stock,
                requested: input.quantity,
            });
        }

        // The screen runs before the transaction below: it reads through the
        // pool, and holding a pooled connection here would deadlock it on a
        // single-connection pool. Prior samples are all committed, so the
        // current draw is not part of its own average.
        let check = if product.is_consumable() {
            Some(
                self.consumption
                    .check_abuse(product.id, input.dept_id, input.quantity)
                    .await,
            )
        } else {
            None
        };

        let txn = self.db.begin().await?;

        stock::adjust_stock(&txn, product.id, -input.quantity).await?;

        let entry = transaction_history::ActiveModel {
            product_id: Set(Some(product.id)),
            dept_id: Set(Some(input.dept_id)),
            user_id: Set(input.requested_by.clone()),
            quantity: Set(input.quantity),
            transaction_type: Set(TransactionType::Out.as_str().to_string()),
            reason_code: Set(input.reason_code),
            trans_date: Set(Utc::now()),
            reference_request_id: Set(None),
            ..Default::default()
        };
        let entry = entry.insert(&txn).await?;

        let mut warning = None;
        if let Some(check) = check {
            let sample = toner_consumption::ActiveModel {
                product_id: Set(product.id),
                dept_id: Set(input.dept_id),
                quantity: Set(input.quantity),
                consumption_date: Set(Utc::now()),
                requested_by: Set(input.requested_by),
                approved_by: Set(None),
                is_flagged: Set(check.warning),
                ..Default::default()
            };
            sample.insert(&txn).await?;

            if check.warning {
                warning = Some(check);
            }
        }

        txn.commit().await?;

        info!(
            product_id = product.id,
            dept_id = input.dept_id,
            qty = input.quantity,
            flagged = warning.is_some(),
            "Stock issued"
        );

        self.event_sender
            .send_or_log(Event::StockIssued {
                product_id: product.id,
                dept_id: input.dept_id,
                quantity: input.quantity,
            })
            .await;
        if warning.is_some() {
            self.event_sender
                .send_or_log(Event::ConsumptionFlagged {
                    product_id: product.id,
                    dept_id: input.dept_id,
                    quantity: input.quantity,
                })
                .await;
        }

        Ok(IssueOutcome {
            transaction: entry,
            warning,
        })
    }
}
