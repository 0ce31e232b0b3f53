use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

use crate::entities::{
    department, product, purchase_request::RequestStatus, purchase_request, toner_consumption,
    transaction_history::{self, TransactionType},
};
use crate::errors::ServiceError;

const DEFAULT_TRANSACTION_LIMIT: u64 = 100;

/// Headline numbers for the dashboard.
#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub total_products: u64,
    pub total_stock: i64,
    pub low_stock_count: u64,
    pub pending_requests: u64,
    pub total_received: i64,
    pub total_issued: i64,
    pub active_alerts: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionFilter {
    pub product_id: Option<i32>,
    pub dept_id: Option<i32>,
    /// "IN" or "OUT"
    pub transaction_type: Option<String>,
    pub limit: Option<u64>,
}

/// A ledger entry joined with its product and department.
#[derive(Debug, Serialize)]
pub struct TransactionRecord {
    #[serde(flatten)]
    pub entry: transaction_history::Model,
    pub product: Option<product::Model>,
    pub department: Option<department::Model>,
}

/// Read-only reporting over the ledger and the catalog.
#[derive(Clone)]
pub struct ReportService {
    db: Arc<DatabaseConnection>,
}

impl ReportService {
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn dashboard_stats(&self) -> Result<DashboardStats, ServiceError> {
        let products = product::Entity::find().all(&*self.db).await?;
        let total_products = products.len() as u64;
        let total_stock: i64 = products.iter().map(|p| i64::from(p.current_stock)).sum();
        let low_stock_count = products
            .iter()
            .filter(|p| p.current_stock <= p.min_threshold)
            .count() as u64;

        let pending_requests = purchase_request::Entity::find()
            .filter(purchase_request::Column::Status.eq(RequestStatus::Pending.as_str()))
            .count(&*self.db)
            .await?;

        let entries = transaction_history::Entity::find().all(&*self.db).await?;
        let (mut total_received, mut total_issued) = (0i64, 0i64);
        for entry in &entries {
            match TransactionType::parse(&entry.transaction_type) {
                Some(TransactionType::In) => total_received += i64::from(entry.quantity),
                Some(TransactionType::Out) => total_issued += i64::from(entry.quantity),
                None => {}
            }
        }

        let active_alerts = toner_consumption::Entity::find()
            .filter(toner_consumption::Column::IsFlagged.eq(true))
            .count(&*self.db)
            .await?;

        Ok(DashboardStats {
            total_products,
            total_stock,
            low_stock_count,
            pending_requests,
            total_received,
            total_issued,
            active_alerts,
        })
    }

    /// Ledger entries, newest first, with optional product / department /
    /// direction filters.
    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<TransactionRecord>, ServiceError> {
        let mut query = transaction_history::Entity::find();

        if let Some(product_id) = filter.product_id {
            query = query.filter(transaction_history::Column::ProductId.eq(product_id));
        }
        if let Some(dept_id) = filter.dept_id {
            query = query.filter(transaction_history::Column::DeptId.eq(dept_id));
        }
        if let Some(tx_type) = filter.transaction_type.as_deref() {
            let tx_type = TransactionType::parse(tx_type).ok_or_else(|| {
                ServiceError::ValidationError(format!("Unknown transaction type: {}", tx_type))
            })?;
            query = query.filter(
                transaction_history::Column::TransactionType.eq(tx_type.as_str()),
            );
        }

        let rows = query
            .find_also_related(product::Entity)
            .order_by_desc(transaction_history::Column::TransDate)
            .limit(filter.limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT))
            .all(&*self.db)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for (entry, product) in rows {
            let dept = match entry.dept_id {
                Some(dept_id) => department::Entity::find_by_id(dept_id).one(&*self.db).await?,
                None => None,
            };
            records.push(TransactionRecord {
                entry,
                product,
                department: dept,
            });
        }

        Ok(records)
    }

    #[instrument(skip(self))]
    pub async fn get_transaction(&self, id: i32) -> Result<TransactionRecord, ServiceError> {
        let entry = transaction_history::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Transaction {} not found", id)))?;

        let product = match entry.product_id {
            Some(product_id) => product::Entity::find_by_id(product_id).one(&*self.db).await?,
            None => None,
        };
        let department = match entry.dept_id {
            Some(dept_id) => department::Entity::find_by_id(dept_id).one(&*self.db).await?,
            None => None,
        };

        Ok(TransactionRecord {
            entry,
            product,
            department,
        })
    }
}
