use chrono::{Duration, Utc};
use sea_orm::{
    ActiveModelTrait, ActiveValue::Set, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::entities::{department, product, toner_consumption};
use crate::errors::ServiceError;
use crate::events::{Event, EventSender};

/// Trailing window over which consumption is averaged.
const ABUSE_WINDOW_DAYS: i64 = 30;
/// A draw is flagged when it exceeds the window average by this factor.
const ABUSE_THRESHOLD_FACTOR: f64 = 1.2;

/// Result of screening one prospective draw against a department's history.
#[derive(Debug, Clone, Serialize)]
pub struct AbuseCheck {
    pub warning: bool,
    /// Trailing-window average, rounded to two decimals for display. Zero
    /// when the department has no history for this product.
    pub average: f64,
    /// The quantity that was screened.
    pub current: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl AbuseCheck {
    fn clear(current: i32) -> Self {
        Self {
            warning: false,
            average: 0.0,
            current,
            message: None,
        }
    }
}

/// Pure threshold rule: a department with no history is never flagged, and
/// a draw is flagged only when it exceeds 1.2x the trailing average. The
/// comparison uses the exact average; rounding is for display only.
pub fn evaluate(sample_count: usize, total_quantity: i64, new_quantity: i32) -> AbuseCheck {
    if sample_count == 0 {
        return AbuseCheck::clear(new_quantity);
    }

    let average = total_quantity as f64 / sample_count as f64;

    let warning = f64::from(new_quantity) > average * ABUSE_THRESHOLD_FACTOR;
    let message = if warning {
        let percent = ((f64::from(new_quantity) - average) / average * 100.0).round() as i64;
        Some(format!("{}% above 1-month average", percent))
    } else {
        None
    };

    AbuseCheck {
        warning,
        average: (average * 100.0).round() / 100.0,
        current: new_quantity,
        message,
    }
}

/// A consumption sample joined with its product and department, as shown on
/// the usage report.
#[derive(Debug, Serialize)]
pub struct UsageRecord {
    #[serde(flatten)]
    pub sample: toner_consumption::Model,
    pub product: Option<product::Model>,
    pub department: Option<department::Model>,
}

/// Screens consumable draws against each department's trailing consumption
/// history and manages the resulting alerts.
#[derive(Clone)]
pub struct ConsumptionService {
    db: Arc<DatabaseConnection>,
    event_sender: EventSender,
}

impl ConsumptionService {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        Self { db, event_sender }
    }

    /// Screens a prospective draw. Advisory only: a storage failure here
    /// logs a warning and reports a clear result rather than blocking the
    /// issuance it accompanies.
    #[instrument(skip(self))]
    pub async fn check_abuse(&self, product_id: i32, dept_id: i32, new_quantity: i32) -> AbuseCheck {
        let cutoff = Utc::now() - Duration::days(ABUSE_WINDOW_DAYS);

        let samples = toner_consumption::Entity::find()
            .filter(toner_consumption::Column::ProductId.eq(product_id))
            .filter(toner_consumption::Column::DeptId.eq(dept_id))
            .filter(toner_consumption::Column::ConsumptionDate.gte(cutoff))
            .all(&*self.db)
            .await;

        match samples {
            Ok(samples) => {
                let total: i64 = samples.iter().map(|s| i64::from(s.quantity)).sum();
                evaluate(samples.len(), total, new_quantity)
            }
            Err(e) => {
                warn!(
                    product_id,
                    dept_id,
                    error = %e,
                    "Abuse check failed, treating draw as clear"
                );
                AbuseCheck::clear(new_quantity)
            }
        }
    }

    /// Consumption samples joined with product and department, newest first.
    /// `flagged_only` narrows to active alerts.
    #[instrument(skip(self))]
    pub async fn list_usage(&self, flagged_only: bool) -> Result<Vec<UsageRecord>, ServiceError> {
        let mut query = toner_consumption::Entity::find();
        if flagged_only {
            query = query.filter(toner_consumption::Column::IsFlagged.eq(true));
        }

        let rows = query
            .find_also_related(product::Entity)
            .order_by_desc(toner_consumption::Column::ConsumptionDate)
            .all(&*self.db)
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        for (sample, product) in rows {
            let dept = department::Entity::find_by_id(sample.dept_id)
                .one(&*self.db)
                .await?;
            records.push(UsageRecord {
                sample,
                product,
                department: dept,
            });
        }

        Ok(records)
    }

    /// Clears the flag on a consumption sample. The sample itself stays in
    /// history; only the alert is dismissed.
    #[instrument(skip(self))]
    pub async fn dismiss_alert(&self, id: i32) -> Result<toner_consumption::Model, ServiceError> {
        let sample = toner_consumption::Entity::find_by_id(id)
            .one(&*self.db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("Consumption record {} not found", id)))?;

        let mut model: toner_consumption::ActiveModel = sample.into();
        model.is_flagged = Set(false);
        let updated = model.update(&*self.db).await?;

        info!(consumption_id = id, "Consumption alert dismissed");
        self.event_sender
            .send_or_log(Event::ConsumptionAlertDismissed(id))
            .await;
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_history_is_never_flagged() {
        let check = evaluate(0, 0, 1_000);
        assert!(!check.warning);
        assert_eq!(check.average, 0.0);
        assert_eq!(check.current, 1_000);
        assert!(check.message.is_none());
    }

    #[test]
    fn draw_within_threshold_is_clear() {
        // Average 10, threshold 12; a draw of 11 passes, 12 passes (strict >).
        let check = evaluate(3, 30, 11);
        assert!(!check.warning);
        assert_eq!(check.average, 10.0);

        let check = evaluate(3, 30, 12);
        assert!(!check.warning);
    }

    #[test]
    fn draw_above_threshold_is_flagged_with_percent_message() {
        // Average 10; 13 is 30% above.
        let check = evaluate(3, 30, 13);
        assert!(check.warning);
        assert_eq!(check.current, 13);
        assert_eq!(check.message.as_deref(), Some("30% above 1-month average"));
    }

    #[test]
    fn average_is_rounded_to_two_decimals() {
        // 10 / 3 = 3.333...
        let check = evaluate(3, 10, 2);
        assert_eq!(check.average, 3.33);
    }

    #[test]
    fn threshold_uses_the_exact_average_not_the_rounded_one() {
        // 25 / 3 = 8.333...; the exact threshold is exactly 10.0, so a draw
        // of 10 passes under strict >. Comparing against the displayed 8.33
        // (threshold 9.996) would wrongly flag it.
        let check = evaluate(3, 25, 10);
        assert!(!check.warning);
        assert_eq!(check.average, 8.33);
    }

    #[test]
    fn percent_in_message_is_rounded_to_integer() {
        // Average 3.33, draw 5: (5 - 3.33) / 3.33 = 50.15% -> "50%".
        let check = evaluate(3, 10, 5);
        assert!(check.warning);
        assert_eq!(check.message.as_deref(), Some("50% above 1-month average"));
    }
}
