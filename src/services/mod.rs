//! Domain services. Handlers stay thin; all business rules live here.

pub mod consumption;
pub mod departments;
pub mod issuance;
pub mod products;
pub mod purchase_requests;
pub mod receiving;
pub mod reports;
pub mod stock;

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::events::EventSender;

/// All services wired together, shared through the router state.
#[derive(Clone)]
pub struct AppServices {
    pub products: Arc<products::ProductService>,
    pub departments: Arc<departments::DepartmentService>,
    pub purchase_requests: Arc<purchase_requests::PurchaseRequestService>,
    pub receiving: Arc<receiving::ReceivingService>,
    pub issuance: Arc<issuance::IssuanceService>,
    pub consumption: Arc<consumption::ConsumptionService>,
    pub reports: Arc<reports::ReportService>,
}

impl AppServices {
    pub fn new(db: Arc<DatabaseConnection>, event_sender: EventSender) -> Self {
        let consumption = Arc::new(consumption::ConsumptionService::new(
            db.clone(),
            event_sender.clone(),
        ));

        Self {
            products: Arc::new(products::ProductService::new(
                db.clone(),
                event_sender.clone(),
            )),
            departments: Arc::new(departments::DepartmentService::new(db.clone())),
            purchase_requests: Arc::new(purchase_requests::PurchaseRequestService::new(
                db.clone(),
                event_sender.clone(),
            )),
            receiving: Arc::new(receiving::ReceivingService::new(
                db.clone(),
                event_sender.clone(),
            )),
            issuance: Arc::new(issuance::IssuanceService::new(
                db.clone(),
                consumption.clone(),
                event_sender,
            )),
            consumption,
            reports: Arc::new(reports::ReportService::new(db)),
        }
    }
}
