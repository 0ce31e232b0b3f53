//! HTTP handlers, one module per resource. Handlers validate input, call a
//! service, and shape the response; no business rules live here.

pub mod analytics;
pub mod common;
pub mod departments;
pub mod products;
pub mod purchase_requests;
pub mod receiving;
pub mod stock_out;
pub mod transactions;
