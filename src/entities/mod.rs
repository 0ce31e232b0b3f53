//! SeaORM entities for the warehouse schema, one module per table.

pub mod department;
pub mod product;
pub mod purchase_request;
pub mod purchase_request_item;
pub mod receiving_transaction;
pub mod toner_consumption;
pub mod transaction_history;
