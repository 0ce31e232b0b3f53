//! Embedded schema migrations. The schema mirrors the warehouse domain:
//! catalog, procurement lifecycle, and the append-only ledgers.

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240601_000001_create_catalog_tables::Migration),
            Box::new(m20240601_000002_create_procurement_tables::Migration),
            Box::new(m20240601_000003_create_ledger_tables::Migration),
        ]
    }
}

mod m20240601_000001_create_catalog_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000001_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Products::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Products::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Products::Sku)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Products::SupplierBarcode).string().null())
                        .col(
                            ColumnDef::new(Products::ManufacturerItemName)
                                .string()
                                .not_null(),
                        )
                        .col(ColumnDef::new(Products::InternalItemName).string().null())
                        .col(ColumnDef::new(Products::Category).string().null())
                        .col(
                            ColumnDef::new(Products::CurrentStock)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Products::MinThreshold)
                                .integer()
                                .not_null()
                                .default(10),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_products_supplier_barcode")
                        .table(Products::Table)
                        .col(Products::SupplierBarcode)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Departments::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Departments::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Departments::Name).string().not_null())
                        .col(
                            ColumnDef::new(Departments::IsItDepartment)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Departments::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Products::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum Products {
        Table,
        Id,
        Sku,
        SupplierBarcode,
        ManufacturerItemName,
        InternalItemName,
        Category,
        CurrentStock,
        MinThreshold,
    }

    #[derive(DeriveIden)]
    pub enum Departments {
        Table,
        Id,
        Name,
        IsItDepartment,
    }
}

mod m20240601_000002_create_procurement_tables {
    use sea_orm_migration::prelude::*;

    use super::m20240601_000001_create_catalog_tables::Products;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000002_create_procurement_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseRequests::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::RequestQr)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::RequestedBy)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::RequestDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequests::Status)
                                .string()
                                .not_null()
                                .default("Pending"),
                        )
                        .col(ColumnDef::new(PurchaseRequests::Notes).string().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseRequestItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseRequestItems::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::RequestId)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::ProductId)
                                .integer()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::RequestedQty)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::ExpectedDeliveryDate)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::SupplierName)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::UnitPrice)
                                .decimal_len(10, 2)
                                .null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseRequestItems::Status)
                                .string()
                                .not_null()
                                .default("Pending"),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pr_items_request")
                                .from(PurchaseRequestItems::Table, PurchaseRequestItems::RequestId)
                                .to(PurchaseRequests::Table, PurchaseRequests::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_pr_items_product")
                                .from(PurchaseRequestItems::Table, PurchaseRequestItems::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pr_items_request_id")
                        .table(PurchaseRequestItems::Table)
                        .col(PurchaseRequestItems::RequestId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_pr_items_product_status")
                        .table(PurchaseRequestItems::Table)
                        .col(PurchaseRequestItems::ProductId)
                        .col(PurchaseRequestItems::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ReceivingTransactions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ReceivingTransactions::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(ReceivingTransactions::PurchaseRequestItemId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingTransactions::ReceivedQty)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingTransactions::ReceivedDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingTransactions::ReceivedBy)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingTransactions::IsDamaged)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ReceivingTransactions::DamageNotes)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ReceivingTransactions::PhotoUrl)
                                .string()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_receivings_item")
                                .from(
                                    ReceivingTransactions::Table,
                                    ReceivingTransactions::PurchaseRequestItemId,
                                )
                                .to(PurchaseRequestItems::Table, PurchaseRequestItems::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_receivings_item_id")
                        .table(ReceivingTransactions::Table)
                        .col(ReceivingTransactions::PurchaseRequestItemId)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ReceivingTransactions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseRequestItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum PurchaseRequests {
        Table,
        Id,
        RequestQr,
        RequestedBy,
        RequestDate,
        Status,
        Notes,
    }

    #[derive(DeriveIden)]
    pub enum PurchaseRequestItems {
        Table,
        Id,
        RequestId,
        ProductId,
        RequestedQty,
        ExpectedDeliveryDate,
        SupplierName,
        UnitPrice,
        Status,
    }

    #[derive(DeriveIden)]
    pub enum ReceivingTransactions {
        Table,
        Id,
        PurchaseRequestItemId,
        ReceivedQty,
        ReceivedDate,
        ReceivedBy,
        IsDamaged,
        DamageNotes,
        PhotoUrl,
    }
}

mod m20240601_000003_create_ledger_tables {
    use sea_orm_migration::prelude::*;

    use super::m20240601_000001_create_catalog_tables::{Departments, Products};

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240601_000003_create_ledger_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(TransactionHistory::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TransactionHistory::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(TransactionHistory::ProductId)
                                .integer()
                                .null(),
                        )
                        .col(ColumnDef::new(TransactionHistory::DeptId).integer().null())
                        .col(ColumnDef::new(TransactionHistory::UserId).string().null())
                        .col(
                            ColumnDef::new(TransactionHistory::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransactionHistory::TransactionType)
                                .string()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TransactionHistory::ReasonCode)
                                .string()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(TransactionHistory::TransDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        // Soft reference: ledger entries must outlive the
                        // request they came from, so no FK here.
                        .col(
                            ColumnDef::new(TransactionHistory::ReferenceRequestId)
                                .integer()
                                .null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_product")
                                .from(TransactionHistory::Table, TransactionHistory::ProductId)
                                .to(Products::Table, Products::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_transactions_department")
                                .from(TransactionHistory::Table, TransactionHistory::DeptId)
                                .to(Departments::Table, Departments::Id),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_product_id")
                        .table(TransactionHistory::Table)
                        .col(TransactionHistory::ProductId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_transactions_trans_date")
                        .table(TransactionHistory::Table)
                        .col(TransactionHistory::TransDate)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(TonerConsumption::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(TonerConsumption::Id)
                                .integer()
                                .not_null()
                                .auto_increment()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(TonerConsumption::ProductId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TonerConsumption::DeptId)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TonerConsumption::Quantity)
                                .integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TonerConsumption::ConsumptionDate)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(TonerConsumption::RequestedBy)
                                .string()
                                .null(),
                        )
                        .col(ColumnDef::new(TonerConsumption::ApprovedBy).string().null())
                        .col(
                            ColumnDef::new(TonerConsumption::IsFlagged)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_consumption_product")
                                .from(TonerConsumption::Table, TonerConsumption::ProductId)
                                .to(Products::Table, Products::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_consumption_department")
                                .from(TonerConsumption::Table, TonerConsumption::DeptId)
                                .to(Departments::Table, Departments::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // The abuse detector filters on (product, dept, date).
            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_consumption_product_dept_date")
                        .table(TonerConsumption::Table)
                        .col(TonerConsumption::ProductId)
                        .col(TonerConsumption::DeptId)
                        .col(TonerConsumption::ConsumptionDate)
                        .to_owned(),
                )
                .await?;

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(TonerConsumption::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(TransactionHistory::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub enum TransactionHistory {
        Table,
        Id,
        ProductId,
        DeptId,
        UserId,
        Quantity,
        TransactionType,
        ReasonCode,
        TransDate,
        ReferenceRequestId,
    }

    #[derive(DeriveIden)]
    pub enum TonerConsumption {
        Table,
        Id,
        ProductId,
        DeptId,
        Quantity,
        ConsumptionDate,
        RequestedBy,
        ApprovedBy,
        IsFlagged,
    }
}
