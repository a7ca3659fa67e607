//! Initial schema.
//!
//! - `categories`: per-owner registry, unique on `(owner_id, name, kind)`
//! - `transactions`: the append-only ledger
//! - `daily_rollups` / `monthly_rollups`: running income/expense totals

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Categories {
    Table,
    Id,
    OwnerId,
    Name,
    Kind,
    Icon,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    OwnerId,
    Kind,
    AmountMinor,
    Category,
    CategoryIcon,
    OccurredOn,
    Note,
    CreatedAt,
}

#[derive(Iden)]
enum DailyRollups {
    Table,
    OwnerId,
    Year,
    Month,
    Day,
    Income,
    Expense,
}

#[derive(Iden)]
enum MonthlyRollups {
    Table,
    OwnerId,
    Year,
    Month,
    Income,
    Expense,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Categories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Categories::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Categories::OwnerId).string().not_null())
                    .col(ColumnDef::new(Categories::Name).string().not_null())
                    .col(ColumnDef::new(Categories::Kind).string().not_null())
                    .col(ColumnDef::new(Categories::Icon).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-categories-owner_id-name-kind-unique")
                    .table(Categories::Table)
                    .col(Categories::OwnerId)
                    .col(Categories::Name)
                    .col(Categories::Kind)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Transactions
        // ───────────────────────────────────────────────────────────────────
        // Category name and icon are copied at write time; there is no
        // foreign key so deleting a category leaves the ledger intact.
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::OwnerId).string().not_null())
                    .col(ColumnDef::new(Transactions::Kind).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Category).string().not_null())
                    .col(
                        ColumnDef::new(Transactions::CategoryIcon)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::OccurredOn).date().not_null())
                    .col(ColumnDef::new(Transactions::Note).string())
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transactions-owner_id-occurred_on")
                    .table(Transactions::Table)
                    .col(Transactions::OwnerId)
                    .col(Transactions::OccurredOn)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Daily rollups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(DailyRollups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(DailyRollups::OwnerId).string().not_null())
                    .col(ColumnDef::new(DailyRollups::Year).integer().not_null())
                    .col(ColumnDef::new(DailyRollups::Month).integer().not_null())
                    .col(ColumnDef::new(DailyRollups::Day).integer().not_null())
                    .col(
                        ColumnDef::new(DailyRollups::Income)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DailyRollups::Expense)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(DailyRollups::OwnerId)
                            .col(DailyRollups::Year)
                            .col(DailyRollups::Month)
                            .col(DailyRollups::Day),
                    )
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Monthly rollups
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(MonthlyRollups::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MonthlyRollups::OwnerId).string().not_null())
                    .col(ColumnDef::new(MonthlyRollups::Year).integer().not_null())
                    .col(ColumnDef::new(MonthlyRollups::Month).integer().not_null())
                    .col(
                        ColumnDef::new(MonthlyRollups::Income)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(MonthlyRollups::Expense)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .primary_key(
                        Index::create()
                            .col(MonthlyRollups::OwnerId)
                            .col(MonthlyRollups::Year)
                            .col(MonthlyRollups::Month),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MonthlyRollups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DailyRollups::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Categories::Table).to_owned())
            .await?;
        Ok(())
    }
}
