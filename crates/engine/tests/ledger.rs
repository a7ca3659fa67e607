use std::{sync::Arc, time::Duration};

use chrono::{Datelike, NaiveDate, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{
    Balance, CreateCategoryCmd, Currency, Engine, EngineConfig, EngineError, LedgerEvent,
    RecordTransactionCmd, RollupScope, Timeframe, TransactionKind,
};
use migration::MigratorTrait;

const OWNER: &str = "u-1";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn engine_with_config(config: EngineConfig) -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .config(config)
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    engine_with_config(EngineConfig::default()).await
}

/// Engine with the categories used across the scenarios.
async fn seeded_engine() -> (Engine, DatabaseConnection) {
    let (engine, db) = engine_with_db().await;
    for (name, kind, icon) in [
        ("Salary", TransactionKind::Income, "💰"),
        ("Food", TransactionKind::Expense, "🍔"),
        ("Rent", TransactionKind::Expense, "🏠"),
    ] {
        engine
            .create_category(CreateCategoryCmd::new(OWNER, name, kind, icon))
            .await
            .unwrap();
    }
    (engine, db)
}

async fn record(
    engine: &Engine,
    amount_minor: i64,
    kind: TransactionKind,
    category: &str,
    on: NaiveDate,
) -> Result<engine::Transaction, EngineError> {
    engine
        .record_transaction(RecordTransactionCmd::new(
            OWNER,
            amount_minor,
            kind,
            category,
            on,
        ))
        .await
}

async fn daily_rollup(
    db: &DatabaseConnection,
    owner: &str,
    (y, m, d): (i32, i32, i32),
) -> Option<(i64, i64)> {
    let backend = db.get_database_backend();
    db.query_one(Statement::from_sql_and_values(
        backend,
        "SELECT income, expense FROM daily_rollups \
         WHERE owner_id = ? AND year = ? AND month = ? AND day = ?",
        vec![owner.into(), y.into(), m.into(), d.into()],
    ))
    .await
    .unwrap()
    .map(|row| {
        (
            row.try_get::<i64>("", "income").unwrap(),
            row.try_get::<i64>("", "expense").unwrap(),
        )
    })
}

async fn monthly_rollup(
    db: &DatabaseConnection,
    owner: &str,
    (y, m): (i32, i32),
) -> Option<(i64, i64)> {
    let backend = db.get_database_backend();
    db.query_one(Statement::from_sql_and_values(
        backend,
        "SELECT income, expense FROM monthly_rollups \
         WHERE owner_id = ? AND year = ? AND month = ?",
        vec![owner.into(), y.into(), m.into()],
    ))
    .await
    .unwrap()
    .map(|row| {
        (
            row.try_get::<i64>("", "income").unwrap(),
            row.try_get::<i64>("", "expense").unwrap(),
        )
    })
}

async fn count(db: &DatabaseConnection, table: &str) -> i64 {
    let backend = db.get_database_backend();
    db.query_one(Statement::from_string(
        backend,
        format!("SELECT COUNT(*) AS n FROM {table}"),
    ))
    .await
    .unwrap()
    .unwrap()
    .try_get::<i64>("", "n")
    .unwrap()
}

#[tokio::test]
async fn income_creates_daily_and_monthly_rollups() {
    let (engine, db) = seeded_engine().await;

    let tx = record(&engine, 10_000, TransactionKind::Income, "Salary", date(2024, 3, 15))
        .await
        .unwrap();

    assert_eq!(tx.category, "Salary");
    assert_eq!(tx.category_icon, "💰");
    assert_eq!(tx.amount_minor, 10_000);
    assert_eq!(daily_rollup(&db, OWNER, (2024, 3, 15)).await, Some((10_000, 0)));
    assert_eq!(monthly_rollup(&db, OWNER, (2024, 3)).await, Some((10_000, 0)));
}

#[tokio::test]
async fn expense_increments_only_its_accumulator() {
    let (engine, db) = seeded_engine().await;

    record(&engine, 10_000, TransactionKind::Income, "Salary", date(2024, 3, 15))
        .await
        .unwrap();
    record(&engine, 3_000, TransactionKind::Expense, "Food", date(2024, 3, 15))
        .await
        .unwrap();

    assert_eq!(
        daily_rollup(&db, OWNER, (2024, 3, 15)).await,
        Some((10_000, 3_000))
    );
    assert_eq!(monthly_rollup(&db, OWNER, (2024, 3)).await, Some((10_000, 3_000)));
}

#[tokio::test]
async fn unknown_category_is_rejected_without_side_effects() {
    let (engine, db) = seeded_engine().await;

    let err = record(&engine, 500, TransactionKind::Expense, "Unknown", date(2024, 3, 15))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::KeyNotFound(_)));
    assert_eq!(count(&db, "transactions").await, 0);
    assert_eq!(count(&db, "daily_rollups").await, 0);
    assert_eq!(count(&db, "monthly_rollups").await, 0);
}

#[tokio::test]
async fn category_of_other_kind_is_not_found() {
    let (engine, _db) = seeded_engine().await;

    let err = record(&engine, 500, TransactionKind::Income, "Food", date(2024, 3, 15))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn category_of_other_owner_is_not_found() {
    let (engine, _db) = seeded_engine().await;

    let err = engine
        .record_transaction(RecordTransactionCmd::new(
            "u-2",
            500,
            TransactionKind::Expense,
            "Food",
            date(2024, 3, 15),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn invalid_writes_are_validation_errors() {
    let (engine, db) = seeded_engine().await;

    for amount in [0, -100] {
        let err = record(&engine, amount, TransactionKind::Expense, "Food", date(2024, 3, 15))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidAmount(_)));
        assert!(err.is_validation());
    }

    let err = engine
        .record_transaction(RecordTransactionCmd::new(
            "  ",
            100,
            TransactionKind::Expense,
            "Food",
            date(2024, 3, 15),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidOwner(_)));

    let err = record(&engine, 100, TransactionKind::Expense, " ", date(2024, 3, 15))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    assert_eq!(count(&db, "transactions").await, 0);
}

#[tokio::test]
async fn history_year_is_dense_with_zero_months() {
    let (engine, _db) = seeded_engine().await;
    record(&engine, 10_000, TransactionKind::Income, "Salary", date(2024, 3, 15))
        .await
        .unwrap();
    record(&engine, 3_000, TransactionKind::Expense, "Food", date(2024, 3, 15))
        .await
        .unwrap();

    let history = engine
        .history(OWNER, Timeframe::Year, 2024, None)
        .await
        .unwrap();

    assert_eq!(history.len(), 12);
    for (index, entry) in history.iter().enumerate() {
        assert_eq!(entry.month, index as u32);
        assert_eq!(entry.year, 2024);
        assert_eq!(entry.day, None);
        if index == 2 {
            assert_eq!((entry.income, entry.expense), (10_000, 3_000));
        } else {
            assert_eq!((entry.income, entry.expense), (0, 0));
        }
    }
}

#[tokio::test]
async fn history_month_has_one_entry_per_calendar_day() {
    let (engine, _db) = seeded_engine().await;
    record(&engine, 2_500, TransactionKind::Expense, "Food", date(2024, 2, 29))
        .await
        .unwrap();

    // Month indexes are 0-based: 1 = February, 0 = January.
    for (year, month, days) in [(2023, 1, 28), (2024, 1, 29), (2024, 0, 31), (2024, 3, 30)] {
        let history = engine
            .history(OWNER, Timeframe::Month, year, Some(month))
            .await
            .unwrap();
        assert_eq!(history.len(), days, "{year}-{month}");
        assert_eq!(history.first().unwrap().day, Some(1));
        assert_eq!(history.last().unwrap().day, Some(days as u32));
        assert!(history.iter().all(|e| e.month == month && e.year == year));
    }

    let february = engine
        .history(OWNER, Timeframe::Month, 2024, Some(1))
        .await
        .unwrap();
    assert_eq!((february[28].income, february[28].expense), (0, 2_500));
    assert!(february[..28].iter().all(|e| e.income == 0 && e.expense == 0));
}

#[tokio::test]
async fn history_rejects_out_of_domain_parameters() {
    let (engine, _db) = engine_with_db().await;

    for (timeframe, year, month) in [
        (Timeframe::Year, 999, None),
        (Timeframe::Year, 3001, None),
        (Timeframe::Month, 2024, Some(12)),
        (Timeframe::Month, 2024, None),
    ] {
        let err = engine
            .history(OWNER, timeframe, year, month)
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidDate(_)), "{timeframe:?} {year} {month:?}");
    }
}

#[tokio::test]
async fn balance_sums_ledger_over_inclusive_range() {
    let (engine, _db) = seeded_engine().await;
    record(&engine, 10_000, TransactionKind::Income, "Salary", date(2024, 3, 15))
        .await
        .unwrap();
    record(&engine, 3_000, TransactionKind::Expense, "Food", date(2024, 3, 15))
        .await
        .unwrap();
    record(&engine, 700, TransactionKind::Expense, "Food", date(2024, 4, 1))
        .await
        .unwrap();

    let range = engine
        .date_range(date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    let balance = engine.balance(OWNER, range).await.unwrap();
    assert_eq!(
        balance,
        Balance {
            income: 10_000,
            expense: 3_000
        }
    );
    assert_eq!(balance.net(), 7_000);

    let single_day = engine
        .date_range(date(2024, 4, 1), date(2024, 4, 1))
        .unwrap();
    let balance = engine.balance(OWNER, single_day).await.unwrap();
    assert_eq!((balance.income, balance.expense), (0, 700));
}

#[tokio::test]
async fn oversized_or_inverted_ranges_are_rejected() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .date_range(date(2024, 1, 1), date(2024, 6, 1))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));
    assert!(err.is_validation());

    let err = engine
        .date_range(date(2024, 3, 2), date(2024, 3, 1))
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidRange(_)));
}

#[tokio::test]
async fn range_cap_follows_config() {
    let (engine, _db) = engine_with_config(EngineConfig {
        max_range_days: 7,
        ..EngineConfig::default()
    })
    .await;

    assert!(engine.date_range(date(2024, 3, 1), date(2024, 3, 8)).is_ok());
    assert!(engine.date_range(date(2024, 3, 1), date(2024, 3, 9)).is_err());
}

#[tokio::test]
async fn category_totals_are_sorted_by_total() {
    let (engine, _db) = seeded_engine().await;
    record(&engine, 10_000, TransactionKind::Income, "Salary", date(2024, 3, 1))
        .await
        .unwrap();
    record(&engine, 1_200, TransactionKind::Expense, "Food", date(2024, 3, 2))
        .await
        .unwrap();
    record(&engine, 800, TransactionKind::Expense, "Food", date(2024, 3, 3))
        .await
        .unwrap();
    record(&engine, 50_000, TransactionKind::Expense, "Rent", date(2024, 3, 5))
        .await
        .unwrap();

    let range = engine
        .date_range(date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    let totals = engine.category_totals(OWNER, range).await.unwrap();

    let summary: Vec<_> = totals
        .iter()
        .map(|t| (t.category.as_str(), t.kind, t.total))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Rent", TransactionKind::Expense, 50_000),
            ("Salary", TransactionKind::Income, 10_000),
            ("Food", TransactionKind::Expense, 2_000),
        ]
    );
    assert_eq!(totals[0].category_icon, "🏠");
}

#[tokio::test]
async fn reads_do_not_mutate_state() {
    let (engine, db) = seeded_engine().await;
    record(&engine, 10_000, TransactionKind::Income, "Salary", date(2024, 3, 15))
        .await
        .unwrap();

    let before = (
        count(&db, "transactions").await,
        count(&db, "daily_rollups").await,
        count(&db, "monthly_rollups").await,
        daily_rollup(&db, OWNER, (2024, 3, 15)).await,
        monthly_rollup(&db, OWNER, (2024, 3)).await,
    );

    let range = engine
        .date_range(date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    engine.balance(OWNER, range).await.unwrap();
    engine.category_totals(OWNER, range).await.unwrap();
    engine.list_transactions(OWNER, range).await.unwrap();
    engine
        .history(OWNER, Timeframe::Year, 2024, None)
        .await
        .unwrap();
    engine
        .history(OWNER, Timeframe::Month, 2024, Some(2))
        .await
        .unwrap();
    engine.available_years(OWNER).await.unwrap();
    engine.verify_rollups(OWNER).await.unwrap();

    let after = (
        count(&db, "transactions").await,
        count(&db, "daily_rollups").await,
        count(&db, "monthly_rollups").await,
        daily_rollup(&db, OWNER, (2024, 3, 15)).await,
        monthly_rollup(&db, OWNER, (2024, 3)).await,
    );
    assert_eq!(before, after);
    assert_eq!(count(&db, "user_settings").await, 0);
}

#[tokio::test]
async fn storage_failure_leaves_no_partial_write() {
    let (engine, db) = engine_with_config(EngineConfig {
        write_attempts: 2,
        retry_backoff: Duration::ZERO,
        ..EngineConfig::default()
    })
    .await;
    engine
        .create_category(CreateCategoryCmd::new(
            OWNER,
            "Food",
            TransactionKind::Expense,
            "🍔",
        ))
        .await
        .unwrap();
    record(&engine, 1_000, TransactionKind::Expense, "Food", date(2024, 3, 15))
        .await
        .unwrap();

    let mut events = engine.subscribe();
    db.execute_unprepared("DROP TABLE monthly_rollups")
        .await
        .unwrap();

    let err = record(&engine, 500, TransactionKind::Expense, "Food", date(2024, 3, 15))
        .await
        .unwrap_err();

    assert!(matches!(err, EngineError::Database(_)));
    assert!(err.is_retryable());
    assert_eq!(count(&db, "transactions").await, 1);
    assert_eq!(daily_rollup(&db, OWNER, (2024, 3, 15)).await, Some((0, 1_000)));
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn monthly_rollups_equal_sum_of_daily_rollups() {
    let (engine, db) = seeded_engine().await;
    let entries = [
        (10_000, TransactionKind::Income, "Salary", date(2024, 1, 31)),
        (1_234, TransactionKind::Expense, "Food", date(2024, 1, 31)),
        (99, TransactionKind::Expense, "Food", date(2024, 2, 1)),
        (4_000, TransactionKind::Income, "Salary", date(2024, 2, 29)),
        (50_000, TransactionKind::Expense, "Rent", date(2024, 2, 5)),
        (1, TransactionKind::Expense, "Food", date(2023, 12, 31)),
    ];
    for (amount, kind, category, on) in entries {
        record(&engine, amount, kind, category, on).await.unwrap();
    }

    for (year, month) in [(2023, 12), (2024, 1), (2024, 2)] {
        let history = engine
            .history(OWNER, Timeframe::Month, year, Some(month as u32 - 1))
            .await
            .unwrap();
        let days = history
            .iter()
            .fold((0, 0), |acc, e| (acc.0 + e.income, acc.1 + e.expense));
        assert_eq!(monthly_rollup(&db, OWNER, (year, month)).await, Some(days));
    }

    let report = engine.verify_rollups(OWNER).await.unwrap();
    assert!(report.is_consistent());
    assert_eq!(report.ledger_entries, entries.len() as u64);
}

#[tokio::test]
async fn concurrent_writes_to_one_day_are_all_counted() {
    let (engine, db) = seeded_engine().await;
    let engine = Arc::new(engine);

    let handles: Vec<_> = (1..=20)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                record(&engine, i * 100, TransactionKind::Expense, "Food", date(2024, 5, 10))
                    .await
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let expected: i64 = (1..=20).map(|i| i * 100).sum();
    assert_eq!(daily_rollup(&db, OWNER, (2024, 5, 10)).await, Some((0, expected)));
    assert_eq!(monthly_rollup(&db, OWNER, (2024, 5)).await, Some((0, expected)));
}

#[tokio::test]
async fn rollups_are_isolated_per_owner() {
    let (engine, db) = seeded_engine().await;
    engine
        .create_category(CreateCategoryCmd::new(
            "u-2",
            "Food",
            TransactionKind::Expense,
            "🥗",
        ))
        .await
        .unwrap();

    record(&engine, 100, TransactionKind::Expense, "Food", date(2024, 3, 15))
        .await
        .unwrap();
    let other = engine
        .record_transaction(RecordTransactionCmd::new(
            "u-2",
            900,
            TransactionKind::Expense,
            "Food",
            date(2024, 3, 15),
        ))
        .await
        .unwrap();

    assert_eq!(other.category_icon, "🥗");
    assert_eq!(daily_rollup(&db, OWNER, (2024, 3, 15)).await, Some((0, 100)));
    assert_eq!(daily_rollup(&db, "u-2", (2024, 3, 15)).await, Some((0, 900)));
}

#[tokio::test]
async fn duplicate_category_conflicts() {
    let (engine, _db) = seeded_engine().await;

    let err = engine
        .create_category(CreateCategoryCmd::new(
            OWNER,
            "Food",
            TransactionKind::Expense,
            "🍕",
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::ExistingKey(_)));

    // Same name with the other kind is a different category.
    engine
        .create_category(CreateCategoryCmd::new(
            OWNER,
            "Food",
            TransactionKind::Income,
            "🍕",
        ))
        .await
        .unwrap();
}

#[tokio::test]
async fn category_validation() {
    let (engine, _db) = engine_with_db().await;

    let err = engine
        .create_category(CreateCategoryCmd::new(OWNER, "", TransactionKind::Income, "x"))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));

    let err = engine
        .create_category(CreateCategoryCmd::new(
            OWNER,
            "Gifts",
            TransactionKind::Income,
            "x".repeat(21),
        ))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::InvalidName(_)));
}

#[tokio::test]
async fn deleted_category_keeps_transaction_snapshot() {
    let (engine, _db) = seeded_engine().await;
    record(&engine, 3_000, TransactionKind::Expense, "Food", date(2024, 3, 15))
        .await
        .unwrap();

    engine
        .delete_category(OWNER, "Food", TransactionKind::Expense)
        .await
        .unwrap();

    let range = engine
        .date_range(date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    let listed = engine.list_transactions(OWNER, range).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].transaction.category, "Food");
    assert_eq!(listed[0].transaction.category_icon, "🍔");

    let totals = engine.category_totals(OWNER, range).await.unwrap();
    assert_eq!(totals[0].category, "Food");

    let err = record(&engine, 100, TransactionKind::Expense, "Food", date(2024, 3, 16))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));

    let err = engine
        .delete_category(OWNER, "Food", TransactionKind::Expense)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::KeyNotFound(_)));
}

#[tokio::test]
async fn list_categories_filters_by_kind_and_orders_by_name() {
    let (engine, _db) = seeded_engine().await;

    let all: Vec<_> = engine
        .list_categories(OWNER, None)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(all, vec!["Food", "Rent", "Salary"]);

    let expenses: Vec<_> = engine
        .list_categories(OWNER, Some(TransactionKind::Expense))
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(expenses, vec!["Food", "Rent"]);

    assert!(engine.list_categories("u-2", None).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_transactions_is_newest_first_and_formatted() {
    let (engine, _db) = seeded_engine().await;
    engine
        .record_transaction(
            RecordTransactionCmd::new(
                OWNER,
                123_456,
                TransactionKind::Income,
                "Salary",
                date(2024, 3, 1),
            )
            .note("  march  "),
        )
        .await
        .unwrap();
    record(&engine, 4_550, TransactionKind::Expense, "Food", date(2024, 3, 20))
        .await
        .unwrap();

    let range = engine
        .date_range(date(2024, 3, 1), date(2024, 3, 31))
        .unwrap();
    let listed = engine.list_transactions(OWNER, range).await.unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(listed[0].transaction.occurred_on, date(2024, 3, 20));
    assert_eq!(listed[0].formatted_amount, "R$ 45,50");
    assert_eq!(listed[1].formatted_amount, "R$ 1.234,56");
    assert_eq!(listed[1].transaction.note.as_deref(), Some("march"));

    engine.update_currency(OWNER, "usd").await.unwrap();
    let listed = engine.list_transactions(OWNER, range).await.unwrap();
    assert_eq!(listed[1].formatted_amount, "$1,234.56");
}

#[tokio::test]
async fn available_years_default_to_current_year() {
    let (engine, _db) = seeded_engine().await;

    assert_eq!(
        engine.available_years(OWNER).await.unwrap(),
        vec![Utc::now().year()]
    );

    record(&engine, 100, TransactionKind::Expense, "Food", date(2025, 6, 1))
        .await
        .unwrap();
    record(&engine, 100, TransactionKind::Expense, "Food", date(2022, 6, 1))
        .await
        .unwrap();
    record(&engine, 100, TransactionKind::Expense, "Food", date(2025, 1, 1))
        .await
        .unwrap();

    assert_eq!(engine.available_years(OWNER).await.unwrap(), vec![2022, 2025]);
}

#[tokio::test]
async fn settings_default_to_brl_and_accept_updates() {
    let (engine, _db) = engine_with_db().await;

    let settings = engine.settings(OWNER).await.unwrap();
    assert_eq!(settings.currency, Currency::Brl);

    let settings = engine.update_currency(OWNER, "USD").await.unwrap();
    assert_eq!(settings.currency, Currency::Usd);
    assert_eq!(engine.settings(OWNER).await.unwrap().currency, Currency::Usd);

    let err = engine.update_currency(OWNER, "EUR").await.unwrap_err();
    assert!(matches!(err, EngineError::InvalidCurrency(_)));
    assert_eq!(engine.settings(OWNER).await.unwrap().currency, Currency::Usd);
}

#[tokio::test]
async fn verify_detects_drift_and_rebuild_repairs_it() {
    let (engine, db) = seeded_engine().await;
    record(&engine, 10_000, TransactionKind::Income, "Salary", date(2024, 3, 15))
        .await
        .unwrap();
    record(&engine, 3_000, TransactionKind::Expense, "Food", date(2024, 3, 16))
        .await
        .unwrap();

    db.execute_unprepared("UPDATE daily_rollups SET income = 1 WHERE day = 15")
        .await
        .unwrap();
    db.execute_unprepared("DELETE FROM monthly_rollups")
        .await
        .unwrap();

    let report = engine.verify_rollups(OWNER).await.unwrap();
    assert!(!report.is_consistent());
    assert_eq!(report.ledger_entries, 2);
    assert!(report.drifts.iter().any(|d| d.scope
        == RollupScope::Day {
            year: 2024,
            month: 3,
            day: 15
        }
        && d.stored_income == 1
        && d.ledger_income == 10_000));
    assert!(report
        .drifts
        .iter()
        .any(|d| d.scope == RollupScope::Month { year: 2024, month: 3 }));

    let mut events = engine.subscribe();
    engine.rebuild_rollups(OWNER).await.unwrap();
    assert_eq!(
        events.try_recv().unwrap(),
        LedgerEvent::RollupsRebuilt {
            owner_id: OWNER.to_string()
        }
    );

    assert!(engine.verify_rollups(OWNER).await.unwrap().is_consistent());
    assert_eq!(daily_rollup(&db, OWNER, (2024, 3, 15)).await, Some((10_000, 0)));
    assert_eq!(monthly_rollup(&db, OWNER, (2024, 3)).await, Some((10_000, 3_000)));
}

#[tokio::test]
async fn events_follow_committed_writes() {
    let (engine, _db) = engine_with_db().await;
    let mut events = engine.subscribe();

    engine
        .create_category(CreateCategoryCmd::new(
            OWNER,
            "Food",
            TransactionKind::Expense,
            "🍔",
        ))
        .await
        .unwrap();
    assert_eq!(
        events.try_recv().unwrap(),
        LedgerEvent::CategoriesChanged {
            owner_id: OWNER.to_string()
        }
    );

    record(&engine, 100, TransactionKind::Expense, "Food", date(2024, 3, 15))
        .await
        .unwrap();
    let event = events.try_recv().unwrap();
    assert_eq!(
        event,
        LedgerEvent::TransactionRecorded {
            owner_id: OWNER.to_string(),
            year: 2024,
            month: 3,
            day: 15
        }
    );
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["event"], "transaction_recorded");

    record(&engine, 100, TransactionKind::Expense, "Nope", date(2024, 3, 15))
        .await
        .unwrap_err();
    assert!(events.try_recv().is_err());
}
