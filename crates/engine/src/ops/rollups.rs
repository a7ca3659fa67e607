use std::collections::BTreeMap;

use chrono::NaiveDate;
use sea_orm::{
    ActiveValue, ConnectionTrait, DatabaseTransaction, QueryFilter, QuerySelect,
    TransactionTrait, prelude::*,
    sea_query::{Expr, OnConflict},
};
use serde::{Deserialize, Serialize};

use crate::{
    EngineError, LedgerEvent, ResultEngine, TransactionKind, daily_rollups, monthly_rollups,
    transactions,
    util::{normalize_owner, rollup_key},
};

use super::{Engine, with_tx};

type DayKey = (i32, i32, i32);
type MonthKey = (i32, i32);

/// `(income, expense)` accumulators.
type Totals = (i64, i64);

/// Which rollup row a drift refers to. `month` is 1..=12.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum RollupScope {
    Day { year: i32, month: i32, day: i32 },
    Month { year: i32, month: i32 },
}

/// A rollup row whose stored accumulators disagree with the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupDrift {
    pub scope: RollupScope,
    pub stored_income: i64,
    pub stored_expense: i64,
    pub ledger_income: i64,
    pub ledger_expense: i64,
}

/// Outcome of comparing an owner's rollups with the ledger.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupReport {
    pub owner_id: String,
    pub ledger_entries: u64,
    pub drifts: Vec<RollupDrift>,
}

impl RollupReport {
    pub fn is_consistent(&self) -> bool {
        self.drifts.is_empty()
    }
}

#[derive(Default)]
struct LedgerTotals {
    entries: u64,
    daily: BTreeMap<DayKey, Totals>,
    monthly: BTreeMap<MonthKey, Totals>,
}

impl Engine {
    /// Apply one ledger entry to its daily and monthly rollups.
    ///
    /// Each upsert is a single statement: the row is created with the amount
    /// on the matching accumulator, or that accumulator alone is incremented
    /// in place, so concurrent writers to one key never lose an update.
    pub(super) async fn bump_rollups(
        &self,
        db_tx: &DatabaseTransaction,
        owner_id: &str,
        kind: TransactionKind,
        amount_minor: i64,
        occurred_on: NaiveDate,
    ) -> ResultEngine<()> {
        let (income, expense) = kind.split(amount_minor);
        let (year, month, day) = rollup_key(occurred_on);

        let daily_col = match kind {
            TransactionKind::Income => daily_rollups::Column::Income,
            TransactionKind::Expense => daily_rollups::Column::Expense,
        };
        let daily = daily_rollups::ActiveModel {
            owner_id: ActiveValue::Set(owner_id.to_string()),
            year: ActiveValue::Set(year),
            month: ActiveValue::Set(month),
            day: ActiveValue::Set(day),
            income: ActiveValue::Set(income),
            expense: ActiveValue::Set(expense),
        };
        daily_rollups::Entity::insert(daily)
            .on_conflict(
                OnConflict::columns([
                    daily_rollups::Column::OwnerId,
                    daily_rollups::Column::Year,
                    daily_rollups::Column::Month,
                    daily_rollups::Column::Day,
                ])
                .value(
                    daily_col,
                    Expr::col((daily_rollups::Entity, daily_col)).add(amount_minor),
                )
                .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;

        let monthly_col = match kind {
            TransactionKind::Income => monthly_rollups::Column::Income,
            TransactionKind::Expense => monthly_rollups::Column::Expense,
        };
        let monthly = monthly_rollups::ActiveModel {
            owner_id: ActiveValue::Set(owner_id.to_string()),
            year: ActiveValue::Set(year),
            month: ActiveValue::Set(month),
            income: ActiveValue::Set(income),
            expense: ActiveValue::Set(expense),
        };
        monthly_rollups::Entity::insert(monthly)
            .on_conflict(
                OnConflict::columns([
                    monthly_rollups::Column::OwnerId,
                    monthly_rollups::Column::Year,
                    monthly_rollups::Column::Month,
                ])
                .value(
                    monthly_col,
                    Expr::col((monthly_rollups::Entity, monthly_col)).add(amount_minor),
                )
                .to_owned(),
            )
            .exec_without_returning(db_tx)
            .await?;

        Ok(())
    }

    async fn ledger_totals<C: ConnectionTrait>(
        &self,
        db: &C,
        owner_id: &str,
    ) -> ResultEngine<LedgerTotals> {
        let rows: Vec<(String, i64, NaiveDate)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::Kind)
            .column(transactions::Column::AmountMinor)
            .column(transactions::Column::OccurredOn)
            .filter(transactions::Column::OwnerId.eq(owner_id))
            .into_tuple()
            .all(db)
            .await?;

        let mut totals = LedgerTotals::default();
        for (kind, amount_minor, occurred_on) in rows {
            let (income, expense) = TransactionKind::try_from(kind.as_str())?.split(amount_minor);
            let (year, month, day) = rollup_key(occurred_on);

            let daily = totals.daily.entry((year, month, day)).or_default();
            daily.0 += income;
            daily.1 += expense;
            let monthly = totals.monthly.entry((year, month)).or_default();
            monthly.0 += income;
            monthly.1 += expense;
            totals.entries += 1;
        }
        Ok(totals)
    }

    /// Compare the owner's stored rollups with totals recomputed from the
    /// ledger. Read-only.
    pub async fn verify_rollups(&self, owner_id: &str) -> ResultEngine<RollupReport> {
        let owner_id = normalize_owner(owner_id)?;
        let db = &self.database;

        let ledger = self.ledger_totals(db, &owner_id).await?;

        let stored_daily: BTreeMap<DayKey, Totals> = daily_rollups::Entity::find()
            .filter(daily_rollups::Column::OwnerId.eq(owner_id.as_str()))
            .all(db)
            .await?
            .into_iter()
            .map(|m| ((m.year, m.month, m.day), (m.income, m.expense)))
            .collect();
        let stored_monthly: BTreeMap<MonthKey, Totals> = monthly_rollups::Entity::find()
            .filter(monthly_rollups::Column::OwnerId.eq(owner_id.as_str()))
            .all(db)
            .await?
            .into_iter()
            .map(|m| ((m.year, m.month), (m.income, m.expense)))
            .collect();

        let mut drifts = diff(&stored_daily, &ledger.daily, |(year, month, day)| {
            RollupScope::Day { year, month, day }
        });
        drifts.extend(diff(&stored_monthly, &ledger.monthly, |(year, month)| {
            RollupScope::Month { year, month }
        }));

        Ok(RollupReport {
            owner_id,
            ledger_entries: ledger.entries,
            drifts,
        })
    }

    /// Recreate every rollup of the owner from the ledger in one database
    /// transaction.
    pub async fn rebuild_rollups(&self, owner_id: &str) -> ResultEngine<()> {
        let owner_id = normalize_owner(owner_id)?;

        with_tx!(self, |db_tx| {
            let ledger = self.ledger_totals(&db_tx, &owner_id).await?;

            daily_rollups::Entity::delete_many()
                .filter(daily_rollups::Column::OwnerId.eq(owner_id.as_str()))
                .exec(&db_tx)
                .await?;
            monthly_rollups::Entity::delete_many()
                .filter(monthly_rollups::Column::OwnerId.eq(owner_id.as_str()))
                .exec(&db_tx)
                .await?;

            for ((year, month, day), (income, expense)) in ledger.daily {
                daily_rollups::Entity::insert(daily_rollups::ActiveModel {
                    owner_id: ActiveValue::Set(owner_id.clone()),
                    year: ActiveValue::Set(year),
                    month: ActiveValue::Set(month),
                    day: ActiveValue::Set(day),
                    income: ActiveValue::Set(income),
                    expense: ActiveValue::Set(expense),
                })
                .exec_without_returning(&db_tx)
                .await?;
            }
            for ((year, month), (income, expense)) in ledger.monthly {
                monthly_rollups::Entity::insert(monthly_rollups::ActiveModel {
                    owner_id: ActiveValue::Set(owner_id.clone()),
                    year: ActiveValue::Set(year),
                    month: ActiveValue::Set(month),
                    income: ActiveValue::Set(income),
                    expense: ActiveValue::Set(expense),
                })
                .exec_without_returning(&db_tx)
                .await?;
            }
            Ok::<(), EngineError>(())
        })?;

        self.publish(LedgerEvent::RollupsRebuilt { owner_id });
        Ok(())
    }
}

/// Keys present on either side whose totals differ. A missing row counts as
/// zero on both accumulators.
fn diff<K: Ord + Copy>(
    stored: &BTreeMap<K, Totals>,
    ledger: &BTreeMap<K, Totals>,
    scope: impl Fn(K) -> RollupScope,
) -> Vec<RollupDrift> {
    let mut keys: Vec<K> = stored.keys().chain(ledger.keys()).copied().collect();
    keys.sort();
    keys.dedup();

    keys.into_iter()
        .filter_map(|key| {
            let stored = stored.get(&key).copied().unwrap_or_default();
            let expected = ledger.get(&key).copied().unwrap_or_default();
            (stored != expected).then(|| RollupDrift {
                scope: scope(key),
                stored_income: stored.0,
                stored_expense: stored.1,
                ledger_income: expected.0,
                ledger_expense: expected.1,
            })
        })
        .collect()
}
