use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    #[default]
    Brl,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

/// Inclusive date range of a query string (`?from=2024-03-01&to=2024-03-31`).
///
/// Dates are `YYYY-MM-DD`; an RFC3339 timestamp is reduced to its UTC date.
#[derive(Debug, Serialize, Deserialize)]
pub struct RangeQuery {
    pub from: String,
    pub to: String,
}

pub mod transaction {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        /// Decimal amount, e.g. `"100.50"`. Must be > 0.
        pub amount: String,
        pub kind: TransactionKind,
        /// Name of an existing category of the same kind.
        pub category: String,
        pub date: String,
        pub note: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub kind: TransactionKind,
        pub amount_minor: i64,
        /// Amount rendered in the user's currency, e.g. `"R$ 1.234,56"`.
        pub amount_formatted: String,
        pub category: String,
        pub category_icon: String,
        pub date: NaiveDate,
        pub note: Option<String>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionListResponse {
        pub transactions: Vec<TransactionView>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        pub kind: TransactionKind,
        pub icon: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        pub kind: TransactionKind,
        pub icon: String,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct CategoryQuery {
        pub kind: Option<TransactionKind>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryListResponse {
        pub categories: Vec<CategoryView>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Balance {
        pub total_income_minor: i64,
        pub total_expenses_minor: i64,
        pub balance_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotal {
        pub kind: TransactionKind,
        pub category: String,
        pub category_icon: String,
        pub total_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTotalsResponse {
        pub totals: Vec<CategoryTotal>,
    }
}

pub mod history {
    use super::*;

    /// `month`: one entry per day. `year`: one entry per month.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum Timeframe {
        Month,
        Year,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryQuery {
        pub timeframe: Timeframe,
        pub year: i32,
        /// 0-based month (0 = January). Required for `timeframe=month`.
        pub month: Option<u32>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryEntry {
        pub year: i32,
        /// 0-based month (0 = January).
        pub month: u32,
        #[serde(skip_serializing_if = "Option::is_none")]
        pub day: Option<u32>,
        pub income_minor: i64,
        pub expense_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HistoryResponse {
        pub entries: Vec<HistoryEntry>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PeriodsResponse {
        pub years: Vec<i32>,
    }
}

pub mod settings {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettingsView {
        pub currency: Currency,
    }

    /// Currency code, `USD` or `BRL`. Anything else is rejected with 422.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SettingsUpdate {
        pub currency: String,
    }
}

pub mod rollups {
    use super::*;

    /// `month` is 1-based here, as stored.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(tag = "scope", rename_all = "snake_case")]
    pub enum RollupScope {
        Day { year: i32, month: i32, day: i32 },
        Month { year: i32, month: i32 },
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RollupDrift {
        #[serde(flatten)]
        pub scope: RollupScope,
        pub stored_income_minor: i64,
        pub stored_expense_minor: i64,
        pub ledger_income_minor: i64,
        pub ledger_expense_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RollupReport {
        pub consistent: bool,
        pub ledger_entries: u64,
        pub drifts: Vec<RollupDrift>,
    }
}
