//! Per-owner income/expense ledger with daily and monthly rollups.
//!
//! Every recorded transaction updates the rollup rows of its day and month
//! inside the same database transaction, so history reads never scan the
//! ledger. Range statistics are computed from the ledger itself.

pub use categories::Category;
pub use commands::{CreateCategoryCmd, RecordTransactionCmd};
pub use currency::Currency;
pub use error::EngineError;
pub use events::LedgerEvent;
pub use money::MoneyCents;
pub use ops::{
    Balance, CategoryTotal, Engine, EngineBuilder, EngineConfig, HistoryEntry, RollupDrift,
    RollupReport, RollupScope, Timeframe, TransactionView,
};
pub use transactions::{Transaction, TransactionKind};
pub use user_settings::UserSettings;
pub use util::{DateRange, parse_date};

mod categories;
mod commands;
mod currency;
mod daily_rollups;
mod error;
mod events;
mod money;
mod monthly_rollups;
mod ops;
mod transactions;
mod user_settings;
mod util;

pub type ResultEngine<T> = Result<T, EngineError>;
