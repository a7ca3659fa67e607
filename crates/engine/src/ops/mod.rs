use std::time::Duration;

use chrono::NaiveDate;
use sea_orm::DatabaseConnection;
use tokio::sync::broadcast;

use crate::{DateRange, LedgerEvent, ResultEngine};

mod categories;
mod history;
mod rollups;
mod settings;
mod statistics;
mod transactions;

pub use history::{HistoryEntry, Timeframe};
pub use rollups::{RollupDrift, RollupReport, RollupScope};
pub use statistics::{Balance, CategoryTotal};
pub use transactions::TransactionView;

/// Run a block inside a DB transaction, committing on success and rolling back on error.
///
/// Dropping the transaction without commit rolls it back, so an early `?`
/// return inside the block leaves the store untouched.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Tunables of the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Largest accepted `to - from` distance, in days, for range queries.
    pub max_range_days: i64,
    /// How many times an atomic write is attempted when the store fails.
    pub write_attempts: u32,
    /// Base delay between write attempts, multiplied by the attempt number.
    pub retry_backoff: Duration,
    /// Buffer of the ledger event channel.
    pub event_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_range_days: 90,
            write_attempts: 3,
            retry_backoff: Duration::from_millis(50),
            event_capacity: 256,
        }
    }
}

#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    config: EngineConfig,
    events: broadcast::Sender<LedgerEvent>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Subscribe to change notifications published after each commit.
    pub fn subscribe(&self) -> broadcast::Receiver<LedgerEvent> {
        self.events.subscribe()
    }

    /// Build a range validated against the configured cap.
    pub fn date_range(&self, from: NaiveDate, to: NaiveDate) -> ResultEngine<DateRange> {
        DateRange::new(from, to, self.config.max_range_days)
    }

    fn publish(&self, event: LedgerEvent) {
        // No receiver is not an error.
        let _ = self.events.send(event);
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
    config: EngineConfig,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    pub fn config(mut self, config: EngineConfig) -> EngineBuilder {
        self.config = config;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        let mut config = self.config;
        config.write_attempts = config.write_attempts.max(1);
        config.event_capacity = config.event_capacity.max(1);
        config.max_range_days = config.max_range_days.max(0);

        let (events, _) = broadcast::channel(config.event_capacity);
        Ok(Engine {
            database: self.database,
            config,
            events,
        })
    }
}
