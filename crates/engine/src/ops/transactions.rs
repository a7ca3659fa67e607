use chrono::Utc;
use sea_orm::{ActiveModelTrait, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    DateRange, EngineError, LedgerEvent, RecordTransactionCmd, ResultEngine, Transaction,
    transactions,
    util::{normalize_optional_text, normalize_owner, normalize_required_name, rollup_key},
};

use super::{Engine, with_tx};

/// A ledger entry with its amount rendered in the owner's currency.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionView {
    pub transaction: Transaction,
    pub formatted_amount: String,
}

impl Engine {
    /// Record a transaction and update its daily and monthly rollups.
    ///
    /// The ledger insert and both rollup upserts commit together or not at
    /// all. A storage failure re-runs the whole unit up to
    /// `EngineConfig::write_attempts` times; any other error is returned at
    /// once. `LedgerEvent::TransactionRecorded` is published after commit.
    pub async fn record_transaction(&self, cmd: RecordTransactionCmd) -> ResultEngine<Transaction> {
        let cmd = RecordTransactionCmd {
            owner_id: normalize_owner(&cmd.owner_id)?,
            category: normalize_required_name(&cmd.category, "category")?,
            note: normalize_optional_text(cmd.note.as_deref()),
            ..cmd
        };
        if cmd.amount_minor <= 0 {
            return Err(EngineError::InvalidAmount(
                "amount must be > 0".to_string(),
            ));
        }

        let mut attempt = 1;
        let tx = loop {
            match self.record_transaction_once(&cmd).await {
                Ok(tx) => break tx,
                Err(err) if err.is_retryable() && attempt < self.config.write_attempts => {
                    tokio::time::sleep(self.config.retry_backoff * attempt).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        };

        let (year, month, day) = rollup_key(tx.occurred_on);
        self.publish(LedgerEvent::TransactionRecorded {
            owner_id: tx.owner_id.clone(),
            year,
            month,
            day,
        });
        Ok(tx)
    }

    async fn record_transaction_once(&self, cmd: &RecordTransactionCmd) -> ResultEngine<Transaction> {
        with_tx!(self, |db_tx| {
            let category = self
                .require_category(&db_tx, &cmd.owner_id, &cmd.category, cmd.kind)
                .await?;

            let tx = Transaction {
                id: Uuid::new_v4(),
                owner_id: cmd.owner_id.clone(),
                kind: cmd.kind,
                amount_minor: cmd.amount_minor,
                category: category.name,
                category_icon: category.icon,
                occurred_on: cmd.occurred_on,
                note: cmd.note.clone(),
                created_at: Utc::now(),
            };
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            self.bump_rollups(&db_tx, &tx.owner_id, tx.kind, tx.amount_minor, tx.occurred_on)
                .await?;

            Ok(tx)
        })
    }

    /// List the owner's transactions in `range`, newest first.
    pub async fn list_transactions(
        &self,
        owner_id: &str,
        range: DateRange,
    ) -> ResultEngine<Vec<TransactionView>> {
        let owner_id = normalize_owner(owner_id)?;
        let currency = self.currency(&owner_id).await?;

        transactions::Entity::find()
            .filter(transactions::Column::OwnerId.eq(owner_id.as_str()))
            .filter(transactions::Column::OccurredOn.gte(range.from()))
            .filter(transactions::Column::OccurredOn.lte(range.to()))
            .order_by_desc(transactions::Column::OccurredOn)
            .order_by_desc(transactions::Column::CreatedAt)
            .all(&self.database)
            .await?
            .into_iter()
            .map(|model| {
                let transaction = Transaction::try_from(model)?;
                let formatted_amount = currency.format(transaction.amount());
                Ok(TransactionView {
                    transaction,
                    formatted_amount,
                })
            })
            .collect()
    }
}
