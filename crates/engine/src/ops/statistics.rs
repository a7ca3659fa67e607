//! Range aggregates computed straight from the ledger.
//!
//! Range boundaries are arbitrary days, so these never read rollups.

use sea_orm::{QueryFilter, QuerySelect, prelude::*, sea_query::Expr};
use serde::{Deserialize, Serialize};

use crate::{DateRange, ResultEngine, TransactionKind, transactions, util::normalize_owner};

use super::Engine;

/// Income and expense totals over a range, in minor units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub income: i64,
    pub expense: i64,
}

impl Balance {
    pub fn net(&self) -> i64 {
        self.income - self.expense
    }
}

/// Sum of one category's transactions over a range.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub kind: TransactionKind,
    pub category: String,
    pub category_icon: String,
    pub total: i64,
}

impl Engine {
    /// Income/expense totals of transactions dated in `range` (inclusive).
    pub async fn balance(&self, owner_id: &str, range: DateRange) -> ResultEngine<Balance> {
        let owner_id = normalize_owner(owner_id)?;

        let rows: Vec<(String, i64)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::Kind)
            .column_as(Expr::col(transactions::Column::AmountMinor).sum(), "total")
            .filter(transactions::Column::OwnerId.eq(owner_id))
            .filter(transactions::Column::OccurredOn.gte(range.from()))
            .filter(transactions::Column::OccurredOn.lte(range.to()))
            .group_by(transactions::Column::Kind)
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut balance = Balance::default();
        for (kind, total) in rows {
            match TransactionKind::try_from(kind.as_str())? {
                TransactionKind::Income => balance.income = total,
                TransactionKind::Expense => balance.expense = total,
            }
        }
        Ok(balance)
    }

    /// Per-category totals of transactions dated in `range`, largest first.
    ///
    /// Categories are identified by the name and icon stored on each
    /// transaction, so deleted categories still show up.
    pub async fn category_totals(
        &self,
        owner_id: &str,
        range: DateRange,
    ) -> ResultEngine<Vec<CategoryTotal>> {
        let owner_id = normalize_owner(owner_id)?;

        let rows: Vec<(String, String, String, i64)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::Kind)
            .column(transactions::Column::Category)
            .column(transactions::Column::CategoryIcon)
            .column_as(Expr::col(transactions::Column::AmountMinor).sum(), "total")
            .filter(transactions::Column::OwnerId.eq(owner_id))
            .filter(transactions::Column::OccurredOn.gte(range.from()))
            .filter(transactions::Column::OccurredOn.lte(range.to()))
            .group_by(transactions::Column::Kind)
            .group_by(transactions::Column::Category)
            .group_by(transactions::Column::CategoryIcon)
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut totals = rows
            .into_iter()
            .map(|(kind, category, category_icon, total)| {
                Ok(CategoryTotal {
                    kind: TransactionKind::try_from(kind.as_str())?,
                    category,
                    category_icon,
                    total,
                })
            })
            .collect::<ResultEngine<Vec<_>>>()?;

        totals.sort_by(|a, b| {
            b.total
                .cmp(&a.total)
                .then_with(|| a.kind.cmp(&b.kind))
                .then_with(|| a.category.cmp(&b.category))
        });
        Ok(totals)
    }
}
