//! Command structs for engine write operations.
//!
//! These types group parameters for writes, keeping call sites readable and
//! avoiding long argument lists.

use chrono::NaiveDate;

use crate::TransactionKind;

/// Record a ledger entry and update the rollups it belongs to.
#[derive(Clone, Debug)]
pub struct RecordTransactionCmd {
    pub owner_id: String,
    pub amount_minor: i64,
    pub kind: TransactionKind,
    pub category: String,
    pub occurred_on: NaiveDate,
    pub note: Option<String>,
}

impl RecordTransactionCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        amount_minor: i64,
        kind: TransactionKind,
        category: impl Into<String>,
        occurred_on: NaiveDate,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            amount_minor,
            kind,
            category: category.into(),
            occurred_on,
            note: None,
        }
    }

    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}

/// Create a category.
#[derive(Clone, Debug)]
pub struct CreateCategoryCmd {
    pub owner_id: String,
    pub name: String,
    pub kind: TransactionKind,
    pub icon: String,
}

impl CreateCategoryCmd {
    #[must_use]
    pub fn new(
        owner_id: impl Into<String>,
        name: impl Into<String>,
        kind: TransactionKind,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            owner_id: owner_id.into(),
            name: name.into(),
            kind,
            icon: icon.into(),
        }
    }
}
