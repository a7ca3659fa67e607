//! Change notifications for read-side caches.
//!
//! Events are published on a broadcast channel only after the database
//! transaction committed. A dropped or lagging subscriber never affects a
//! write.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// The daily rollup `(year, month, day)` and the monthly rollup
    /// `(year, month)` of the owner changed. `month` is 1..=12.
    TransactionRecorded {
        owner_id: String,
        year: i32,
        month: i32,
        day: i32,
    },
    CategoriesChanged {
        owner_id: String,
    },
    /// Every rollup of the owner was recomputed from the ledger.
    RollupsRebuilt {
        owner_id: String,
    },
}

impl LedgerEvent {
    pub fn owner_id(&self) -> &str {
        match self {
            Self::TransactionRecorded { owner_id, .. }
            | Self::CategoriesChanged { owner_id }
            | Self::RollupsRebuilt { owner_id } => owner_id,
        }
    }
}
