//! Rollup maintenance endpoints.

use api_types::rollups::{RollupDrift, RollupReport, RollupScope};
use axum::{Extension, Json, extract::State};

use crate::{ServerError, server::{Owner, ServerState}};

fn map_report(report: engine::RollupReport) -> RollupReport {
    RollupReport {
        consistent: report.is_consistent(),
        ledger_entries: report.ledger_entries,
        drifts: report
            .drifts
            .into_iter()
            .map(|drift| RollupDrift {
                scope: match drift.scope {
                    engine::RollupScope::Day { year, month, day } => {
                        RollupScope::Day { year, month, day }
                    }
                    engine::RollupScope::Month { year, month } => {
                        RollupScope::Month { year, month }
                    }
                },
                stored_income_minor: drift.stored_income,
                stored_expense_minor: drift.stored_expense,
                ledger_income_minor: drift.ledger_income,
                ledger_expense_minor: drift.ledger_expense,
            })
            .collect(),
    }
}

pub async fn verify(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<RollupReport>, ServerError> {
    let report = state.engine.verify_rollups(&owner).await?;
    if !report.is_consistent() {
        tracing::warn!(owner = %owner, drifts = report.drifts.len(), "rollup drift detected");
    }
    Ok(Json(map_report(report)))
}

/// Rebuild the caller's rollups, then return the fresh report.
pub async fn rebuild(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<RollupReport>, ServerError> {
    state.engine.rebuild_rollups(&owner).await?;
    tracing::info!(owner = %owner, "rollups rebuilt");

    let report = state.engine.verify_rollups(&owner).await?;
    Ok(Json(map_report(report)))
}
