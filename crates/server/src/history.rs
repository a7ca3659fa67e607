use api_types::history::{HistoryEntry, HistoryQuery, HistoryResponse, PeriodsResponse, Timeframe};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use axum_extra::extract::WithRejection;

use crate::{ServerError, server::{Owner, ServerState}};

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<HistoryQuery>, ServerError>,
) -> Result<Json<HistoryResponse>, ServerError> {
    let timeframe = match query.timeframe {
        Timeframe::Month => engine::Timeframe::Month,
        Timeframe::Year => engine::Timeframe::Year,
    };
    let entries = state
        .engine
        .history(&owner, timeframe, query.year, query.month)
        .await?
        .into_iter()
        .map(|entry| HistoryEntry {
            year: entry.year,
            month: entry.month,
            day: entry.day,
            income_minor: entry.income,
            expense_minor: entry.expense,
        })
        .collect();

    Ok(Json(HistoryResponse { entries }))
}

pub async fn periods(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<PeriodsResponse>, ServerError> {
    let years = state.engine.available_years(&owner).await?;
    Ok(Json(PeriodsResponse { years }))
}
