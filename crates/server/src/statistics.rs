//! Statistics API endpoints

use api_types::{
    RangeQuery,
    stats::{Balance, CategoryTotal, CategoryTotalsResponse},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
};

use axum_extra::extract::WithRejection;

use crate::{ServerError, date_range, kind_to_api, server::{Owner, ServerState}};

/// Income and expense totals over the requested range
pub async fn balance(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<RangeQuery>, ServerError>,
) -> Result<Json<Balance>, ServerError> {
    let range = date_range(&state.engine, &query)?;
    let balance = state.engine.balance(&owner, range).await?;

    Ok(Json(Balance {
        total_income_minor: balance.income,
        total_expenses_minor: balance.expense,
        balance_minor: balance.net(),
    }))
}

/// Per-category totals over the requested range, largest first
pub async fn category_totals(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<RangeQuery>, ServerError>,
) -> Result<Json<CategoryTotalsResponse>, ServerError> {
    let range = date_range(&state.engine, &query)?;
    let totals = state
        .engine
        .category_totals(&owner, range)
        .await?
        .into_iter()
        .map(|total| CategoryTotal {
            kind: kind_to_api(total.kind),
            category: total.category,
            category_icon: total.category_icon,
            total_minor: total.total,
        })
        .collect();

    Ok(Json(CategoryTotalsResponse { totals }))
}
