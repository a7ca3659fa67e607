//! Transactions API endpoints

use api_types::{
    RangeQuery,
    transaction::{TransactionListResponse, TransactionNew, TransactionView},
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::{Currency, MoneyCents, RecordTransactionCmd, Transaction, parse_date};

use crate::{ServerError, date_range, kind_from_api, kind_to_api, server::{Owner, ServerState}};

fn map_transaction(tx: Transaction, amount_formatted: String) -> TransactionView {
    TransactionView {
        id: tx.id,
        kind: kind_to_api(tx.kind),
        amount_minor: tx.amount_minor,
        amount_formatted,
        category: tx.category,
        category_icon: tx.category_icon,
        date: tx.occurred_on,
        note: tx.note,
        created_at: tx.created_at,
    }
}

pub async fn record(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<TransactionNew>, ServerError>,
) -> Result<(StatusCode, Json<TransactionView>), ServerError> {
    let amount = MoneyCents::parse_positive(&payload.amount)?;
    let occurred_on = parse_date(&payload.date)?;

    let mut cmd = RecordTransactionCmd::new(
        owner.as_str(),
        amount.cents(),
        kind_from_api(payload.kind),
        payload.category,
        occurred_on,
    );
    if let Some(note) = payload.note {
        cmd = cmd.note(note);
    }

    // Once the write commits, nothing below may fail with a storage error.
    let currency: Currency = state.engine.currency(&owner).await?;
    let tx = state.engine.record_transaction(cmd).await?;
    tracing::info!(
        owner = %owner,
        kind = tx.kind.as_str(),
        amount_minor = tx.amount_minor,
        date = %tx.occurred_on,
        "transaction recorded"
    );

    let formatted = currency.format(tx.amount());
    Ok((StatusCode::CREATED, Json(map_transaction(tx, formatted))))
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<RangeQuery>, ServerError>,
) -> Result<Json<TransactionListResponse>, ServerError> {
    let range = date_range(&state.engine, &query)?;
    let transactions = state
        .engine
        .list_transactions(&owner, range)
        .await?
        .into_iter()
        .map(|view| map_transaction(view.transaction, view.formatted_amount))
        .collect();

    Ok(Json(TransactionListResponse { transactions }))
}
