use api_types::RangeQuery;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::{DateRange, Engine, EngineError, parse_date};

use serde::Serialize;
pub use server::{Owner, router, run, run_with_listener, spawn_with_listener};

mod categories;
mod history;
mod rollups;
mod server;
mod settings;
mod statistics;
mod transactions;

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
    /// An extractor refused the request (bad query, path or body).
    Rejected(StatusCode, String),
}

#[derive(Serialize)]
struct Error {
    error: String,
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::KeyNotFound(_) => StatusCode::NOT_FOUND,
        EngineError::ExistingKey(_) => StatusCode::CONFLICT,
        EngineError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
        EngineError::InvalidAmount(_)
        | EngineError::InvalidKind(_)
        | EngineError::InvalidDate(_)
        | EngineError::InvalidRange(_)
        | EngineError::InvalidName(_)
        | EngineError::InvalidOwner(_)
        | EngineError::InvalidCurrency(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "storage unavailable, retry later".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Generic(err) => (StatusCode::BAD_REQUEST, err),
            ServerError::Rejected(status, err) => (status, err),
        };

        (status, Json(Error { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

macro_rules! impl_from_rejection {
    ($($rejection:ty),*) => {
        $(impl From<$rejection> for ServerError {
            fn from(value: $rejection) -> Self {
                Self::Rejected(value.status(), value.body_text())
            }
        })*
    };
}

impl_from_rejection!(JsonRejection, PathRejection, QueryRejection);

/// Parse and validate a `?from&to` query against the engine's range cap.
fn date_range(engine: &Engine, query: &RangeQuery) -> Result<DateRange, ServerError> {
    let from = parse_date(&query.from)?;
    let to = parse_date(&query.to)?;
    Ok(engine.date_range(from, to)?)
}

fn kind_from_api(kind: api_types::TransactionKind) -> engine::TransactionKind {
    match kind {
        api_types::TransactionKind::Income => engine::TransactionKind::Income,
        api_types::TransactionKind::Expense => engine::TransactionKind::Expense,
    }
}

fn kind_to_api(kind: engine::TransactionKind) -> api_types::TransactionKind {
    match kind {
        engine::TransactionKind::Income => api_types::TransactionKind::Income,
        engine::TransactionKind::Expense => api_types::TransactionKind::Expense,
    }
}
