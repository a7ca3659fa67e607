use api_types::settings::{SettingsUpdate, SettingsView};
use axum::{Extension, Json, extract::State};

use axum_extra::extract::WithRejection;

use crate::{ServerError, server::{Owner, ServerState}};

fn map_settings(settings: engine::UserSettings) -> SettingsView {
    let currency = match settings.currency {
        engine::Currency::Usd => api_types::Currency::Usd,
        engine::Currency::Brl => api_types::Currency::Brl,
    };
    SettingsView { currency }
}

pub async fn get(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
) -> Result<Json<SettingsView>, ServerError> {
    let settings = state.engine.settings(&owner).await?;
    Ok(Json(map_settings(settings)))
}

pub async fn update(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<SettingsUpdate>, ServerError>,
) -> Result<Json<SettingsView>, ServerError> {
    let settings = state
        .engine
        .update_currency(&owner, &payload.currency)
        .await?;
    tracing::info!(owner = %owner, currency = %settings.currency, "currency updated");
    Ok(Json(map_settings(settings)))
}
