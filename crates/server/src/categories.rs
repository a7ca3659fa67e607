//! Categories API endpoints.

use api_types::{
    TransactionKind as ApiKind,
    category::{CategoryListResponse, CategoryNew, CategoryQuery, CategoryView},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::WithRejection;
use engine::CreateCategoryCmd;

use crate::{ServerError, kind_from_api, kind_to_api, server::{Owner, ServerState}};

fn map_category(category: engine::Category) -> CategoryView {
    CategoryView {
        id: category.id,
        name: category.name,
        kind: kind_to_api(category.kind),
        icon: category.icon,
    }
}

pub async fn list(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    WithRejection(Query(query), _): WithRejection<Query<CategoryQuery>, ServerError>,
) -> Result<Json<CategoryListResponse>, ServerError> {
    let categories = state
        .engine
        .list_categories(&owner, query.kind.map(kind_from_api))
        .await?
        .into_iter()
        .map(map_category)
        .collect();

    Ok(Json(CategoryListResponse { categories }))
}

pub async fn create(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    WithRejection(Json(payload), _): WithRejection<Json<CategoryNew>, ServerError>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let category = state
        .engine
        .create_category(CreateCategoryCmd::new(
            owner.as_str(),
            payload.name,
            kind_from_api(payload.kind),
            payload.icon,
        ))
        .await?;
    tracing::info!(owner = %owner, name = %category.name, "category created");

    Ok((StatusCode::CREATED, Json(map_category(category))))
}

pub async fn delete(
    Extension(Owner(owner)): Extension<Owner>,
    State(state): State<ServerState>,
    WithRejection(Path((kind, name)), _): WithRejection<Path<(ApiKind, String)>, ServerError>,
) -> Result<StatusCode, ServerError> {
    state
        .engine
        .delete_category(&owner, &name, kind_from_api(kind))
        .await?;
    tracing::info!(owner = %owner, name = %name, "category deleted");

    Ok(StatusCode::NO_CONTENT)
}
