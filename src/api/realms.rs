use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, Result},
    models::{ApiResponse, RealmListing, RealmSnapshot},
    services::realm_queries::RealmRange,
};

use super::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListRealmsQuery {
    pub min_id: Option<u64>,
    pub max_id: Option<u64>,
    pub limit: Option<u32>,
    pub name: Option<String>,
}

/// GET /api/v1/realms?min_id=&max_id=&limit=&name=
pub async fn list_realms(
    State(state): State<AppState>,
    Query(query): Query<ListRealmsQuery>,
) -> Result<Json<ApiResponse<Vec<RealmListing>>>> {
    let range = RealmRange::new(query.min_id, query.max_id, query.limit)?;
    let realms = state.realms.list_realms(&range, query.name.as_deref()).await?;
    Ok(Json(ApiResponse::success(realms)))
}

/// GET /api/v1/realms/{realm_id}
pub async fn get_realm(
    State(state): State<AppState>,
    Path(realm_id): Path<String>,
) -> Result<Json<ApiResponse<RealmSnapshot>>> {
    let realm_id = parse_realm_id(&realm_id)?;
    let snapshot = state.realms.get_realm(realm_id).await?;

    tracing::debug!(
        realm_id,
        resources = snapshot.resources.len(),
        warnings = snapshot.warnings.len(),
        "Realm snapshot ready"
    );

    Ok(Json(ApiResponse::success((*snapshot).clone())))
}

fn parse_realm_id(raw: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Invalid realm id: {raw}")))
}
