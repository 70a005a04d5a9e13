use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    models::{ApiResponse, RawFieldRecord, ResourceSummary},
    services::resource_classifier::ResourceClass,
};

use super::AppState;

#[derive(Debug, Deserialize)]
pub struct DecodeRequest {
    pub fields: RawFieldRecord,
    pub level: Option<i64>,
    pub name: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DecodeResponse {
    pub name: String,
    pub level: u32,
    #[serde(flatten)]
    pub summary: ResourceSummary,
}

/// POST /api/v1/resources/decode
///
/// Decodes a caller-supplied record. Nothing here touches the query service.
pub async fn decode_record(
    State(state): State<AppState>,
    Json(req): Json<DecodeRequest>,
) -> Result<Json<ApiResponse<DecodeResponse>>> {
    let level = normalize_level(req.level);
    let mut summary = state.realms.summarize(&req.fields, level);
    let name = state.realms.decode_name(req.name.as_deref(), &mut summary.warnings);

    Ok(Json(ApiResponse::success(DecodeResponse {
        name,
        level,
        summary,
    })))
}

/// GET /api/v1/resources/classify/{field}
pub async fn classify_field(
    State(state): State<AppState>,
    Path(field): Path<String>,
) -> Result<Json<ApiResponse<ResourceClass>>> {
    if field.trim().is_empty() {
        return Err(AppError::BadRequest("Field name is required".to_string()));
    }
    Ok(Json(ApiResponse::success(state.realms.classifier().classify(&field))))
}

fn normalize_level(level: Option<i64>) -> u32 {
    level
        .unwrap_or(1)
        .clamp(1, i64::from(u32::MAX)) as u32
}
