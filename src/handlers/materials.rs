use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::material::Model as MaterialModel;
use crate::errors::ServiceError;
use crate::services::materials::{CreateMaterialRequest, UpdateMaterialRequest};
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPayload {
    pub item_name: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub quantity: i32,
    pub price: Decimal,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUpdatePayload {
    pub item_name: Option<String>,
    pub model: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<Decimal>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterialResponse {
    pub id: Uuid,
    pub item_name: String,
    pub model: String,
    pub quantity: i32,
    pub price: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<MaterialModel> for MaterialResponse {
    fn from(m: MaterialModel) -> Self {
        Self {
            id: m.id,
            item_name: m.item_name,
            model: m.model,
            quantity: m.quantity,
            price: m.price,
            notes: m.notes,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

/// Body for the stock adjustment endpoints
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockAdjustmentPayload {
    pub item_name: String,
    #[serde(default)]
    pub model: String,
    pub quantity: i32,
}

#[utoipa::path(
    get,
    path = "/api/materials",
    responses((status = 200, description = "All materials, newest first", body = [MaterialResponse])),
    tag = "materials"
)]
pub async fn list_materials(
    State(state): State<AppState>,
) -> Result<Json<Vec<MaterialResponse>>, ServiceError> {
    let materials = state.services.materials.list_materials().await?;
    Ok(Json(materials.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/materials/{id}",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material", body = MaterialResponse),
        (status = 404, description = "Material not found")
    ),
    tag = "materials"
)]
pub async fn get_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MaterialResponse>, ServiceError> {
    let material = state.services.materials.get_material(id).await?;
    Ok(Json(material.into()))
}

#[utoipa::path(
    post,
    path = "/api/materials",
    request_body = MaterialPayload,
    responses(
        (status = 201, description = "Material created", body = MaterialResponse),
        (status = 400, description = "Invalid payload")
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn create_material(
    State(state): State<AppState>,
    Json(payload): Json<MaterialPayload>,
) -> Result<impl IntoResponse, ServiceError> {
    let material = state
        .services
        .materials
        .create_material(CreateMaterialRequest {
            item_name: payload.item_name,
            model: Some(payload.model),
            quantity: payload.quantity,
            price: payload.price,
            notes: payload.notes,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(MaterialResponse::from(material))))
}

#[utoipa::path(
    put,
    path = "/api/materials/{id}",
    params(("id" = Uuid, Path, description = "Material ID")),
    request_body = MaterialUpdatePayload,
    responses(
        (status = 200, description = "Material updated", body = MaterialResponse),
        (status = 400, description = "Invalid payload"),
        (status = 404, description = "Material not found")
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn update_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<MaterialUpdatePayload>,
) -> Result<Json<MaterialResponse>, ServiceError> {
    let material = state
        .services
        .materials
        .update_material(
            id,
            UpdateMaterialRequest {
                item_name: payload.item_name,
                model: payload.model,
                quantity: payload.quantity,
                price: payload.price,
                notes: payload.notes,
            },
        )
        .await?;
    Ok(Json(material.into()))
}

#[utoipa::path(
    delete,
    path = "/api/materials/{id}",
    params(("id" = Uuid, Path, description = "Material ID")),
    responses(
        (status = 200, description = "Material deleted"),
        (status = 404, description = "Material not found")
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn delete_material(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.materials.delete_material(id).await?;
    Ok(Json(json!({ "message": "Material deleted" })))
}

/// Consumes stock after a rental is placed. Clamped at zero.
#[utoipa::path(
    post,
    path = "/api/materials/update-stock",
    request_body = StockAdjustmentPayload,
    responses(
        (status = 200, description = "Stock updated"),
        (status = 404, description = "Material not found")
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn update_stock(
    State(state): State<AppState>,
    Json(payload): Json<StockAdjustmentPayload>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state
        .services
        .materials
        .adjust_stock(&payload.item_name, &payload.model, -payload.quantity)
        .await?;
    Ok(Json(json!({ "message": "Stock updated" })))
}

/// Returns stock to the ledger when a rental is edited or deleted.
#[utoipa::path(
    post,
    path = "/api/materials/restore-stock",
    request_body = StockAdjustmentPayload,
    responses(
        (status = 200, description = "Stock restored"),
        (status = 404, description = "Material not found")
    ),
    security(("bearer_auth" = [])),
    tag = "materials"
)]
pub async fn restore_stock(
    State(state): State<AppState>,
    Json(payload): Json<StockAdjustmentPayload>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state
        .services
        .materials
        .adjust_stock(&payload.item_name, &payload.model, payload.quantity)
        .await?;
    Ok(Json(json!({ "message": "Stock restored" })))
}
