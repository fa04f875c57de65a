use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::services::rentals::{RentalDraft, RentalItemDraft, RentalRecord, StockLine};
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalItemPayload {
    pub item_name: String,
    #[serde(default)]
    pub model: String,
    pub quantity: i32,
    pub price: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StockLinePayload {
    pub item_name: String,
    #[serde(default)]
    pub model: String,
    pub quantity: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalPayload {
    pub customer_name: String,
    pub mobile: Option<String>,
    pub nic_or_license: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub amount_paid: Decimal,
    pub items: Vec<RentalItemPayload>,
    /// Line items as they stood before an edit, so their stock can be
    /// restored first. Ignored on create.
    #[serde(default)]
    pub original_items: Option<Vec<StockLinePayload>>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalItemResponse {
    pub item_name: String,
    pub model: String,
    pub quantity: i32,
    pub price: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RentalResponse {
    pub id: Uuid,
    pub customer_name: String,
    pub mobile: Option<String>,
    pub nic_or_license: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub number_of_days: i32,
    pub amount_paid: Decimal,
    pub grand_total: Decimal,
    pub remaining_amount: Decimal,
    pub items: Vec<RentalItemResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<RentalRecord> for RentalResponse {
    fn from(record: RentalRecord) -> Self {
        let rental = record.rental;
        Self {
            id: rental.id,
            customer_name: rental.customer_name,
            mobile: rental.mobile,
            nic_or_license: rental.nic_or_license,
            start_date: rental.start_date,
            end_date: rental.end_date,
            number_of_days: rental.number_of_days,
            amount_paid: rental.amount_paid,
            grand_total: rental.grand_total,
            remaining_amount: rental.remaining_amount,
            items: record
                .items
                .into_iter()
                .map(|item| RentalItemResponse {
                    item_name: item.item_name,
                    model: item.model,
                    quantity: item.quantity,
                    price: item.price,
                    total: item.total,
                })
                .collect(),
            created_at: rental.created_at,
            updated_at: rental.updated_at,
        }
    }
}

fn to_draft(payload: &RentalPayload) -> RentalDraft {
    RentalDraft {
        customer_name: payload.customer_name.clone(),
        mobile: payload.mobile.clone(),
        nic_or_license: payload.nic_or_license.clone(),
        start_date: payload.start_date,
        end_date: payload.end_date,
        amount_paid: payload.amount_paid,
        items: payload
            .items
            .iter()
            .map(|item| RentalItemDraft {
                item_name: item.item_name.clone(),
                model: item.model.clone(),
                quantity: item.quantity,
                price: item.price,
            })
            .collect(),
    }
}

#[utoipa::path(
    get,
    path = "/api/rentals",
    responses(
        (status = 200, description = "All rentals, newest first", body = [RentalResponse]),
        (status = 401, description = "Missing or invalid token")
    ),
    security(("bearer_auth" = [])),
    tag = "rentals"
)]
pub async fn list_rentals(
    State(state): State<AppState>,
) -> Result<Json<Vec<RentalResponse>>, ServiceError> {
    let rentals = state.services.rentals.list_rentals().await?;
    Ok(Json(rentals.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/rentals/{id}",
    params(("id" = Uuid, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Rental with its items", body = RentalResponse),
        (status = 404, description = "Rental not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rentals"
)]
pub async fn get_rental(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<RentalResponse>, ServiceError> {
    let record = state.services.rentals.get_rental(id).await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    post,
    path = "/api/rentals",
    request_body = RentalPayload,
    responses(
        (status = 201, description = "Rental created", body = RentalResponse),
        (status = 400, description = "Incomplete or invalid submission")
    ),
    security(("bearer_auth" = [])),
    tag = "rentals"
)]
pub async fn create_rental(
    State(state): State<AppState>,
    Json(payload): Json<RentalPayload>,
) -> Result<impl IntoResponse, ServiceError> {
    let record = state.services.rentals.create_rental(to_draft(&payload)).await?;
    Ok((StatusCode::CREATED, Json(RentalResponse::from(record))))
}

#[utoipa::path(
    put,
    path = "/api/rentals/{id}",
    params(("id" = Uuid, Path, description = "Rental ID")),
    request_body = RentalPayload,
    responses(
        (status = 200, description = "Rental replaced", body = RentalResponse),
        (status = 400, description = "Incomplete or invalid submission"),
        (status = 404, description = "Rental not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rentals"
)]
pub async fn update_rental(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RentalPayload>,
) -> Result<Json<RentalResponse>, ServiceError> {
    let original_items = payload.original_items.as_ref().map(|lines| {
        lines
            .iter()
            .map(|line| StockLine {
                item_name: line.item_name.clone(),
                model: line.model.clone(),
                quantity: line.quantity,
            })
            .collect()
    });

    let record = state
        .services
        .rentals
        .update_rental(id, to_draft(&payload), original_items)
        .await?;
    Ok(Json(record.into()))
}

#[utoipa::path(
    delete,
    path = "/api/rentals/{id}",
    params(("id" = Uuid, Path, description = "Rental ID")),
    responses(
        (status = 200, description = "Rental deleted and stock restored"),
        (status = 404, description = "Rental not found")
    ),
    security(("bearer_auth" = [])),
    tag = "rentals"
)]
pub async fn delete_rental(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.rentals.delete_rental(id).await?;
    Ok(Json(json!({ "message": "Rental deleted" })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuery {
    pub item_name: Option<String>,
    pub model: Option<String>,
}

/// Unit price lookup used while composing a rental. An unknown pair yields
/// an empty price rather than an error.
#[utoipa::path(
    get,
    path = "/api/rentals/price",
    params(
        ("itemName" = String, Query, description = "Item name"),
        ("model" = String, Query, description = "Model"),
    ),
    responses(
        (status = 200, description = "Unit price, or empty string when unknown"),
        (status = 400, description = "Missing itemName or model")
    ),
    security(("bearer_auth" = [])),
    tag = "rentals"
)]
pub async fn lookup_price(
    State(state): State<AppState>,
    Query(query): Query<PriceQuery>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    let (item_name, model) = match (query.item_name, query.model) {
        (Some(item_name), Some(model)) => (item_name, model),
        _ => {
            return Err(ServiceError::BadRequest(
                "Missing itemName or model".to_string(),
            ))
        }
    };

    let price = state.services.materials.find_price(&item_name, &model).await?;
    let body = match price {
        Some(price) => json!({ "price": price }),
        None => json!({ "price": "" }),
    };
    Ok(Json(body))
}
