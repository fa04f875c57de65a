use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::entities::customer::Model as CustomerModel;
use crate::errors::ServiceError;
use crate::services::customers::{CreateCustomerRequest, UpdateCustomerRequest};
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPayload {
    pub name: String,
    pub mobile: Option<String>,
    pub nic_or_license: String,
    pub address: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdatePayload {
    pub name: Option<String>,
    pub mobile: Option<String>,
    pub nic_or_license: Option<String>,
    pub address: Option<String>,
    pub photo: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CustomerResponse {
    pub id: Uuid,
    pub name: String,
    pub mobile: Option<String>,
    pub nic_or_license: String,
    pub address: Option<String>,
    pub photo: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<CustomerModel> for CustomerResponse {
    fn from(c: CustomerModel) -> Self {
        Self {
            id: c.id,
            name: c.name,
            mobile: c.mobile,
            nic_or_license: c.nic_or_license,
            address: c.address,
            photo: c.photo,
            created_at: c.created_at,
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/customers",
    responses((status = 200, description = "All customers, newest first", body = [CustomerResponse])),
    tag = "customers"
)]
pub async fn list_customers(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomerResponse>>, ServiceError> {
    let customers = state.services.customers.list_customers().await?;
    Ok(Json(customers.into_iter().map(Into::into).collect()))
}

#[utoipa::path(
    get,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer", body = CustomerResponse),
        (status = 404, description = "Customer not found")
    ),
    tag = "customers"
)]
pub async fn get_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerResponse>, ServiceError> {
    let customer = state.services.customers.get_customer(id).await?;
    Ok(Json(customer.into()))
}

#[utoipa::path(
    post,
    path = "/api/customers",
    request_body = CustomerPayload,
    responses(
        (status = 201, description = "Customer created", body = CustomerResponse),
        (status = 400, description = "Invalid payload or duplicate NIC/license")
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub async fn create_customer(
    State(state): State<AppState>,
    Json(payload): Json<CustomerPayload>,
) -> Result<impl IntoResponse, ServiceError> {
    let customer = state
        .services
        .customers
        .create_customer(CreateCustomerRequest {
            name: payload.name,
            mobile: payload.mobile,
            nic_or_license: payload.nic_or_license,
            address: payload.address,
            photo: payload.photo,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(CustomerResponse::from(customer))))
}

#[utoipa::path(
    put,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    request_body = CustomerUpdatePayload,
    responses(
        (status = 200, description = "Customer updated", body = CustomerResponse),
        (status = 404, description = "Customer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub async fn update_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CustomerUpdatePayload>,
) -> Result<Json<CustomerResponse>, ServiceError> {
    let customer = state
        .services
        .customers
        .update_customer(
            id,
            UpdateCustomerRequest {
                name: payload.name,
                mobile: payload.mobile,
                nic_or_license: payload.nic_or_license,
                address: payload.address,
                photo: payload.photo,
            },
        )
        .await?;
    Ok(Json(customer.into()))
}

#[utoipa::path(
    delete,
    path = "/api/customers/{id}",
    params(("id" = Uuid, Path, description = "Customer ID")),
    responses(
        (status = 200, description = "Customer deleted"),
        (status = 404, description = "Customer not found")
    ),
    security(("bearer_auth" = [])),
    tag = "customers"
)]
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, ServiceError> {
    state.services.customers.delete_customer(id).await?;
    Ok(Json(json!({ "message": "Customer deleted" })))
}
