use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::handlers::rentals::RentalResponse;
use crate::services::reports::{ReportPeriod, ReportQuery};
use crate::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    pub customer_name: Option<String>,
    pub date: Option<NaiveDate>,
    #[serde(rename = "type")]
    pub period: Option<ReportPeriod>,
}

/// Rental report filtered by customer name fragment and/or a daily,
/// monthly or yearly window anchored at `date`.
#[utoipa::path(
    get,
    path = "/api/reports",
    params(
        ("customerName" = Option<String>, Query, description = "Customer name fragment"),
        ("date" = Option<String>, Query, description = "Anchor date (YYYY-MM-DD)"),
        ("type" = Option<String>, Query, description = "daily, monthly or yearly"),
    ),
    responses(
        (status = 200, description = "Matching rentals", body = [RentalResponse])
    ),
    security(("bearer_auth" = [])),
    tag = "reports"
)]
pub async fn rental_report(
    State(state): State<AppState>,
    Query(params): Query<ReportParams>,
) -> Result<Json<Vec<RentalResponse>>, ServiceError> {
    let records = state
        .services
        .reports
        .rental_report(ReportQuery {
            customer_name: params.customer_name,
            date: params.date,
            period: params.period,
        })
        .await?;

    Ok(Json(records.into_iter().map(Into::into).collect()))
}
