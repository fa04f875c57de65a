use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::errors::ServiceError;
use crate::services::suggestions::SuggestionField;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestionQuery {
    pub field: Option<String>,
    #[serde(default)]
    pub query: String,
}

/// Text completion for rental composition. Matches are case-insensitive
/// and capped at five distinct values.
#[utoipa::path(
    get,
    path = "/api/suggestions",
    params(
        ("field" = String, Query, description = "One of customerName, itemName, model"),
        ("query" = String, Query, description = "Fragment to match"),
    ),
    responses(
        (status = 200, description = "Up to five candidate strings", body = [String]),
        (status = 400, description = "Unknown field")
    ),
    security(("bearer_auth" = [])),
    tag = "suggestions"
)]
pub async fn suggest(
    State(state): State<AppState>,
    Query(query): Query<SuggestionQuery>,
) -> Result<Json<Vec<String>>, ServiceError> {
    let field = query
        .field
        .as_deref()
        .ok_or_else(|| ServiceError::BadRequest("Invalid field".to_string()))?;
    let field = SuggestionField::parse(field)?;

    let suggestions = state.services.suggestions.suggest(field, &query.query).await?;
    Ok(Json(suggestions))
}
