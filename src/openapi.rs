use axum::{routing::get, Json, Router};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Rentals API",
        version = "1.0.0",
        description = "REST API for a small-business rental operation: a materials stock ledger, \
rental transactions with stock reconciliation, a customer registry, text completions, and reports."
    ),
    tags(
        (name = "rentals", description = "Rental transactions"),
        (name = "materials", description = "Materials stock ledger"),
        (name = "customers", description = "Customer registry"),
        (name = "suggestions", description = "Text completion"),
        (name = "reports", description = "Rental reports"),
        (name = "auth", description = "Authentication")
    ),
    paths(
        crate::handlers::rentals::list_rentals,
        crate::handlers::rentals::get_rental,
        crate::handlers::rentals::create_rental,
        crate::handlers::rentals::update_rental,
        crate::handlers::rentals::delete_rental,
        crate::handlers::rentals::lookup_price,

        crate::handlers::materials::list_materials,
        crate::handlers::materials::get_material,
        crate::handlers::materials::create_material,
        crate::handlers::materials::update_material,
        crate::handlers::materials::delete_material,
        crate::handlers::materials::update_stock,
        crate::handlers::materials::restore_stock,

        crate::handlers::customers::list_customers,
        crate::handlers::customers::get_customer,
        crate::handlers::customers::create_customer,
        crate::handlers::customers::update_customer,
        crate::handlers::customers::delete_customer,

        crate::handlers::suggestions::suggest,
        crate::handlers::reports::rental_report,

        crate::auth::register_handler,
        crate::auth::login_handler,
    ),
    components(
        schemas(
            crate::handlers::rentals::RentalPayload,
            crate::handlers::rentals::RentalItemPayload,
            crate::handlers::rentals::StockLinePayload,
            crate::handlers::rentals::RentalResponse,
            crate::handlers::rentals::RentalItemResponse,

            crate::handlers::materials::MaterialPayload,
            crate::handlers::materials::MaterialUpdatePayload,
            crate::handlers::materials::MaterialResponse,
            crate::handlers::materials::StockAdjustmentPayload,

            crate::handlers::customers::CustomerPayload,
            crate::handlers::customers::CustomerUpdatePayload,
            crate::handlers::customers::CustomerResponse,

            crate::services::reports::ReportPeriod,

            crate::auth::CredentialsRequest,
            crate::auth::TokenResponse,

            crate::errors::ErrorResponse
        )
    ),
    modifiers(&BearerAuth)
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Serves the generated document at /api-docs/openapi.json.
pub fn routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new().route(
        "/api-docs/openapi.json",
        get(|| async { Json(ApiDoc::openapi()) }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_includes_rental_paths_and_security_scheme() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/api/rentals"));
        assert!(doc.paths.paths.contains_key("/api/materials/update-stock"));
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
