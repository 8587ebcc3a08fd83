//! API route definitions

use crate::state::AppState;
use utoipa::OpenApi;
use utoipa_axum::{router::OpenApiRouter, routes};

pub mod health;
pub mod permissions;

#[derive(OpenApi)]
#[openapi(
    info(title = "Bazaar permission gate"),
    components(schemas(crate::error::ErrorResponse)),
    tags(
        (name = "health", description = "Service health"),
        (name = "permissions", description = "Role grant administration"),
    ),
)]
struct ApiDoc;

/// All built-in routes with their OpenAPI description
pub fn router(state: &AppState) -> OpenApiRouter<AppState> {
    OpenApiRouter::with_openapi(ApiDoc::openapi())
        .routes(routes!(health::health_check))
        .merge(permissions::router(state))
}
