use super::{ApiState, health};
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// Operational routes (`/health`), documented in the `OpenAPI` spec.
pub fn system_router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::<ApiState>::new().routes(routes!(health::health_handler))
}
