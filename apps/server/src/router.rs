use crate::{api, handlers};
use axum::Router;
use axum::routing::get;
use cfgd::kernel::server::ApiState;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;
use utoipa_scalar::{Scalar, Servable};

#[derive(OpenApi)]
#[openapi(info(title = "cfgd", description = "Browse and edit in-memory configurations"))]
struct ApiDoc;

pub(crate) fn init(state: ApiState) -> Router {
    let api = ApiDoc::openapi();

    // Separate the OpenAPI routes and the API documentation object
    let (openapi_routes, api_doc) = OpenApiRouter::with_openapi(api)
        .merge(cfgd::server::router::system_router())
        .routes(routes!(api::list_configurations))
        .routes(routes!(api::get_configuration))
        .split_for_parts();

    // Create the Scalar UI routes
    let scalar_routes = Scalar::with_url("/api", api_doc);

    Router::new()
        .route("/", get(handlers::browse).post(handlers::submit))
        .merge(openapi_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        .merge(scalar_routes)
}
