use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use cfgd::container::Configuration;
use cfgd::domain::constants::CONTAINER_TAG;
use cfgd::kernel::server::ApiState;
use cfgd_derive::{api_handler, api_model};
use std::collections::BTreeMap;

#[api_model]
/// Registry entry
pub(crate) struct ConfigurationSummary {
    /// Identifier
    pub id: String,
    /// Display name
    pub display_name: String,
}

#[api_model]
/// A configuration with its properties
pub(crate) struct ConfigurationDetail {
    /// Identifier
    pub id: String,
    /// Display name
    pub display_name: String,
    /// Properties in key order
    pub properties: BTreeMap<String, String>,
}

#[api_handler(
    get,
    path = "/api/container",
    responses((status = OK, description = "Registered configurations", body = Vec<ConfigurationSummary>)),
    tag = CONTAINER_TAG,
)]
pub(crate) async fn list_configurations(
    State(state): State<ApiState>,
) -> Json<Vec<ConfigurationSummary>> {
    let entries = state
        .container
        .registry()
        .entries()
        .into_iter()
        .map(|entry| ConfigurationSummary { id: entry.id, display_name: entry.display_name })
        .collect();
    Json(entries)
}

#[api_handler(
    get,
    path = "/api/container/{id}",
    params(("id" = String, Path, description = "Configuration identifier")),
    responses(
        (status = OK, description = "The configuration", body = ConfigurationDetail),
        (status = NOT_FOUND, description = "No configuration with that identifier"),
    ),
    tag = CONTAINER_TAG,
)]
pub(crate) async fn get_configuration(
    State(state): State<ApiState>,
    Path(id): Path<String>,
) -> Result<Json<ConfigurationDetail>, StatusCode> {
    let shared = state.container.registry().get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let snapshot = shared.lock().snapshot();
    Ok(Json(ConfigurationDetail {
        id: snapshot.id,
        display_name: snapshot.display_name,
        properties: snapshot.properties,
    }))
}
