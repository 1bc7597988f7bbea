use crate::render;
use axum::extract::{Form, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use cfgd::container::{Container, Method, Outcome, RequestParams};
use cfgd::kernel::server::ApiState;
use chrono::Utc;
use tokio::task;
use tracing::error;

/// `GET /`: index, configuration views, forms, `EXIT`.
pub(crate) async fn browse(
    State(state): State<ApiState>,
    Query(pairs): Query<Vec<(String, String)>>,
) -> Response {
    respond(state.container.clone(), Method::Get, pairs.into()).await
}

/// `POST /`: urlencoded mutation forms.
pub(crate) async fn submit(
    State(state): State<ApiState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Response {
    respond(state.container.clone(), Method::Post, pairs.into()).await
}

async fn respond(container: Container, method: Method, params: RequestParams) -> Response {
    // Listeners may do blocking I/O while the configuration is locked.
    let dispatched = task::spawn_blocking(move || container.dispatch(method, &params)).await;

    match dispatched {
        Ok(outcome) => page(status_of(&outcome), render::outcome(&outcome)),
        Err(err) => {
            error!(%method, error = %err, "Dispatch task failed");
            page(
                StatusCode::INTERNAL_SERVER_ERROR,
                render::failure("The request could not be completed."),
            )
        },
    }
}

const fn status_of(outcome: &Outcome) -> StatusCode {
    match outcome {
        Outcome::ConfigNotFound { .. } => StatusCode::NOT_FOUND,
        Outcome::InvalidCommand { .. } | Outcome::UnknownCommand { .. } => StatusCode::BAD_REQUEST,
        _ => StatusCode::OK,
    }
}

fn page(status: StatusCode, body: String) -> Response {
    let now = Utc::now().format("%a, %d %b %Y %H:%M:%S GMT").to_string();
    (
        status,
        [
            (header::DATE, now.clone()),
            (header::LAST_MODIFIED, now),
            (header::CACHE_CONTROL, "no-store".to_owned()),
        ],
        Html(body),
    )
        .into_response()
}
