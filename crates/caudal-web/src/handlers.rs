//! HTTP handlers and routing for the dashboard API.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tera::Context;
use tower_http::trace::TraceLayer;

use caudal_core::Granularity;
use caudal_report::build_view;

use crate::models::{FilterOptions, ViewQuery, ViewRequest};
use crate::state::{AppState, LoadState};

/// Build the application router.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/api/options", get(get_options))
        .route("/api/dashboard", get(get_dashboard))
        .route("/api/filter", post(submit_filter))
        .route("/api/view", get(get_view))
        .route("/api/reload", post(reload))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Load the status-page templates.
pub fn templates() -> tera::Result<tera::Tera> {
    let template_dir = concat!(env!("CARGO_MANIFEST_DIR"), "/templates/**/*");
    let mut tera = tera::Tera::new(template_dir).or_else(|_| tera::Tera::new("templates/**/*"))?;
    tera.autoescape_on(vec![".html"]);
    Ok(tera)
}

fn unavailable(reason: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(serde_json::json!({ "error": reason })),
    )
        .into_response()
}

fn bad_request(reason: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": reason })),
    )
        .into_response()
}

/// Handler for the status page.
pub async fn index(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let mut context = Context::new();
    context.insert("source", &state.hub.source.to_string());

    {
        let data = state.hub.data.read().await;
        match &*data {
            LoadState::Ready(dataset) => {
                context.insert("ready", &true);
                context.insert("transactions", &dataset.len());
                context.insert("years", &dataset.years.len());
                context.insert("categories", &dataset.categories.len());
                context.insert("rejected", &dataset.rejected.len());
            }
            LoadState::Unavailable { reason } => {
                context.insert("ready", &false);
                context.insert("error", reason);
            }
        }
    }

    match state.tera.render("index.html", &context) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "template rendering failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "Template error").into_response()
        }
    }
}

/// API endpoint for the filter dropdown options.
pub async fn get_options(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let data = state.hub.data.read().await;
    match &*data {
        LoadState::Ready(dataset) => Json(FilterOptions {
            granularities: Granularity::all().iter().map(ToString::to_string).collect(),
            years: dataset.filter_years(),
            categories: dataset.filter_categories(),
        })
        .into_response(),
        LoadState::Unavailable { reason } => unavailable(reason),
    }
}

/// API endpoint computing a dashboard view for the query parameters.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ViewQuery>,
) -> impl IntoResponse {
    let request = match query.into_request() {
        Ok(request) => request,
        Err(reason) => return bad_request(&reason),
    };

    let data = state.hub.data.read().await;
    match &*data {
        LoadState::Ready(dataset) => Json(build_view(
            &dataset.transactions,
            &request.filter_config(),
            request.granularity,
        ))
        .into_response(),
        LoadState::Unavailable { reason } => unavailable(reason),
    }
}

/// API endpoint submitting a request to the debounced live-view updater.
pub async fn submit_filter(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ViewRequest>,
) -> impl IntoResponse {
    {
        let data = state.hub.data.read().await;
        if let LoadState::Unavailable { reason } = &*data {
            return unavailable(reason);
        }
    }

    state.debouncer.submit(request);
    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({ "status": "accepted" })),
    )
        .into_response()
}

/// API endpoint serving the latest debounce-computed view.
pub async fn get_view(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    {
        let data = state.hub.data.read().await;
        if let LoadState::Unavailable { reason } = &*data {
            return unavailable(reason);
        }
    }

    let live = state.hub.live.read().await;
    match &*live {
        Some(view) => Json(view).into_response(),
        None => unavailable("no view computed yet"),
    }
}

/// API endpoint reloading the dataset from the configured source.
pub async fn reload(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.hub.reload().await {
        Ok(summary) => Json(summary).into_response(),
        Err(reason) => unavailable(&reason),
    }
}
