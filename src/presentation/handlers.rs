// HTTP request handlers
use crate::application::error::FetchError;
use crate::domain::selection::SelectionUpdate;
use crate::infrastructure::event_stream::{revision_stream, sse_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub fecha: String,
    #[serde(rename = "horaInicio")]
    pub hora_inicio: String,
    #[serde(rename = "horaFin")]
    pub hora_fin: String,
}

#[derive(Deserialize)]
pub struct CountryQuery {
    pub cantidad: Option<u32>,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Current dashboard view
pub async fn get_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.dashboard_service.view().await)
}

/// Push a fresh dashboard view after every store update
pub async fn stream_dashboard(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let service = state.dashboard_service.clone();
    let revisions = service.subscribe();
    let views = revision_stream(revisions, move || {
        let service = service.clone();
        async move { service.view().await }
    });
    sse_response("dashboard", views)
}

pub async fn update_selection(
    State(state): State<Arc<AppState>>,
    Json(update): Json<SelectionUpdate>,
) -> impl IntoResponse {
    Json(state.dashboard_service.update_selection(update).await)
}

/// Leave historical mode and refresh live data right away
pub async fn show_live(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let view = state.dashboard_service.show_live().await;
    state.scheduler.refresh_now();
    Json(view)
}

/// Samples of a whole day
pub async fn day_history(
    Path(fecha): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.dashboard_service.query_day(&fecha).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => historical_failure(&state, e).await,
    }
}

/// Samples of a day between two times
pub async fn range_history(
    Query(query): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state
        .dashboard_service
        .query_range(&query.fecha, &query.hora_inicio, &query.hora_fin)
        .await
    {
        Ok(view) => Json(view).into_response(),
        Err(e) => historical_failure(&state, e).await,
    }
}

pub async fn list_countries(State(state): State<Arc<AppState>>) -> Response {
    match state.catalog_service.list_countries().await {
        Ok(countries) => Json(countries).into_response(),
        Err(e) => {
            tracing::error!("Error fetching countries: {}", e);
            error_response(&e)
        }
    }
}

/// Route measurements through `pais` and restart the live buffer
pub async fn select_country(
    Path(pais): Path<String>,
    Query(query): Query<CountryQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let count = query.cantidad.unwrap_or(state.servers_per_country);
    match state.dashboard_service.select_country(&pais, count).await {
        Ok(view) => {
            state.scheduler.refresh_now();
            Json(view).into_response()
        }
        Err(e) => {
            tracing::error!("Error selecting country {}: {}", pais, e);
            error_response(&e)
        }
    }
}

pub async fn list_servers(State(state): State<Arc<AppState>>) -> Response {
    match state.catalog_service.list_servers().await {
        Ok(catalog) => Json(catalog).into_response(),
        Err(e) => {
            tracing::error!("Error fetching servers: {}", e);
            error_response(&e)
        }
    }
}

async fn historical_failure(state: &AppState, e: FetchError) -> Response {
    // the view already carries the failure; prior data is still in it
    let view = state.dashboard_service.view().await;
    (status_for(&e), Json(view)).into_response()
}

fn error_response(e: &FetchError) -> Response {
    (
        status_for(e),
        Json(serde_json::json!({ "error": e.to_string() })),
    )
        .into_response()
}

fn status_for(e: &FetchError) -> StatusCode {
    match e {
        FetchError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::BAD_GATEWAY,
    }
}
