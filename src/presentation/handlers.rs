// HTTP request handlers
use crate::presentation::app_state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

#[derive(Deserialize)]
pub struct RangeQuery {
    pub hours: Option<i32>,
}

/// Labeled error body. Upstream failures become scoped messages, never
/// opaque 500s.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List known dashboards from the poller-maintained index
pub async fn list_dashboards(State(state): State<Arc<AppState>>) -> Response {
    let index = state.index.read().await;
    Json(index.clone()).into_response()
}

/// Render a dashboard: fetch its layout, bind every query, return the
/// rendered tree as JSON
pub async fn get_dashboard(
    Path(id): Path<String>,
    Query(range): Query<RangeQuery>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let hours = range.hours.unwrap_or(6);

    let layout = match state.layouts.fetch_layout(&id).await {
        Ok(layout) => layout,
        Err(e) => {
            tracing::warn!("layout fetch failed for dashboard {id}: {e:#}");
            let body = ErrorBody {
                error: format!("failed to load dashboard {id}: {e:#}"),
            };
            return (StatusCode::BAD_GATEWAY, Json(body)).into_response();
        }
    };

    let mut vars = HashMap::new();
    vars.insert("hours".to_string(), hours.to_string());

    let rendered = state
        .dashboard_service
        .render_dashboard(&id, &layout, &vars)
        .await;
    Json(rendered).into_response()
}
