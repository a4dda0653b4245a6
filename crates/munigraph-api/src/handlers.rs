use crate::{ApiResult, AppState};
use axum::{
    extract::{Query, State},
    Json,
};
use munigraph_graph::{active_communes, extract, legend, CommuneOption, LegendEntry, ViewModel};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::debug;

#[derive(Debug, Deserialize, Default)]
pub struct FocusParams {
    pub focus: Option<String>,
}

impl FocusParams {
    fn focus(&self) -> Option<&str> {
        self.focus.as_deref().map(str::trim).filter(|f| !f.is_empty())
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub nodes: usize,
    pub edges: usize,
    pub active_until: i32,
}

fn focus_view(state: &AppState, params: &FocusParams) -> ApiResult<ViewModel> {
    let Some(focus) = params.focus() else {
        return Ok(ViewModel::default());
    };
    let snapshot = state.snapshot();
    let component = extract(&snapshot.graph, focus)?;
    debug!(
        focus,
        nodes = component.node_count(),
        edges = component.edge_count(),
        "extracted component"
    );
    Ok(ViewModel::from_graph(&component))
}

pub async fn list_communes(State(state): State<AppState>) -> Json<Vec<CommuneOption>> {
    Json(active_communes(&state.snapshot().graph))
}

pub async fn get_graph(
    State(state): State<AppState>,
    Query(params): Query<FocusParams>,
) -> ApiResult<Json<ViewModel>> {
    Ok(Json(focus_view(&state, &params)?))
}

pub async fn get_elements(
    State(state): State<AppState>,
    Query(params): Query<FocusParams>,
) -> ApiResult<Json<Vec<JsonValue>>> {
    Ok(Json(focus_view(&state, &params)?.elements()))
}

pub async fn get_legend() -> Json<Vec<LegendEntry>> {
    Json(legend())
}

pub async fn refresh(State(state): State<AppState>) -> ApiResult<Json<RefreshResponse>> {
    let snapshot = state.refresh().await?;
    Ok(Json(RefreshResponse {
        nodes: snapshot.graph.node_count(),
        edges: snapshot.graph.edge_count(),
        active_until: snapshot.graph.active_until(),
    }))
}
