//! Flat node/edge records for a rendering layer.

use crate::TemporalGraph;
use munigraph_core::EventKind;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeView {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeView {
    pub source: String,
    pub target: String,
    /// Year of the event
    pub date: i32,
    pub event: String,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ViewModel {
    pub nodes: Vec<NodeView>,
    pub edges: Vec<EdgeView>,
}

impl ViewModel {
    pub fn from_graph(graph: &TemporalGraph) -> Self {
        let nodes = graph
            .nodes()
            .map(|node| NodeView {
                id: node.id().into_string(),
                label: node.label().to_string(),
            })
            .collect();

        let edges = graph
            .edges()
            .map(|edge| EdgeView {
                source: edge.source.to_string(),
                target: edge.target.to_string(),
                date: edge.date,
                event: edge.kind.label().to_string(),
                color: edge.color.clone(),
            })
            .collect();

        Self { nodes, edges }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Renderer element list: every node, then every edge, each wrapped as `{"data": {...}}`.
    pub fn elements(&self) -> Vec<JsonValue> {
        let nodes = self.nodes.iter().map(|n| json!({ "data": n }));
        let edges = self.edges.iter().map(|e| json!({ "data": e }));
        nodes.chain(edges).collect()
    }
}

impl From<&TemporalGraph> for ViewModel {
    fn from(graph: &TemporalGraph) -> Self {
        Self::from_graph(graph)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegendEntry {
    pub event: String,
    pub color: String,
}

/// Color legend for the rendered event kinds.
pub fn legend() -> Vec<LegendEntry> {
    EventKind::RENDERED
        .iter()
        .filter_map(|kind| {
            kind.color().map(|color| LegendEntry {
                event: kind.label().to_string(),
                color: color.to_string(),
            })
        })
        .collect()
}
