use crate::TemporalGraph;
use munigraph_core::Result;
use std::collections::VecDeque;
use tracing::debug;

impl TemporalGraph {
    /// Membership mask of the nodes connected to `focus`, ignoring edge direction.
    fn component_mask(&self, focus: &str) -> Result<Vec<bool>> {
        let start = self.index_of(focus)?;
        let mut visited = vec![false; self.node_count()];
        let mut queue = VecDeque::new();

        visited[start] = true;
        queue.push_back(start);

        while let Some(current) = queue.pop_front() {
            for neighbor in self.undirected_neighbors(current) {
                if !visited[neighbor] {
                    visited[neighbor] = true;
                    queue.push_back(neighbor);
                }
            }
        }

        Ok(visited)
    }

    /// Induced subgraph over the connected component that contains `focus`.
    ///
    /// Edge direction and attributes are preserved, and nodes and edges keep the
    /// order they have in `self`.
    pub fn component(&self, focus: &str) -> Result<TemporalGraph> {
        let members = self.component_mask(focus)?;
        let mut subgraph = TemporalGraph::new(self.active_until());

        for (idx, &member) in members.iter().enumerate() {
            if member {
                subgraph.add_node(self.node_at(idx).clone())?;
            }
        }
        for idx in 0..self.edge_count() {
            let edge = self.edge_at(idx);
            if members[self.index_of(edge.source.as_str())?] {
                subgraph.add_edge(edge.clone())?;
            }
        }

        debug!(
            focus,
            nodes = subgraph.node_count(),
            edges = subgraph.edge_count(),
            "extracted component"
        );
        Ok(subgraph)
    }
}

/// Connected component of `graph` containing `focus`.
pub fn extract(graph: &TemporalGraph, focus: &str) -> Result<TemporalGraph> {
    graph.component(focus)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use munigraph_core::{ClassifiedEvent, CommuneInterval, EventKind, MuniGraphError};

    fn event(parent: (&str, i32, i32), child: (&str, i32, i32), kind: EventKind) -> ClassifiedEvent {
        ClassifiedEvent {
            parent: CommuneInterval::new(parent.0, parent.1, parent.2),
            child: CommuneInterval::new(child.0, child.1, child.2),
            date: NaiveDate::from_ymd_opt(child.1, 1, 1).unwrap(),
            kind,
        }
    }

    fn two_components() -> TemporalGraph {
        let events = vec![
            // component 1: A -> B <- C, B -> D
            event(("A", 1900, 1950), ("B", 1950, 1990), EventKind::MergedTo),
            event(("C", 1900, 1950), ("B", 1950, 1990), EventKind::MergedTo),
            event(("B", 1950, 1990), ("D", 1990, 2023), EventKind::Renamed),
            // component 2: X -> Y
            event(("X", 1900, 1960), ("Y", 1960, 2023), EventKind::SplitTo),
        ];
        TemporalGraph::build(&events, 2023).unwrap()
    }

    #[test]
    fn component_follows_edges_in_both_directions() {
        let graph = two_components();
        let sub = extract(&graph, "C (1900-1950)").unwrap();

        let names: Vec<_> = sub.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C", "D"]);
        assert_eq!(sub.edge_count(), 3);
        assert!(!sub.contains("X (1900-1960)"));
        assert!(!sub.contains("Y (1960-2023)"));
    }

    #[test]
    fn component_preserves_direction_and_attributes() {
        let graph = two_components();
        let sub = graph.component("D (1990-2023)").unwrap();
        let edge = sub.edge("B (1950-1990)", "D (1990-2023)").unwrap();
        assert_eq!(edge.kind, EventKind::Renamed);
        assert!(sub.edge("D (1990-2023)", "B (1950-1990)").is_none());
        assert_eq!(sub.active_until(), 2023);
    }

    #[test]
    fn isolated_component_is_returned_alone() {
        let graph = two_components();
        let sub = graph.component("Y (1960-2023)").unwrap();
        assert_eq!(sub.node_count(), 2);
        assert_eq!(sub.edge_count(), 1);
    }

    #[test]
    fn unknown_focus_is_not_found() {
        let graph = two_components();
        assert!(matches!(
            graph.component("Nowhere (1-2)"),
            Err(MuniGraphError::NodeNotFound(_))
        ));
    }

    #[test]
    fn extraction_is_deterministic() {
        let graph = two_components();
        let first = graph.component("A (1900-1950)").unwrap();
        let second = graph.component("A (1900-1950)").unwrap();
        assert!(first.nodes().eq(second.nodes()));
        assert!(first.edges().eq(second.edges()));
    }
}
