use crate::TemporalGraph;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Selector entry: a commune name pointing at one of its active intervals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommuneOption {
    pub label: String,
    pub value: String,
}

/// Currently active communes, sorted by identity, one entry per distinct name.
///
/// Only intervals that result from some event count. An interval that only ever
/// appears as a parent was abolished in that event, even when it ended this year.
pub fn active_communes(graph: &TemporalGraph) -> Vec<CommuneOption> {
    let mut active: Vec<_> = graph
        .nodes()
        .filter(|node| node.abolition == graph.active_until())
        .map(|node| (node.id(), node.name.clone()))
        .filter(|(id, _)| graph.in_degree(id.as_str()) > 0)
        .map(|(id, name)| (id.into_string(), name))
        .collect();
    active.sort();

    let mut shown = HashSet::new();
    active
        .into_iter()
        .filter(|(_, name)| shown.insert(name.clone()))
        .map(|(value, label)| CommuneOption { label, value })
        .collect()
}
