use munigraph_core::{
    ChangeEvent, ClassifiedEvent, CommuneInterval, IntervalId, MuniGraphError, Result,
};
use rustc_hash::FxHashMap;
use tracing::{debug, info};

/// Directed graph of commune intervals connected by change events.
///
/// Nodes and edges keep their insertion order, and lookups by identity are O(1).
/// Once built the graph is only read; share it behind an `Arc`.
#[derive(Debug, Clone)]
pub struct TemporalGraph {
    nodes: Vec<CommuneInterval>,
    node_index: FxHashMap<IntervalId, usize>,
    edges: Vec<ChangeEvent>,
    edge_index: FxHashMap<(usize, usize), usize>,
    /// Outgoing edge indices per node
    outgoing: Vec<Vec<usize>>,
    /// Incoming edge indices per node
    incoming: Vec<Vec<usize>>,
    active_until: i32,
}

impl TemporalGraph {
    pub fn new(active_until: i32) -> Self {
        Self {
            nodes: Vec::new(),
            node_index: FxHashMap::default(),
            edges: Vec::new(),
            edge_index: FxHashMap::default(),
            outgoing: Vec::new(),
            incoming: Vec::new(),
            active_until,
        }
    }

    /// Builds the graph from reconciled events.
    ///
    /// District reassignments are skipped; they never become edges.
    pub fn build(events: &[ClassifiedEvent], active_until: i32) -> Result<Self> {
        let mut graph = Self::new(active_until);
        for event in events {
            graph.add_node(event.parent.clone())?;
            graph.add_node(event.child.clone())?;
            match ChangeEvent::from_classified(event) {
                Some(edge) => {
                    graph.add_edge(edge)?;
                }
                None => debug!(
                    parent = %event.parent.id(),
                    child = %event.child.id(),
                    "skipping edge for hidden event kind"
                ),
            }
        }
        info!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "built temporal graph"
        );
        Ok(graph)
    }

    /// Inserts a node. Re-inserting an identical node is a no-op.
    pub fn add_node(&mut self, node: CommuneInterval) -> Result<IntervalId> {
        let id = node.id();
        if let Some(&idx) = self.node_index.get(&id) {
            if self.nodes[idx] != node {
                return Err(MuniGraphError::ConflictingNode(id.into_string()));
            }
            return Ok(id);
        }
        let idx = self.nodes.len();
        self.nodes.push(node);
        self.outgoing.push(Vec::new());
        self.incoming.push(Vec::new());
        self.node_index.insert(id.clone(), idx);
        Ok(id)
    }

    /// Adds an edge between two existing nodes.
    ///
    /// A second edge between the same ordered pair replaces the attributes of the
    /// first and keeps its position; the replaced edge is returned.
    pub fn add_edge(&mut self, edge: ChangeEvent) -> Result<Option<ChangeEvent>> {
        let from = self.index_of(edge.source.as_str())?;
        let to = self.index_of(edge.target.as_str())?;

        if let Some(&existing) = self.edge_index.get(&(from, to)) {
            debug!(
                source = %edge.source,
                target = %edge.target,
                "replacing attributes of existing edge"
            );
            let previous = std::mem::replace(&mut self.edges[existing], edge);
            return Ok(Some(previous));
        }

        let idx = self.edges.len();
        self.edges.push(edge);
        self.edge_index.insert((from, to), idx);
        self.outgoing[from].push(idx);
        self.incoming[to].push(idx);
        Ok(None)
    }

    pub fn node(&self, id: &str) -> Option<&CommuneInterval> {
        self.node_index.get(id).map(|&idx| &self.nodes[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &CommuneInterval> + '_ {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &ChangeEvent> + '_ {
        self.edges.iter()
    }

    pub fn edge(&self, source: &str, target: &str) -> Option<&ChangeEvent> {
        let from = *self.node_index.get(source)?;
        let to = *self.node_index.get(target)?;
        self.edge_index.get(&(from, to)).map(|&idx| &self.edges[idx])
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Abolition year used for intervals that are still active.
    pub fn active_until(&self) -> i32 {
        self.active_until
    }

    /// Direct successors (children) of a node.
    pub fn successors(&self, id: &str) -> Result<Vec<&CommuneInterval>> {
        let idx = self.index_of(id)?;
        Ok(self.outgoing[idx]
            .iter()
            .map(|&e| &self.nodes[self.node_index[&self.edges[e].target]])
            .collect())
    }

    /// Direct predecessors (parents) of a node.
    pub fn predecessors(&self, id: &str) -> Result<Vec<&CommuneInterval>> {
        let idx = self.index_of(id)?;
        Ok(self.incoming[idx]
            .iter()
            .map(|&e| &self.nodes[self.node_index[&self.edges[e].source]])
            .collect())
    }

    /// Number of edges ending at `id`; 0 for unknown ids.
    pub fn in_degree(&self, id: &str) -> usize {
        self.node_index
            .get(id)
            .map_or(0, |&idx| self.incoming[idx].len())
    }

    pub(crate) fn index_of(&self, id: &str) -> Result<usize> {
        self.node_index
            .get(id)
            .copied()
            .ok_or_else(|| MuniGraphError::NodeNotFound(id.to_string()))
    }

    pub(crate) fn node_at(&self, idx: usize) -> &CommuneInterval {
        &self.nodes[idx]
    }

    pub(crate) fn edge_at(&self, idx: usize) -> &ChangeEvent {
        &self.edges[idx]
    }

    /// Node indices adjacent to `idx` in either direction.
    pub(crate) fn undirected_neighbors(&self, idx: usize) -> impl Iterator<Item = usize> + '_ {
        let out = self.outgoing[idx]
            .iter()
            .map(move |&e| self.node_index[&self.edges[e].target]);
        let inc = self.incoming[idx]
            .iter()
            .map(move |&e| self.node_index[&self.edges[e].source]);
        out.chain(inc)
    }
}
