use crate::{classify_record, reconcile, TemporalGraph};
use munigraph_core::{BuildContext, EventKind, EventRecord, EventSource, MuniGraphError, Result};
use std::time::Instant;
use tracing::info;

/// Classifies, reconciles and assembles a graph in one batch.
///
/// Any unknown label pair or malformed interval aborts the whole build.
pub fn build_graph(records: &[EventRecord], ctx: &BuildContext) -> Result<TemporalGraph> {
    if records.is_empty() {
        return Err(MuniGraphError::EmptySource);
    }
    let started = Instant::now();

    let classified = records
        .iter()
        .map(|record| classify_record(record, ctx))
        .collect::<Result<Vec<_>>>()?;
    let reassignments = classified
        .iter()
        .filter(|e| e.kind == EventKind::DistrictReassignment)
        .count();

    let events = reconcile(classified)?;
    let graph = TemporalGraph::build(&events, ctx.active_until)?;

    info!(
        records = records.len(),
        reassignments,
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        active_until = ctx.active_until,
        elapsed_ms = started.elapsed().as_millis() as u64,
        "graph build complete"
    );
    Ok(graph)
}

/// Pulls every record from `source` and builds a graph from them.
pub async fn fetch_and_build(source: &dyn EventSource, ctx: &BuildContext) -> Result<TemporalGraph> {
    info!(source = source.name(), "fetching municipal events");
    let records = source.fetch_events().await?;
    build_graph(&records, ctx)
}
