use arc_swap::ArcSwap;
use chrono::{DateTime, Utc};
use munigraph_core::{BuildContext, EventSource, GraphConfig, Result};
use munigraph_graph::{fetch_and_build, TemporalGraph};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Graph published to readers together with when it was built.
#[derive(Debug)]
pub struct GraphSnapshot {
    pub graph: TemporalGraph,
    pub built_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct AppState {
    snapshot: Arc<ArcSwap<GraphSnapshot>>,
    source: Arc<dyn EventSource>,
    graph_config: GraphConfig,
    rebuild_lock: Arc<Mutex<()>>,
}

impl AppState {
    /// Builds the first graph from `source`; fails if that build fails.
    pub async fn new(source: Arc<dyn EventSource>, graph_config: GraphConfig) -> Result<Self> {
        let ctx = BuildContext::from_config(&graph_config);
        let graph = fetch_and_build(source.as_ref(), &ctx).await?;
        Ok(Self::with_graph(graph, source, graph_config))
    }

    pub fn with_graph(
        graph: TemporalGraph,
        source: Arc<dyn EventSource>,
        graph_config: GraphConfig,
    ) -> Self {
        let snapshot = GraphSnapshot {
            graph,
            built_at: Utc::now(),
        };
        Self {
            snapshot: Arc::new(ArcSwap::from_pointee(snapshot)),
            source,
            graph_config,
            rebuild_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Current snapshot; stays valid even if a refresh swaps in a new one.
    pub fn snapshot(&self) -> Arc<GraphSnapshot> {
        self.snapshot.load_full()
    }

    pub fn source_name(&self) -> &str {
        self.source.name()
    }

    /// Rebuilds from the source and publishes the result.
    ///
    /// Concurrent refreshes are serialized. On failure the previous graph stays published.
    pub async fn refresh(&self) -> Result<Arc<GraphSnapshot>> {
        let _guard = self.rebuild_lock.lock().await;
        let ctx = BuildContext::from_config(&self.graph_config);

        match fetch_and_build(self.source.as_ref(), &ctx).await {
            Ok(graph) => {
                let snapshot = Arc::new(GraphSnapshot {
                    graph,
                    built_at: Utc::now(),
                });
                self.snapshot.store(snapshot.clone());
                info!(
                    nodes = snapshot.graph.node_count(),
                    edges = snapshot.graph.edge_count(),
                    "published rebuilt graph"
                );
                Ok(snapshot)
            }
            Err(e) => {
                warn!(error = %e, "graph refresh failed; keeping previous graph");
                Err(e)
            }
        }
    }
}
