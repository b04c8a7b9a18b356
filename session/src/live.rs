use builder::{build_graph_from_str, BuildError};
use jsongraph_core::config::{AppConfig, BuildOptions};
use jsongraph_core::hash::ContentHash;
use jsongraph_core::metrics::{BuildMetrics, MetricsSnapshot};
use jsongraph_core::model::Graph;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{debug, info, warn};

const SOURCE_HASH_KEY: &str = "source_sha256";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("live graph session closed")]
    Closed,
}

/// Owns the editor's current document and the last graph that built
/// successfully. A failed rebuild leaves the published graph untouched.
pub struct LiveGraph {
    options: BuildOptions,
    text: Option<String>,
    built_source_hash: Option<String>,
    last_error: Option<String>,
    publisher: watch::Sender<Arc<Graph>>,
    metrics: BuildMetrics,
}

impl LiveGraph {
    pub fn new(options: BuildOptions) -> Self {
        Self::with_metrics(options, BuildMetrics::default())
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::with_metrics(
            config.build.clone(),
            BuildMetrics::new(config.metrics.max_history),
        )
    }

    pub fn with_metrics(options: BuildOptions, metrics: BuildMetrics) -> Self {
        let (publisher, _) = watch::channel(Arc::new(Graph::empty()));
        Self {
            options,
            text: None,
            built_source_hash: None,
            last_error: None,
            publisher,
            metrics,
        }
    }

    pub fn options(&self) -> &BuildOptions {
        &self.options
    }

    pub fn current(&self) -> Arc<Graph> {
        self.publisher.borrow().clone()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Read-only handle for a renderer.
    pub fn subscribe(&self) -> GraphView {
        GraphView {
            receiver: self.publisher.subscribe(),
        }
    }

    /// Replaces the document text and rebuilds. Text identical to the last
    /// successful build is not rebuilt.
    pub fn apply_text(&mut self, text: String) -> Result<Arc<Graph>, BuildError> {
        let hash = text.as_str().content_hash();
        self.text = Some(text);

        if self.built_source_hash.as_deref() == Some(hash.as_str()) {
            debug!("document unchanged since last build, skipping");
            self.metrics.record_skip();
            self.last_error = None;
            return Ok(self.current());
        }

        self.rebuild()
    }

    /// Swaps build options and rebuilds the current text. Invalid options are
    /// rejected and the previous options stay in effect.
    pub fn reconfigure(&mut self, options: BuildOptions) -> Result<Arc<Graph>, BuildError> {
        options.validate()?;
        self.options = options;
        self.built_source_hash = None;
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<Arc<Graph>, BuildError> {
        let Some(text) = self.text.as_deref() else {
            return Ok(self.current());
        };

        let started = Instant::now();
        match build_graph_from_str(text, &self.options) {
            Ok(graph) => {
                let latency_us = started.elapsed().as_micros() as u64;
                self.metrics
                    .record_success(latency_us, graph.node_count(), graph.edge_count());
                self.built_source_hash = graph.metadata().get(SOURCE_HASH_KEY).cloned();
                self.last_error = None;

                info!(
                    nodes = graph.node_count(),
                    edges = graph.edge_count(),
                    latency_us,
                    "graph rebuilt"
                );
                let graph = Arc::new(graph);
                self.publisher.send_replace(graph.clone());
                Ok(graph)
            }
            Err(err) => {
                self.metrics.record_failure();
                warn!("Rebuild failed, keeping last graph: {}", err);
                self.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }
}

/// Receives every successfully built graph. Holds no way to alter it.
#[derive(Clone)]
pub struct GraphView {
    receiver: watch::Receiver<Arc<Graph>>,
}

impl GraphView {
    pub fn current(&self) -> Arc<Graph> {
        self.receiver.borrow().clone()
    }

    /// Waits for the next published graph.
    pub async fn changed(&mut self) -> Result<Arc<Graph>, SessionError> {
        self.receiver
            .changed()
            .await
            .map_err(|_| SessionError::Closed)?;
        Ok(self.receiver.borrow_and_update().clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_rebuild_keeps_last_graph() {
        let mut live = LiveGraph::new(BuildOptions::default());
        let good = live
            .apply_text(r#"{"user": {"id": "U1", "age": 30}}"#.to_string())
            .unwrap();

        assert!(live.apply_text(r#"{"user": "#.to_string()).is_err());
        assert!(live.last_error().is_some());
        assert_eq!(live.current(), good);

        let snapshot = live.metrics();
        assert_eq!(snapshot.total_builds, 2);
        assert_eq!(snapshot.failed_builds, 1);
    }

    #[test]
    fn test_unchanged_text_is_skipped() {
        let mut live = LiveGraph::new(BuildOptions::default());
        let text = r#"{"user": {"id": "U1"}}"#.to_string();
        let first = live.apply_text(text.clone()).unwrap();
        let second = live.apply_text(text).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(live.metrics().skipped_builds, 1);
    }

    #[test]
    fn test_invalid_reconfigure_keeps_options() {
        let mut live = LiveGraph::new(BuildOptions::default());
        let bad = BuildOptions::new(false, vec![" ".to_string()]);
        assert!(live.reconfigure(bad).is_err());
        assert_eq!(live.options(), &BuildOptions::default());
    }
}
