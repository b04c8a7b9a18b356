use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Default)]
struct BuildCounters {
    total_builds: u64,
    failed_builds: u64,
    skipped_builds: u64,
    last_node_count: usize,
    last_edge_count: usize,
    latencies: VecDeque<u64>, // microseconds
}

/// Thread-safe collector shared between a live session and whoever reports on it.
#[derive(Clone)]
pub struct BuildMetrics {
    state: Arc<Mutex<MetricsState>>,
}

struct MetricsState {
    counters: BuildCounters,
    max_history: usize,
}

impl BuildMetrics {
    pub fn new(max_history: usize) -> Self {
        Self {
            state: Arc::new(Mutex::new(MetricsState {
                counters: BuildCounters::default(),
                max_history: max_history.max(1),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MetricsState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn record_success(&self, latency_us: u64, node_count: usize, edge_count: usize) {
        let mut state = self.lock();
        let max_history = state.max_history;
        let counters = &mut state.counters;
        counters.total_builds += 1;
        counters.last_node_count = node_count;
        counters.last_edge_count = edge_count;
        counters.latencies.push_back(latency_us);
        if counters.latencies.len() > max_history {
            counters.latencies.pop_front();
        }
    }

    pub fn record_failure(&self) {
        let mut state = self.lock();
        state.counters.total_builds += 1;
        state.counters.failed_builds += 1;
    }

    pub fn record_skip(&self) {
        self.lock().counters.skipped_builds += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let state = self.lock();
        let c = &state.counters;

        let mut sorted_latencies: Vec<u64> = c.latencies.iter().copied().collect();
        sorted_latencies.sort_unstable();

        let failure_rate = if c.total_builds > 0 {
            c.failed_builds as f32 / c.total_builds as f32
        } else {
            0.0
        };

        MetricsSnapshot {
            total_builds: c.total_builds,
            failed_builds: c.failed_builds,
            skipped_builds: c.skipped_builds,
            failure_rate,
            p50: percentile(&sorted_latencies, 50.0),
            p95: percentile(&sorted_latencies, 95.0),
            p99: percentile(&sorted_latencies, 99.0),
            history_count: c.latencies.len(),
            last_node_count: c.last_node_count,
            last_edge_count: c.last_edge_count,
        }
    }
}

impl Default for BuildMetrics {
    fn default() -> Self {
        Self::new(256)
    }
}

fn percentile(sorted: &[u64], p: f32) -> u64 {
    if sorted.is_empty() {
        return 0;
    }
    let idx = ((p / 100.0) * (sorted.len() as f32)).ceil() as usize;
    sorted[idx.saturating_sub(1).min(sorted.len() - 1)]
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct MetricsSnapshot {
    pub total_builds: u64,
    pub failed_builds: u64,
    pub skipped_builds: u64,
    pub failure_rate: f32,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub history_count: usize,
    pub last_node_count: usize,
    pub last_edge_count: usize,
}
