//! Classification metrics collection and reporting

use calma_core::{ResultSource, TaskKind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::info;

/// Counter of classifications by task and source
pub const CLASSIFICATIONS_TOTAL: &str = "calma_classifications_total";

/// Counter of fallbacks by task and reason
pub const FALLBACKS_TOTAL: &str = "calma_fallbacks_total";

/// Histogram of end-to-end classification latency
pub const CLASSIFICATION_LATENCY_US: &str = "calma_classification_latency_us";

/// Register descriptions for the metrics emitted by the pipeline.
///
/// Call once at startup, after a recorder has been installed.
pub fn describe_metrics() {
    ::metrics::describe_counter!(
        CLASSIFICATIONS_TOTAL,
        "Total number of classifications by task and source"
    );
    ::metrics::describe_counter!(
        FALLBACKS_TOTAL,
        "Total number of local fallbacks by task and reason"
    );
    ::metrics::describe_histogram!(
        CLASSIFICATION_LATENCY_US,
        ::metrics::Unit::Microseconds,
        "Classification latency in microseconds by task"
    );

    info!("Classification metrics described");
}

/// Metrics collector for classification outcomes.
///
/// Cheap to clone; clones share the same counters.
#[derive(Clone, Default)]
pub struct ClassificationMetrics {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    sentiment: TaskCounters,
    moderation: TaskCounters,
    suggestion: TaskCounters,
}

#[derive(Default)]
struct TaskCounters {
    remote: AtomicU64,
    fallback: AtomicU64,
    latency_us: AtomicU64,
}

impl ClassificationMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    fn counters(&self, task: TaskKind) -> &TaskCounters {
        match task {
            TaskKind::Sentiment => &self.inner.sentiment,
            TaskKind::Moderation => &self.inner.moderation,
            TaskKind::Suggestion => &self.inner.suggestion,
        }
    }

    /// Record a completed classification.
    ///
    /// `fallback_reason` names why the local fallback decided, if it did.
    pub fn record(
        &self,
        task: TaskKind,
        source: ResultSource,
        latency_us: u64,
        fallback_reason: Option<&'static str>,
    ) {
        let counters = self.counters(task);
        match source {
            ResultSource::Remote => counters.remote.fetch_add(1, Ordering::Relaxed),
            ResultSource::Fallback => counters.fallback.fetch_add(1, Ordering::Relaxed),
        };
        counters.latency_us.fetch_add(latency_us, Ordering::Relaxed);

        ::metrics::counter!(
            CLASSIFICATIONS_TOTAL,
            "task" => task.as_str(),
            "source" => source.as_str()
        )
        .increment(1);
        ::metrics::histogram!(CLASSIFICATION_LATENCY_US, "task" => task.as_str())
            .record(latency_us as f64);

        if let Some(reason) = fallback_reason {
            ::metrics::counter!(FALLBACKS_TOTAL, "task" => task.as_str(), "reason" => reason)
                .increment(1);
        }
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let task = |counters: &TaskCounters| TaskSnapshot {
            remote: counters.remote.load(Ordering::Relaxed),
            fallback: counters.fallback.load(Ordering::Relaxed),
            total_latency_us: counters.latency_us.load(Ordering::Relaxed),
        };

        MetricsSnapshot {
            sentiment: task(&self.inner.sentiment),
            moderation: task(&self.inner.moderation),
            suggestion: task(&self.inner.suggestion),
        }
    }
}

/// Counters for a single task kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskSnapshot {
    pub remote: u64,
    pub fallback: u64,
    pub total_latency_us: u64,
}

impl TaskSnapshot {
    /// Total classifications of this kind
    pub fn total(&self) -> u64 {
        self.remote + self.fallback
    }

    /// Share of classifications decided locally
    pub fn fallback_rate(&self) -> f64 {
        if self.total() == 0 {
            0.0
        } else {
            self.fallback as f64 / self.total() as f64
        }
    }

    /// Average latency per classification
    pub fn avg_latency_us(&self) -> u64 {
        if self.total() == 0 {
            0
        } else {
            self.total_latency_us / self.total()
        }
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub sentiment: TaskSnapshot,
    pub moderation: TaskSnapshot,
    pub suggestion: TaskSnapshot,
}

impl MetricsSnapshot {
    /// Counters for one task kind
    pub fn task(&self, task: TaskKind) -> TaskSnapshot {
        match task {
            TaskKind::Sentiment => self.sentiment,
            TaskKind::Moderation => self.moderation,
            TaskKind::Suggestion => self.suggestion,
        }
    }

    /// Classifications across all tasks
    pub fn total(&self) -> u64 {
        TaskKind::ALL.iter().map(|t| self.task(*t).total()).sum()
    }

    /// Fallback share across all tasks
    pub fn fallback_rate(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            let fallback: u64 = TaskKind::ALL.iter().map(|t| self.task(*t).fallback).sum();
            fallback as f64 / total as f64
        }
    }
}
