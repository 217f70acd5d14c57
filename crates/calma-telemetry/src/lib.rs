//! Calma Telemetry
//!
//! Observability for the classification pipeline.
//!
//! Provides:
//! - In-process counters of remote and fallback decisions per task
//! - Descriptions for the `metrics` facade counters and histograms

pub mod metrics;

pub use crate::metrics::{describe_metrics, ClassificationMetrics, MetricsSnapshot, TaskSnapshot};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{ClassificationMetrics, MetricsSnapshot};
}
