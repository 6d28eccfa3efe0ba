//! Shared data models.

mod metrics;

pub use metrics::{InnodbMetrics, MetricValue};
