//! Flat metric mapping produced by the InnoDB status parser.
//!
//! Metric names are lowercase, underscore-separated identifiers that stay
//! stable across server versions. Values are integers except for ratios.

use std::collections::BTreeMap;

use serde::Serialize;

/// A single metric value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MetricValue {
    Int(i64),
    Float(f64),
}

impl MetricValue {
    /// Returns the value as an integer, or `None` for ratios.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            MetricValue::Int(v) => Some(v),
            MetricValue::Float(_) => None,
        }
    }

    pub fn as_f64(self) -> f64 {
        match self {
            MetricValue::Int(v) => v as f64,
            MetricValue::Float(v) => v,
        }
    }
}

impl From<i64> for MetricValue {
    fn from(v: i64) -> Self {
        MetricValue::Int(v)
    }
}

impl From<f64> for MetricValue {
    fn from(v: f64) -> Self {
        MetricValue::Float(v)
    }
}

/// Mapping from metric name to value.
///
/// Gauges are written with [`set`](Self::set) (last write wins), counters
/// with [`add`](Self::add) (summed across lines). A metric that was never
/// written is absent; [`counter`](Self::counter) reads absent counters as zero.
///
/// Keys are kept sorted so that serializing the same mapping twice always
/// yields identical output.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct InnodbMetrics {
    values: BTreeMap<String, MetricValue>,
}

impl InnodbMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a gauge, replacing any previous value.
    pub fn set(&mut self, name: &str, value: impl Into<MetricValue>) {
        self.values.insert(name.to_string(), value.into());
    }

    /// Adds `delta` to a counter, starting from zero.
    pub fn add(&mut self, name: &str, delta: i64) {
        let entry = self
            .values
            .entry(name.to_string())
            .or_insert(MetricValue::Int(0));
        *entry = match *entry {
            MetricValue::Int(v) => MetricValue::Int(v.saturating_add(delta)),
            MetricValue::Float(v) => MetricValue::Float(v + delta as f64),
        };
    }

    pub fn get(&self, name: &str) -> Option<MetricValue> {
        self.values.get(name).copied()
    }

    /// Returns an integer metric, or `None` if absent or fractional.
    pub fn get_i64(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(MetricValue::as_i64)
    }

    /// Returns a counter, reading absent counters as zero.
    pub fn counter(&self, name: &str) -> i64 {
        self.get_i64(name).unwrap_or(0)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates metrics in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, MetricValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}
