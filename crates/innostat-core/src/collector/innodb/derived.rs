//! Metrics computed from other parsed metrics.
//!
//! Every derived metric is either computed in full or left out. A missing
//! input is logged and never fails the parse.

use tracing::error;

use super::error::DerivedError;
use crate::models::InnodbMetrics;

/// `(derived bytes metric, page-count input)` pairs, each multiplied by `page_size`.
const BYTES_FROM_PAGES: &[(&str, &str)] = &[
    ("buffer_pool_bytes_data", "buffer_pool_pages_data"),
    ("buffer_pool_bytes_dirty", "buffer_pool_pages_dirty"),
    ("buffer_pool_bytes_free", "buffer_pool_pages_free"),
    ("buffer_pool_bytes_total", "buffer_pool_pages_total"),
];

pub(crate) fn compute_derived(metrics: &mut InnodbMetrics) {
    match checkpoint_age(metrics) {
        Ok(age) => metrics.set("checkpoint_age", age),
        Err(e) => error!("Not all InnoDB LSN metrics available, unable to compute: {}", e),
    }

    for &(target, source) in BYTES_FROM_PAGES {
        if metrics.contains(target) {
            continue;
        }
        match pages_to_bytes(metrics, target, source) {
            Ok(bytes) => metrics.set(target, bytes),
            Err(e) => error!(
                "Not all InnoDB buffer pool metrics are available, unable to compute {}: {}",
                target, e
            ),
        }
    }

    if !metrics.contains("buffer_pool_pages_utilization") {
        match pages_utilization(metrics) {
            Ok(ratio) => metrics.set("buffer_pool_pages_utilization", ratio),
            Err(e) => error!(
                "Not all InnoDB buffer pool metrics are available, unable to compute buffer_pool_pages_utilization: {}",
                e
            ),
        }
    }

    if !metrics.contains("buffer_pool_bytes_used") {
        match bytes_used(metrics) {
            Ok(bytes) => metrics.set("buffer_pool_bytes_used", bytes),
            Err(e) => error!(
                "Not all InnoDB buffer pool metrics are available, unable to compute buffer_pool_bytes_used: {}",
                e
            ),
        }
    }
}

fn require(metrics: &InnodbMetrics, name: &'static str) -> Result<i64, DerivedError> {
    metrics
        .get_i64(name)
        .ok_or(DerivedError::MissingInput(name))
}

fn checkpoint_age(metrics: &InnodbMetrics) -> Result<i64, DerivedError> {
    let current = require(metrics, "lsn_current")?;
    let checkpoint = require(metrics, "lsn_last_checkpoint")?;
    current
        .checked_sub(checkpoint)
        .ok_or(DerivedError::Overflow("checkpoint_age"))
}

fn pages_to_bytes(
    metrics: &InnodbMetrics,
    target: &'static str,
    source: &'static str,
) -> Result<i64, DerivedError> {
    let page_size = require(metrics, "page_size")?;
    let pages = require(metrics, source)?;
    pages
        .checked_mul(page_size)
        .ok_or(DerivedError::Overflow(target))
}

fn pages_used(metrics: &InnodbMetrics) -> Result<i64, DerivedError> {
    let total = require(metrics, "buffer_pool_pages_total")?;
    let free = require(metrics, "buffer_pool_pages_free")?;
    total
        .checked_sub(free)
        .ok_or(DerivedError::Overflow("buffer_pool_pages_used"))
}

/// Requires `page_size` like the byte figures.
fn pages_utilization(metrics: &InnodbMetrics) -> Result<f64, DerivedError> {
    require(metrics, "page_size")?;
    let used = pages_used(metrics)?;
    let total = require(metrics, "buffer_pool_pages_total")?;
    if total == 0 {
        return Err(DerivedError::ZeroPagesTotal);
    }
    Ok(used as f64 / total as f64)
}

fn bytes_used(metrics: &InnodbMetrics) -> Result<i64, DerivedError> {
    let page_size = require(metrics, "page_size")?;
    pages_used(metrics)?
        .checked_mul(page_size)
        .ok_or(DerivedError::Overflow("buffer_pool_bytes_used"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_metrics(page_size: Option<i64>) -> InnodbMetrics {
        let mut m = InnodbMetrics::new();
        m.set("buffer_pool_pages_total", 1000);
        m.set("buffer_pool_pages_free", 250);
        m.set("buffer_pool_pages_data", 700);
        m.set("buffer_pool_pages_dirty", 50);
        if let Some(size) = page_size {
            m.set("page_size", size);
        }
        m
    }

    #[test]
    fn test_checkpoint_age() {
        let mut m = InnodbMetrics::new();
        m.set("lsn_current", 272588624);
        m.set("lsn_last_checkpoint", 272500000);
        compute_derived(&mut m);
        assert_eq!(m.get_i64("checkpoint_age"), Some(88624));
    }

    #[test]
    fn test_checkpoint_age_missing_input() {
        let mut m = InnodbMetrics::new();
        m.set("lsn_current", 272588624);
        compute_derived(&mut m);
        assert!(!m.contains("checkpoint_age"));
        assert_eq!(
            checkpoint_age(&m),
            Err(DerivedError::MissingInput("lsn_last_checkpoint"))
        );
    }

    #[test]
    fn test_buffer_pool_bytes() {
        let mut m = pool_metrics(Some(16384));
        compute_derived(&mut m);
        assert_eq!(m.get_i64("buffer_pool_bytes_total"), Some(1000 * 16384));
        assert_eq!(m.get_i64("buffer_pool_bytes_free"), Some(250 * 16384));
        assert_eq!(m.get_i64("buffer_pool_bytes_data"), Some(700 * 16384));
        assert_eq!(m.get_i64("buffer_pool_bytes_dirty"), Some(50 * 16384));
        assert_eq!(m.get_i64("buffer_pool_bytes_used"), Some(750 * 16384));
        assert_eq!(
            m.get("buffer_pool_pages_utilization").map(|v| v.as_f64()),
            Some(0.75)
        );
    }

    #[test]
    fn test_native_bytes_are_kept() {
        let mut m = pool_metrics(Some(16384));
        m.set("buffer_pool_bytes_total", 42);
        compute_derived(&mut m);
        assert_eq!(m.get_i64("buffer_pool_bytes_total"), Some(42));
    }

    #[test]
    fn test_without_page_size_nothing_derived() {
        let mut m = pool_metrics(None);
        compute_derived(&mut m);
        assert!(!m.contains("buffer_pool_bytes_total"));
        assert!(!m.contains("buffer_pool_bytes_used"));
        assert!(!m.contains("buffer_pool_pages_utilization"));
        assert_eq!(m.len(), 4);
    }

    #[test]
    fn test_zero_pages_total() {
        let mut m = InnodbMetrics::new();
        m.set("buffer_pool_pages_total", 0);
        m.set("buffer_pool_pages_free", 0);
        m.set("page_size", 16384);
        compute_derived(&mut m);
        assert!(!m.contains("buffer_pool_pages_utilization"));
        assert_eq!(m.get_i64("buffer_pool_bytes_used"), Some(0));
        assert_eq!(pages_utilization(&m), Err(DerivedError::ZeroPagesTotal));
    }

    #[test]
    fn test_empty_mapping_stays_empty() {
        let mut m = InnodbMetrics::new();
        compute_derived(&mut m);
        assert!(m.is_empty());
    }

    #[test]
    fn test_checkpoint_age_overflow() {
        let mut m = InnodbMetrics::new();
        m.set("lsn_current", i64::MAX);
        m.set("lsn_last_checkpoint", -5);
        compute_derived(&mut m);
        assert!(!m.contains("checkpoint_age"));
        assert_eq!(
            checkpoint_age(&m),
            Err(DerivedError::Overflow("checkpoint_age"))
        );
    }

    #[test]
    fn test_pages_used_overflow() {
        let mut m = InnodbMetrics::new();
        m.set("buffer_pool_pages_total", i64::MAX);
        m.set("buffer_pool_pages_free", -5);
        m.set("page_size", 1);
        compute_derived(&mut m);
        assert!(!m.contains("buffer_pool_pages_utilization"));
        assert!(!m.contains("buffer_pool_bytes_used"));
        assert_eq!(m.get_i64("buffer_pool_bytes_total"), Some(i64::MAX));
    }
}
