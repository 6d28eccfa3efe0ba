//! `SHOW ENGINE INNODB STATUS` parser.
//!
//! Turns the free-text InnoDB monitor report into a flat [`InnodbMetrics`]
//! mapping. The report has no stable grammar; each line is matched against
//! an ordered rule list and unrecognized lines are skipped.
//!
//! ```text
//! report ──lines──▶ tokenize ──▶ classify (first match) ──▶ InnodbMetrics
//!                                     ▲                          │
//!                              ParseContext                derived metrics
//! ```
//!
//! # Usage
//!
//! ```
//! use innostat_core::collector::innodb::parse_innodb_status;
//!
//! let metrics = parse_innodb_status("Mutex spin waits 10, rounds 20, OS waits 3\n");
//! assert_eq!(metrics.get_i64("mutex_spin_waits"), Some(10));
//! ```

mod aio;
mod context;
mod derived;
mod error;
mod rules;
mod tokenizer;

use tracing::{debug, warn};

use crate::models::InnodbMetrics;

pub use aio::AioShape;
pub use context::{GLOBAL_BUFFER_POOL, ParseContext};
pub use error::{DerivedError, LineError};
pub use tokenizer::{Line, tokenize};

/// Caller-supplied values the report itself does not print.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    /// `innodb_page_size` in bytes. Required for buffer-pool byte figures.
    pub page_size: Option<i64>,
}

impl ParseOptions {
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Parses a status report with default options.
pub fn parse_innodb_status(text: &str) -> InnodbMetrics {
    parse_innodb_status_with(text, &ParseOptions::default())
}

/// Parses a status report.
///
/// Never fails: malformed lines are logged and skipped, and derived metrics
/// whose inputs are missing are left out.
pub fn parse_innodb_status_with(text: &str, options: &ParseOptions) -> InnodbMetrics {
    let mut ctx = ParseContext::new();
    let mut metrics = InnodbMetrics::new();
    let mut matched = 0usize;
    let mut malformed = 0usize;

    for raw in text.lines() {
        let line = Line::new(raw.trim());

        if let Some(rule) = rules::classify(&line, &ctx) {
            matched += 1;
            if let Err(e) = rule.apply(&line, &mut ctx, &mut metrics) {
                malformed += 1;
                warn!("Can't parse result line {} ({}): {}", line.text, rule.name, e);
            }
        }

        ctx.remember_line(line.text);
    }

    if let Some(page_size) = options.page_size {
        metrics.set("page_size", page_size);
    }

    derived::compute_derived(&mut metrics);

    debug!(
        "InnoDB status: {} lines matched, {} malformed, {} metrics",
        matched,
        malformed,
        metrics.len()
    );

    metrics
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_report() {
        let metrics = parse_innodb_status("");
        assert!(metrics.is_empty());
    }

    #[test]
    fn test_unmatched_lines_leave_mapping_empty() {
        let text = "\
=====================================
2024-01-01 00:00:00 0x7f INNODB MONITOR OUTPUT
=====================================
Per second averages calculated from the last 5 seconds
END OF INNODB MONITOR OUTPUT
";
        assert!(parse_innodb_status(text).is_empty());
    }

    #[test]
    fn test_lines_are_trimmed() {
        let text = "   Log sequence number 100\n\tLast checkpoint at  40  \n";
        let metrics = parse_innodb_status(text);
        assert_eq!(metrics.get_i64("lsn_current"), Some(100));
        assert_eq!(metrics.get_i64("lsn_last_checkpoint"), Some(40));
        assert_eq!(metrics.get_i64("checkpoint_age"), Some(60));
    }

    #[test]
    fn test_malformed_line_does_not_abort() {
        let text = "\
Mutex spin waits oops, rounds 1, OS waits 2
History list length 7
";
        let metrics = parse_innodb_status(text);
        assert!(!metrics.contains("mutex_spin_waits"));
        assert_eq!(metrics.get_i64("history_list_length"), Some(7));
    }

    #[test]
    fn test_page_size_option() {
        let text = "\
Buffer pool size   100
Free buffers       25
";
        let metrics = parse_innodb_status_with(text, &ParseOptions::default().with_page_size(16384));
        assert_eq!(metrics.get_i64("page_size"), Some(16384));
        assert_eq!(metrics.get_i64("buffer_pool_bytes_used"), Some(75 * 16384));

        let metrics = parse_innodb_status(text);
        assert!(!metrics.contains("page_size"));
        assert!(!metrics.contains("buffer_pool_bytes_used"));
    }

    #[test]
    fn test_previous_line_spans_trimmed_text() {
        let text = "\
merged operations:
 insert 5, delete mark 6, delete 7
";
        let metrics = parse_innodb_status(text);
        assert_eq!(metrics.get_i64("ibuf_merged"), Some(18));
    }

    #[test]
    fn test_out_of_range_values_are_dropped() {
        let text = "\
merged operations:
 insert 9223372036854775807, delete mark 1, delete 0
Pending normal aio reads: [9223372036854775807, 1, 0, 0] , aio writes: [0, 0, 0, 0] ,
Log sequence number 9223372036854775807
Last checkpoint at -5
Buffer pool size 9223372036854775807
Free buffers -5
";
        let metrics = parse_innodb_status_with(text, &ParseOptions::default().with_page_size(1));
        assert!(!metrics.contains("ibuf_merged"));
        assert!(!metrics.contains("pending_normal_aio_reads"));
        assert!(!metrics.contains("checkpoint_age"));
        assert!(!metrics.contains("buffer_pool_pages_utilization"));
        assert_eq!(metrics.get_i64("lsn_current"), Some(i64::MAX));
    }
}
