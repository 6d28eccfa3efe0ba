//! InnoDB metrics collector.
//!
//! Runs checks against a [`StatusSource`] and turns the results into
//! publishable metrics. The InnoDB check parses the free-text monitor report.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                    Check                      │
//! │  ┌────────────────────┐  ┌─────────────────┐  │
//! │  │  check_innodb      │  │  check_mysql    │  │
//! │  │  - engine probe    │  │  - table stats  │  │
//! │  │  - status parser   │  └────────┬────────┘  │
//! │  └─────────┬──────────┘           │           │
//! │            └───────────┬──────────┘           │
//! │                 ┌──────▼───────┐              │
//! │                 │ StatusSource │ (trait)      │
//! │                 └──────┬───────┘              │
//! └────────────────────────┼──────────────────────┘
//!                ┌─────────┴──────────┐
//!         ┌──────▼──────┐      ┌──────▼──────┐
//!         │ DumpSource  │      │ MockSource  │
//!         │ (captured)  │      │ (testing)   │
//!         └─────────────┘      └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```
//! use innostat_core::collector::{Check, DumpSource};
//! use innostat_core::collector::innodb::ParseOptions;
//!
//! let mut source = DumpSource::from_text("History list length 12\n");
//! let output = Check::Innodb.run(&mut source, &ParseOptions::default()).unwrap();
//! let json = serde_json::to_value(&output).unwrap();
//! assert_eq!(json["innodb"][0]["history_list_length"], 12);
//! ```

mod check;
pub mod innodb;
pub mod mock;
pub mod queries;
mod traits;

pub use check::{
    Check, CheckError, CheckOutput, INNODB_CHECK_NAME, InnodbCheckOutput, TableStatistics,
    check_innodb, check_mysql,
};
pub use mock::MockSource;
pub use traits::{DumpSource, Row, SourceError, StatusSource, row};
