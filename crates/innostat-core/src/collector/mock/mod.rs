//! Mock status source for testing.
//!
//! This module provides `MockSource` and pre-built server scenarios for
//! testing checks without a running MySQL server.

mod scenarios;
mod source;

pub use scenarios::{LEGACY_STATUS, MULTI_POOL_STATUS, TYPICAL_STATUS};
pub use source::{MockSource, json_row};
