//! innostat-core - InnoDB telemetry collection library.
//!
//! Provides:
//! - `collector` - status sources, checks, and the `SHOW ENGINE INNODB STATUS` parser
//! - `models` - the flat metric mapping produced by the parser

pub mod collector;
pub mod models;
