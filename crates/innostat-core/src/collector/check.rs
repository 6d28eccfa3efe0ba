//! Checks: one query round against a source, producing a publishable result.
//!
//! - `innodb` - parses `SHOW ENGINE INNODB STATUS` into [`InnodbMetrics`]
//! - `mysql` - per-table statistics from `information_schema.table_statistics`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use super::innodb::{ParseOptions, parse_innodb_status_with};
use super::queries::{QUERY_HAS_INNODB, QUERY_INNODB_STATUS, QUERY_TABLE_STATISTICS};
use super::traits::{Row, SourceError, StatusSource};
use crate::models::InnodbMetrics;

/// Name tag published alongside the InnoDB metrics.
pub const INNODB_CHECK_NAME: &str = "innodb";

/// Error type for a check run.
#[derive(Debug, Error)]
pub enum CheckError {
    /// The server has no usable InnoDB engine; the check does not apply.
    #[error("InnoDB storage engine is not available")]
    Ignored,

    #[error("no INNODB STATUS metrics found")]
    NoStatus,

    #[error("unexpected row shape: {0}")]
    InvalidRow(String),

    #[error(transparent)]
    Source(#[from] SourceError),
}

/// Available checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    Innodb,
    Mysql,
}

impl Check {
    pub const ALL: [Check; 2] = [Check::Innodb, Check::Mysql];

    pub fn name(self) -> &'static str {
        match self {
            Check::Innodb => INNODB_CHECK_NAME,
            Check::Mysql => "mysql",
        }
    }

    /// Runs the check against `source`.
    pub fn run<S: StatusSource + ?Sized>(
        self,
        source: &mut S,
        options: &ParseOptions,
    ) -> Result<CheckOutput, CheckError> {
        match self {
            Check::Innodb => {
                check_innodb(source, options).map(|stats| CheckOutput::Innodb(vec![stats]))
            }
            Check::Mysql => check_mysql(source).map(CheckOutput::Tables),
        }
    }
}

impl fmt::Display for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Check {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Check::ALL
            .into_iter()
            .find(|check| check.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown check '{}' (expected innodb or mysql)", s))
    }
}

/// InnoDB metrics with their name tag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InnodbCheckOutput {
    #[serde(flatten)]
    pub metrics: InnodbMetrics,
    pub name: &'static str,
}

/// One row of `information_schema.table_statistics`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableStatistics {
    pub table_schema: String,
    pub table_name: String,
    pub rows_read: u64,
    pub rows_changed: u64,
}

/// Result of a check, keyed by result type when serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum CheckOutput {
    #[serde(rename = "innodb")]
    Innodb(Vec<InnodbCheckOutput>),
    #[serde(rename = "tables")]
    Tables(Vec<TableStatistics>),
}

/// Collects InnoDB metrics.
///
/// Returns [`CheckError::Ignored`] when the engine is disabled and
/// [`CheckError::NoStatus`] when the status query yields no report.
pub fn check_innodb<S: StatusSource + ?Sized>(
    source: &mut S,
    options: &ParseOptions,
) -> Result<InnodbCheckOutput, CheckError> {
    if source.query(QUERY_HAS_INNODB)?.is_empty() {
        return Err(CheckError::Ignored);
    }

    let rows = source.query(QUERY_INNODB_STATUS)?;
    let status = rows
        .first()
        .and_then(|row| row.get("Status"))
        .and_then(|value| value.as_str())
        .filter(|text| !text.trim().is_empty())
        .ok_or(CheckError::NoStatus)?;

    let metrics = parse_innodb_status_with(status, options);
    debug!("innodb check: {} metrics", metrics.len());

    Ok(InnodbCheckOutput {
        metrics,
        name: INNODB_CHECK_NAME,
    })
}

/// Collects per-table read/change counters.
pub fn check_mysql<S: StatusSource + ?Sized>(
    source: &mut S,
) -> Result<Vec<TableStatistics>, CheckError> {
    let rows = source.query(QUERY_TABLE_STATISTICS)?;
    let tables = rows
        .into_iter()
        .map(table_statistics_from_row)
        .collect::<Result<Vec<_>, _>>()?;
    debug!("mysql check: {} tables", tables.len());
    Ok(tables)
}

fn table_statistics_from_row(row: Row) -> Result<TableStatistics, CheckError> {
    let object: serde_json::Map<String, serde_json::Value> = row.into_iter().collect();
    serde_json::from_value(serde_json::Value::Object(object))
        .map_err(|e| CheckError::InvalidRow(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collector::mock::MockSource;

    #[test]
    fn test_check_innodb_typical() {
        let mut source = MockSource::typical_server();
        let output = check_innodb(&mut source, &ParseOptions::default()).unwrap();
        assert_eq!(output.name, "innodb");
        assert_eq!(output.metrics.get_i64("history_list_length"), Some(132));
        assert_eq!(
            source.issued(),
            &[QUERY_HAS_INNODB.to_string(), QUERY_INNODB_STATUS.to_string()]
        );
    }

    #[test]
    fn test_check_innodb_without_engine() {
        let mut source = MockSource::without_innodb();
        let err = check_innodb(&mut source, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, CheckError::Ignored));
        assert_eq!(source.issued().len(), 1);
    }

    #[test]
    fn test_check_innodb_empty_status() {
        let mut source = MockSource::empty_status();
        let err = check_innodb(&mut source, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, CheckError::NoStatus));
    }

    #[test]
    fn test_check_innodb_status_column_missing() {
        let mut source = MockSource::new();
        source.add_rows(QUERY_HAS_INNODB, vec![crate::collector::row(&[("engine", "InnoDB")])]);
        source.add_rows(QUERY_INNODB_STATUS, vec![crate::collector::row(&[("Type", "InnoDB")])]);
        let err = check_innodb(&mut source, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, CheckError::NoStatus));
    }

    #[test]
    fn test_check_innodb_source_failure() {
        let mut source = MockSource::unreachable();
        let err = check_innodb(&mut source, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, CheckError::Source(SourceError::Connection(_))));
    }

    #[test]
    fn test_check_mysql_rows() {
        let mut source = MockSource::typical_server();
        let tables = check_mysql(&mut source).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].table_schema, "shop");
        assert_eq!(tables[0].table_name, "orders");
        assert_eq!(tables[0].rows_read, 1500);
        assert_eq!(tables[0].rows_changed, 42);
    }

    #[test]
    fn test_check_mysql_bad_row() {
        let mut source = MockSource::new();
        source.add_rows(
            QUERY_TABLE_STATISTICS,
            vec![crate::collector::row(&[("table_schema", "shop")])],
        );
        let err = check_mysql(&mut source).unwrap_err();
        assert!(matches!(err, CheckError::InvalidRow(_)));
    }

    #[test]
    fn test_check_from_str() {
        assert_eq!("innodb".parse::<Check>(), Ok(Check::Innodb));
        assert_eq!("MySQL".parse::<Check>(), Ok(Check::Mysql));
        assert!("system".parse::<Check>().is_err());
        assert_eq!(Check::Mysql.to_string(), "mysql");
    }

    #[test]
    fn test_check_output_json_shape() {
        let mut source = MockSource::typical_server();
        let output = Check::Innodb
            .run(&mut source, &ParseOptions::default())
            .unwrap();
        let json = serde_json::to_value(&output).unwrap();
        let stats = &json["innodb"][0];
        assert_eq!(stats["name"], "innodb");
        assert_eq!(stats["history_list_length"], 132);

        let output = Check::Mysql
            .run(&mut source, &ParseOptions::default())
            .unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["tables"][1]["table_name"], "customers");
    }
}
