//! Abstraction over where query results come from.
//!
//! The `StatusSource` trait lets the checks run against a live server
//! connection, a captured status dump, or an in-memory mock in tests.

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;

use thiserror::Error;

use super::queries::{QUERY_HAS_INNODB, QUERY_INNODB_STATUS};

/// One result row: column name to value.
pub type Row = BTreeMap<String, serde_json::Value>;

/// Error returned by a [`StatusSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("unable to connect: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("query not supported by this source: {0}")]
    Unsupported(String),

    #[error("failed to read status dump: {0}")]
    Io(#[from] std::io::Error),
}

/// Executes SQL and returns rows as generic key-value records.
pub trait StatusSource {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>, SourceError>;
}

impl<S: StatusSource + ?Sized> StatusSource for &mut S {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>, SourceError> {
        (**self).query(sql)
    }
}

/// Serves a captured `SHOW ENGINE INNODB STATUS` report.
///
/// Answers the engine-support query with a single `InnoDB` row and the
/// status query with a single row whose `Status` column is the report.
/// A blank report yields no rows, as a server without output would.
#[derive(Debug, Clone)]
pub struct DumpSource {
    status: String,
}

impl DumpSource {
    pub fn from_text(status: impl Into<String>) -> Self {
        Self {
            status: status.into(),
        }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, SourceError> {
        Ok(Self::from_text(std::fs::read_to_string(path)?))
    }

    pub fn from_reader(mut reader: impl Read) -> Result<Self, SourceError> {
        let mut status = String::new();
        reader.read_to_string(&mut status)?;
        Ok(Self::from_text(status))
    }

    pub fn status(&self) -> &str {
        &self.status
    }
}

impl StatusSource for DumpSource {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>, SourceError> {
        if sql == QUERY_HAS_INNODB {
            return Ok(vec![row(&[("engine", "InnoDB")])]);
        }
        if sql == QUERY_INNODB_STATUS {
            if self.status.trim().is_empty() {
                return Ok(Vec::new());
            }
            return Ok(vec![row(&[
                ("Type", "InnoDB"),
                ("Name", ""),
                ("Status", self.status.as_str()),
            ])]);
        }
        Err(SourceError::Unsupported(sql.trim().to_string()))
    }
}

/// Builds a row of string columns.
pub fn row(columns: &[(&str, &str)]) -> Row {
    columns
        .iter()
        .map(|(name, value)| (name.to_string(), serde_json::Value::from(*value)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_dump_source_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "History list length 12").unwrap();

        let mut source = DumpSource::from_path(file.path()).unwrap();
        let rows = source.query(QUERY_INNODB_STATUS).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            rows[0].get("Status").and_then(|v| v.as_str()),
            Some("History list length 12\n")
        );
    }

    #[test]
    fn test_dump_source_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = DumpSource::from_path(dir.path().join("missing.txt")).unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }

    #[test]
    fn test_dump_source_from_reader() {
        let source = DumpSource::from_reader("Trx id counter 1".as_bytes()).unwrap();
        assert_eq!(source.status(), "Trx id counter 1");
    }

    #[test]
    fn test_dump_source_reports_innodb() {
        let mut source = DumpSource::from_text("");
        let rows = source.query(QUERY_HAS_INNODB).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get("engine").and_then(|v| v.as_str()), Some("InnoDB"));
    }

    #[test]
    fn test_dump_source_blank_status_has_no_rows() {
        let mut source = DumpSource::from_text("  \n\n");
        assert!(source.query(QUERY_INNODB_STATUS).unwrap().is_empty());
    }

    #[test]
    fn test_dump_source_rejects_other_queries() {
        let mut source = DumpSource::from_text("x");
        let err = source.query("SELECT 1").unwrap_err();
        assert!(matches!(err, SourceError::Unsupported(_)));
    }
}
