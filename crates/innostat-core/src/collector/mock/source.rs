//! In-memory status source for testing checks without a server.

use std::collections::HashMap;

use crate::collector::traits::{Row, SourceError, StatusSource};

#[derive(Debug, Clone)]
enum Response {
    Rows(Vec<Row>),
    QueryError(String),
}

/// Canned responses keyed by exact query text.
///
/// Unknown queries fail with [`SourceError::Unsupported`]. Every issued
/// query is recorded so tests can assert on the query sequence.
#[derive(Debug, Clone, Default)]
pub struct MockSource {
    responses: HashMap<String, Response>,
    /// When set, every query fails with a connection error.
    connection_error: Option<String>,
    issued: Vec<String>,
}

impl MockSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `sql` with `rows`.
    pub fn add_rows(&mut self, sql: &str, rows: Vec<Row>) {
        self.responses.insert(sql.to_string(), Response::Rows(rows));
    }

    /// Makes `sql` fail with a query error.
    pub fn add_query_error(&mut self, sql: &str, message: &str) {
        self.responses
            .insert(sql.to_string(), Response::QueryError(message.to_string()));
    }

    /// Makes every query fail as if the server could not be reached.
    pub fn set_connection_error(&mut self, message: &str) {
        self.connection_error = Some(message.to_string());
    }

    /// Queries issued so far, in order.
    pub fn issued(&self) -> &[String] {
        &self.issued
    }
}

impl StatusSource for MockSource {
    fn query(&mut self, sql: &str) -> Result<Vec<Row>, SourceError> {
        self.issued.push(sql.to_string());

        if let Some(message) = &self.connection_error {
            return Err(SourceError::Connection(message.clone()));
        }

        match self.responses.get(sql) {
            Some(Response::Rows(rows)) => Ok(rows.clone()),
            Some(Response::QueryError(message)) => Err(SourceError::Query(message.clone())),
            None => Err(SourceError::Unsupported(sql.trim().to_string())),
        }
    }
}

/// Converts a JSON object into a row; non-objects yield an empty row.
pub fn json_row(value: serde_json::Value) -> Row {
    match value {
        serde_json::Value::Object(map) => map.into_iter().collect(),
        _ => Row::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mock_source_returns_rows() {
        let mut source = MockSource::new();
        source.add_rows("SELECT 1", vec![json_row(json!({"a": 1}))]);
        let rows = source.query("SELECT 1").unwrap();
        assert_eq!(rows[0].get("a"), Some(&json!(1)));
        assert_eq!(source.issued(), &["SELECT 1".to_string()]);
    }

    #[test]
    fn test_mock_source_query_error() {
        let mut source = MockSource::new();
        source.add_query_error("SELECT 1", "access denied");
        let err = source.query("SELECT 1").unwrap_err();
        assert_eq!(err.to_string(), "query error: access denied");
    }

    #[test]
    fn test_mock_source_unknown_query() {
        let mut source = MockSource::new();
        assert!(matches!(
            source.query("SELECT 2"),
            Err(SourceError::Unsupported(_))
        ));
    }

    #[test]
    fn test_mock_source_connection_error() {
        let mut source = MockSource::new();
        source.add_rows("SELECT 1", Vec::new());
        source.set_connection_error("connection refused");
        assert!(matches!(
            source.query("SELECT 1"),
            Err(SourceError::Connection(_))
        ));
    }
}
