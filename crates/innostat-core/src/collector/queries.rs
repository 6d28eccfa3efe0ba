//! SQL issued by the checks.

/// Returns one row if the InnoDB engine is compiled in and enabled.
pub const QUERY_HAS_INNODB: &str = "\
SELECT engine
FROM information_schema.ENGINES
WHERE engine='InnoDB' and support != 'no' and support != 'disabled'
";

/// Returns one row whose `Status` column holds the monitor report.
pub const QUERY_INNODB_STATUS: &str = "SHOW /*!50000 ENGINE*/ INNODB STATUS";

/// Per-table read/change counters (Percona Server / MariaDB userstat).
pub const QUERY_TABLE_STATISTICS: &str = "\
SELECT table_schema, table_name, rows_read, rows_changed
FROM information_schema.table_statistics
";
