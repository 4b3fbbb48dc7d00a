//! Source-side models: raw tables, datasets, connection options, errors and the extract report.

use polars::prelude::DataFrame;
use thiserror::Error;

////////////////////////////////////////////////////////////////////////////////
// #region ValueSpecification

/// Column kind a driver type maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSqlKind {
    /// Whole numbers (`COUNT`, integer columns).
    Integer,
    /// Decimal and floating point numbers (`SUM`, `AVG`, money).
    Float,
    /// Everything else, rendered as text.
    Text,
}

/// One scalar from a result row.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumSqlValue {
    /// SQL `NULL` or an unparseable value.
    Null,
    /// Whole number.
    Integer(i64),
    /// Floating point number.
    Float(f64),
    /// Text.
    Text(String),
}

impl EnumSqlValue {
    /// Integer view; floats are truncated, text is parsed.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Null => None,
            Self::Integer(val) => Some(*val),
            Self::Float(val) => val.is_finite().then_some(*val as i64),
            Self::Text(val) => val.trim().parse::<i64>().ok(),
        }
    }

    /// Float view; text is parsed.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Null => None,
            Self::Integer(val) => Some(*val as f64),
            Self::Float(val) => Some(*val),
            Self::Text(val) => val.trim().parse::<f64>().ok(),
        }
    }

    /// Text view; numbers are rendered.
    pub fn as_text(&self) -> Option<String> {
        match self {
            Self::Null => None,
            Self::Integer(val) => Some(val.to_string()),
            Self::Float(val) => Some(val.to_string()),
            Self::Text(val) => Some(val.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region TableSpecification

/// Result set as returned by a [`crate::source::QueryExecutor`]: labels, kinds, rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecRawTable {
    /// Column labels in result order.
    pub columns: Vec<String>,
    /// Column kinds, parallel to `columns`.
    pub kinds: Vec<EnumSqlKind>,
    /// Row-major values; every row has `columns.len()` entries.
    pub rows: Vec<Vec<EnumSqlValue>>,
}

/// Named dataset produced by one catalog entry.
#[derive(Debug, Clone)]
pub struct SpecDataset {
    /// Catalog entry name.
    pub name: String,
    /// Typed table; empty when the query failed.
    pub frame: DataFrame,
}

impl SpecDataset {
    /// Whether the dataset holds no rows.
    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ConnectionSpecification

/// Default MySQL port.
pub const N_PORT_MYSQL_DEFAULT: u16 = 3306;
/// Default connection charset.
pub const C_CHARSET_DEFAULT: &str = "utf8mb4";

/// Connection descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecConnectionOptions {
    /// Server host name or IP.
    pub host: String,
    /// Server TCP port.
    pub port: u16,
    /// User name.
    pub user: String,
    /// Password.
    pub password: String,
    /// Database (schema) name.
    pub database: String,
    /// Connection charset, sent as `SET NAMES`.
    pub charset: String,
}

impl Default for SpecConnectionOptions {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: N_PORT_MYSQL_DEFAULT,
            user: String::new(),
            password: String::new(),
            database: String::new(),
            charset: C_CHARSET_DEFAULT.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ErrorSpecification

/// Data source failures.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SourceError {
    /// Connection could not be opened or failed the connectivity check.
    #[error("connection failed: {0}")]
    Connect(String),
    /// Query failed on the server or in the driver.
    #[error("query failed: {0}")]
    Query(String),
    /// Result labels differ from the catalog entry.
    #[error("schema mismatch for {name}: expected {expected:?}, found {found:?}")]
    SchemaMismatch {
        /// Catalog entry name.
        name: String,
        /// Expected column labels.
        expected: Vec<String>,
        /// Labels returned by the query.
        found: Vec<String>,
    },
    /// Table could not be turned into a frame.
    #[error("frame build failed: {0}")]
    Frame(String),
    /// Catalog failed validation.
    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-run extraction report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecExtractReport {
    /// Catalog entries executed.
    pub n_queries: usize,
    /// Entries that failed and became empty datasets.
    pub n_failed: usize,
    /// Entries that ran fine and returned no rows.
    pub n_empty: usize,
    /// `(dataset name, error text)` for each failure.
    pub errors: Vec<(String, String)>,
}

impl SpecExtractReport {
    /// Record a failed dataset.
    pub fn fail(&mut self, name: &str, err: &SourceError) {
        self.n_failed += 1;
        self.errors.push((name.to_string(), err.to_string()));
    }

    /// Datasets that produced at least one row.
    pub fn n_filled(&self) -> usize {
        self.n_queries - self.n_failed - self.n_empty
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_value_views() {
        assert_eq!(EnumSqlValue::Float(12.9).as_i64(), Some(12));
        assert_eq!(EnumSqlValue::Text(" 42 ".to_string()).as_i64(), Some(42));
        assert_eq!(EnumSqlValue::Integer(3).as_f64(), Some(3.0));
        assert_eq!(EnumSqlValue::Text("abc".to_string()).as_f64(), None);
        assert_eq!(EnumSqlValue::Null.as_text(), None);
        assert_eq!(EnumSqlValue::Float(f64::NAN).as_i64(), None);
    }

    #[test]
    fn test_extract_report_counts() {
        let mut report = SpecExtractReport {
            n_queries: 11,
            n_empty: 2,
            ..Default::default()
        };
        report.fail("top_clientes", &SourceError::Query("timeout".to_string()));

        assert_eq!(report.n_failed, 1);
        assert_eq!(report.n_filled(), 8);
        assert_eq!(report.errors[0].0, "top_clientes");
        assert_eq!(report.errors[0].1, "query failed: timeout");
    }
}
