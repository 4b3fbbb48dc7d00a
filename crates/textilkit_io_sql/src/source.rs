//! Query execution: the executor seam, the MySQL driver binding and catalog extraction.

use mysql::consts::ColumnType;
use mysql::prelude::Queryable;
use mysql::{Conn, OptsBuilder, Value};
use polars::prelude::DataFrame;

use crate::catalog::SpecQuery;
use crate::frame::{derive_dataset_frame, validate_table_schema};
use crate::spec::{
    EnumSqlKind, EnumSqlValue, SourceError, SpecConnectionOptions, SpecDataset, SpecExtractReport,
    SpecRawTable,
};

/// Runs SQL text and returns the first result set.
pub trait QueryExecutor {
    /// Execute `sql` and collect its result set.
    fn fetch_table(&mut self, sql: &str) -> Result<SpecRawTable, SourceError>;
}

////////////////////////////////////////////////////////////////////////////////
// #region Extraction

/// Run one catalog entry: fetch, check labels, build the typed frame.
pub fn fetch_dataset_frame<E>(executor: &mut E, query: &SpecQuery) -> Result<DataFrame, SourceError>
where
    E: QueryExecutor + ?Sized,
{
    tracing::debug!(dataset = query.name, sql = query.sql, "running query");
    let table = executor.fetch_table(query.sql)?;
    validate_table_schema(query, &table)?;
    derive_dataset_frame(&table)
}

/// Run every catalog entry independently.
///
/// A failing entry is logged and yields an empty dataset; the loop continues.
/// Datasets come back in catalog order.
pub fn extract_datasets<E>(
    executor: &mut E,
    catalog: &[SpecQuery],
) -> (Vec<SpecDataset>, SpecExtractReport)
where
    E: QueryExecutor + ?Sized,
{
    let mut report = SpecExtractReport::default();
    let mut l_datasets = Vec::with_capacity(catalog.len());

    for query in catalog {
        report.n_queries += 1;
        tracing::info!("→ {}...", query.name);
        let frame = match fetch_dataset_frame(executor, query) {
            Ok(df) => {
                if df.height() == 0 {
                    report.n_empty += 1;
                }
                tracing::info!(dataset = query.name, rows = df.height(), "dataset extracted");
                df
            }
            Err(err) => {
                tracing::warn!(dataset = query.name, "dataset failed: {err}");
                report.fail(query.name, &err);
                DataFrame::empty()
            }
        };
        l_datasets.push(SpecDataset {
            name: query.name.to_string(),
            frame,
        });
    }

    (l_datasets, report)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region MysqlSource

/// One blocking MySQL connection.
pub struct MysqlSource {
    conn: Conn,
}

impl MysqlSource {
    /// Open the connection and run the connectivity check.
    pub fn connect(options: &SpecConnectionOptions) -> Result<Self, SourceError> {
        validate_charset(&options.charset)?;
        let opts = OptsBuilder::new()
            .ip_or_hostname(Some(options.host.as_str()))
            .tcp_port(options.port)
            .user(Some(options.user.as_str()))
            .pass(Some(options.password.as_str()))
            .db_name(Some(options.database.as_str()))
            .init(vec![format!("SET NAMES {}", options.charset)]);

        let mut conn = Conn::new(opts).map_err(|err| SourceError::Connect(err.to_string()))?;
        conn.query_drop("SELECT 1")
            .map_err(|err| SourceError::Connect(err.to_string()))?;

        tracing::info!(
            host = %options.host,
            port = options.port,
            database = %options.database,
            "connected"
        );
        Ok(Self { conn })
    }

    /// Release the connection.
    pub fn close(self) {
        drop(self.conn);
        tracing::debug!("connection closed");
    }
}

impl QueryExecutor for MysqlSource {
    fn fetch_table(&mut self, sql: &str) -> Result<SpecRawTable, SourceError> {
        let mut result = self
            .conn
            .query_iter(sql)
            .map_err(|err| SourceError::Query(err.to_string()))?;

        let columns = result.columns();
        let l_columns = columns.as_ref();
        let mut table = SpecRawTable {
            columns: l_columns
                .iter()
                .map(|col| col.name_str().into_owned())
                .collect(),
            kinds: l_columns
                .iter()
                .map(|col| derive_sql_kind(col.column_type()))
                .collect(),
            rows: Vec::new(),
        };

        for row in result.by_ref() {
            let row = row.map_err(|err| SourceError::Query(err.to_string()))?;
            let l_values = row
                .unwrap()
                .into_iter()
                .zip(&table.kinds)
                .map(|(value, kind)| convert_mysql_value(value, *kind))
                .collect();
            table.rows.push(l_values);
        }
        Ok(table)
    }
}

fn validate_charset(charset: &str) -> Result<(), SourceError> {
    if !charset.is_empty() && charset.chars().all(|chr| chr.is_ascii_alphanumeric() || chr == '_') {
        return Ok(());
    }
    Err(SourceError::Connect(format!("invalid charset: {charset:?}")))
}

/// Map a driver column type to the kind its values are parsed as.
pub fn derive_sql_kind(column_type: ColumnType) -> EnumSqlKind {
    match column_type {
        ColumnType::MYSQL_TYPE_TINY
        | ColumnType::MYSQL_TYPE_SHORT
        | ColumnType::MYSQL_TYPE_LONG
        | ColumnType::MYSQL_TYPE_INT24
        | ColumnType::MYSQL_TYPE_LONGLONG
        | ColumnType::MYSQL_TYPE_YEAR => EnumSqlKind::Integer,
        ColumnType::MYSQL_TYPE_FLOAT
        | ColumnType::MYSQL_TYPE_DOUBLE
        | ColumnType::MYSQL_TYPE_DECIMAL
        | ColumnType::MYSQL_TYPE_NEWDECIMAL => EnumSqlKind::Float,
        _ => EnumSqlKind::Text,
    }
}

/// Convert a driver value by column kind. Text-protocol bytes that do not parse become null.
pub fn convert_mysql_value(value: Value, kind: EnumSqlKind) -> EnumSqlValue {
    match value {
        Value::NULL => EnumSqlValue::Null,
        Value::Bytes(v_bytes) => {
            let c_text = String::from_utf8_lossy(&v_bytes);
            match kind {
                EnumSqlKind::Integer => c_text
                    .trim()
                    .parse::<i64>()
                    .map_or(EnumSqlValue::Null, EnumSqlValue::Integer),
                EnumSqlKind::Float => c_text
                    .trim()
                    .parse::<f64>()
                    .map_or(EnumSqlValue::Null, EnumSqlValue::Float),
                EnumSqlKind::Text => EnumSqlValue::Text(c_text.into_owned()),
            }
        }
        Value::Int(val) => EnumSqlValue::Integer(val),
        Value::UInt(val) => i64::try_from(val)
            .map_or(EnumSqlValue::Float(val as f64), EnumSqlValue::Integer),
        Value::Float(val) => EnumSqlValue::Float(f64::from(val)),
        Value::Double(val) => EnumSqlValue::Float(val),
        Value::Date(year, month, day, hour, minute, second, _) => EnumSqlValue::Text(format!(
            "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}"
        )),
        Value::Time(if_negative, days, hours, minutes, seconds, _) => {
            let c_sign = if if_negative { "-" } else { "" };
            let n_hours = u64::from(days) * 24 + u64::from(hours);
            EnumSqlValue::Text(format!("{c_sign}{n_hours:02}:{minutes:02}:{seconds:02}"))
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
