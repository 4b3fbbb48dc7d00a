//! Raw result tables into typed polars frames.

use polars::prelude::{Column, DataFrame};

use crate::catalog::SpecQuery;
use crate::encoding::repair_mojibake;
use crate::spec::{EnumSqlKind, EnumSqlValue, SourceError, SpecRawTable};

/// Check that `table` carries exactly the labels `query` expects, in order.
pub fn validate_table_schema(query: &SpecQuery, table: &SpecRawTable) -> Result<(), SourceError> {
    if table.columns.iter().map(String::as_str).eq(query.columns.iter().copied()) {
        return Ok(());
    }
    Err(SourceError::SchemaMismatch {
        name: query.name.to_string(),
        expected: query.columns.iter().map(ToString::to_string).collect(),
        found: table.columns.clone(),
    })
}

/// Build a frame with one typed column per table column.
///
/// `Integer` columns become `Int64`, `Float` columns `Float64`, `Text` columns
/// `String` with mis-decoded text repaired. Values that do not fit their column kind
/// become null.
pub fn derive_dataset_frame(table: &SpecRawTable) -> Result<DataFrame, SourceError> {
    let n_cols = table.columns.len();
    if table.kinds.len() != n_cols {
        return Err(SourceError::Frame(format!(
            "{} column kinds for {n_cols} columns",
            table.kinds.len()
        )));
    }
    if let Some((n_idx, row)) = table
        .rows
        .iter()
        .enumerate()
        .find(|(_, row)| row.len() != n_cols)
    {
        return Err(SourceError::Frame(format!(
            "row {n_idx} has {} values for {n_cols} columns",
            row.len()
        )));
    }

    let l_columns: Vec<Column> = table
        .columns
        .iter()
        .zip(&table.kinds)
        .enumerate()
        .map(|(n_idx_col, (c_label, kind))| {
            let iter_values = table.rows.iter().map(|row| &row[n_idx_col]);
            create_typed_column(c_label, *kind, iter_values)
        })
        .collect();

    DataFrame::new(l_columns).map_err(|err| SourceError::Frame(err.to_string()))
}

fn create_typed_column<'a, I>(label: &str, kind: EnumSqlKind, values: I) -> Column
where
    I: Iterator<Item = &'a EnumSqlValue>,
{
    match kind {
        EnumSqlKind::Integer => {
            let l_values: Vec<Option<i64>> = values.map(EnumSqlValue::as_i64).collect();
            Column::new(label.into(), l_values)
        }
        EnumSqlKind::Float => {
            let l_values: Vec<Option<f64>> = values.map(EnumSqlValue::as_f64).collect();
            Column::new(label.into(), l_values)
        }
        EnumSqlKind::Text => {
            let l_values: Vec<Option<String>> = values
                .map(|value| value.as_text().map(|val| repair_mojibake(&val).into_owned()))
                .collect();
            Column::new(label.into(), l_values)
        }
    }
}
