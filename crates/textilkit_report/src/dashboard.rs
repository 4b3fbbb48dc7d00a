//! Dashboard inputs from the ad-hoc aggregate queries.
//!
//! Each query runs on its own; a failure leaves its part of [`SpecDashboardData`]
//! empty and the dashboard is still written.

use polars::prelude::{AnyValue, DataFrame};
use textilkit_io_sql::catalog::{
    Q_CUSTO_MANUTENCAO, Q_MANUTENCAO_CARA, Q_TOP3_CLIENTES, Q_TOP3_PAGAMENTOS, Q_TOP3_TURNOS,
    Q_TOP5_CLIENTES, Q_TOP5_PAGAMENTOS, Q_TOTAL_CLIENTES, Q_TOTAL_FORNECEDORES,
    Q_TOTAL_FUNCIONARIOS, Q_TOTAL_PRODUCOES, Q_TOTAL_VENDAS, Q_VALOR_VENDAS,
};
use textilkit_io_sql::{QueryExecutor, SpecQuery, fetch_dataset_frame};
use textilkit_io_xlsx::conf::C_VALUE_MISSING;
use textilkit_io_xlsx::{
    SpecDashboardData, SpecDashboardTotals, SpecMaintenanceCost, SpecRankedAmount,
    SpecRankedPayment, SpecRankedUnits,
};

/// Run every dashboard query and collect the results. Never fails.
pub fn fetch_dashboard_data<E>(executor: &mut E, generated_at: &str) -> SpecDashboardData
where
    E: QueryExecutor + ?Sized,
{
    let totals = SpecDashboardTotals {
        cnt_sales: fetch_section(executor, &Q_TOTAL_VENDAS, derive_count),
        cnt_productions: fetch_section(executor, &Q_TOTAL_PRODUCOES, derive_count),
        cnt_customers: fetch_section(executor, &Q_TOTAL_CLIENTES, derive_count),
        cnt_employees: fetch_section(executor, &Q_TOTAL_FUNCIONARIOS, derive_count),
        cnt_suppliers: fetch_section(executor, &Q_TOTAL_FORNECEDORES, derive_count),
        amount_sales: fetch_section(executor, &Q_VALOR_VENDAS, derive_sum),
        amount_maintenance: fetch_section(executor, &Q_CUSTO_MANUTENCAO, derive_sum),
    };

    let top_shifts =
        fetch_section(executor, &Q_TOP3_TURNOS, derive_ranked_units).unwrap_or_default();

    SpecDashboardData {
        generated_at: generated_at.to_string(),
        totals,
        top_customers: fetch_section(executor, &Q_TOP3_CLIENTES, derive_ranked_amounts)
            .unwrap_or_default(),
        top_payment_methods: fetch_section(executor, &Q_TOP3_PAGAMENTOS, derive_ranked_payments)
            .unwrap_or_default(),
        costliest_maintenance: fetch_section(executor, &Q_MANUTENCAO_CARA, derive_maintenance)
            .flatten(),
        chart_customers: fetch_section(executor, &Q_TOP5_CLIENTES, derive_ranked_amounts)
            .unwrap_or_default(),
        chart_payment_methods: fetch_section(executor, &Q_TOP5_PAGAMENTOS, derive_ranked_amounts)
            .unwrap_or_default(),
        chart_shifts: top_shifts.clone(),
        top_shifts,
    }
}

/// Fetch one query and read it with `derive`; failures are logged and yield `None`.
fn fetch_section<E, T, F>(executor: &mut E, query: &SpecQuery, derive: F) -> Option<T>
where
    E: QueryExecutor + ?Sized,
    F: FnOnce(&DataFrame, &SpecQuery) -> Result<T, String>,
{
    let result = fetch_dataset_frame(executor, query)
        .map_err(|err| err.to_string())
        .and_then(|df| derive(&df, query));
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(section = query.name, "dashboard section unavailable: {err}");
            None
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region FrameReaders

fn derive_cell<'a>(df: &'a DataFrame, col: &str, row: usize) -> Result<AnyValue<'a>, String> {
    df.column(col)
        .and_then(|column| column.get(row))
        .map_err(|err| format!("cannot read {col}[{row}]: {err}"))
}

fn derive_f64_from_any_value(value: AnyValue<'_>) -> Option<f64> {
    match value {
        AnyValue::UInt8(val) => Some(val as f64),
        AnyValue::UInt16(val) => Some(val as f64),
        AnyValue::UInt32(val) => Some(val as f64),
        AnyValue::UInt64(val) => Some(val as f64),
        AnyValue::Int8(val) => Some(val as f64),
        AnyValue::Int16(val) => Some(val as f64),
        AnyValue::Int32(val) => Some(val as f64),
        AnyValue::Int64(val) => Some(val as f64),
        AnyValue::Float32(val) => Some(val as f64),
        AnyValue::Float64(val) => Some(val),
        AnyValue::String(val) => val.parse::<f64>().ok(),
        AnyValue::StringOwned(val) => val.parse::<f64>().ok(),
        _ => None,
    }
}

fn derive_text_from_any_value(value: AnyValue<'_>) -> String {
    match value {
        AnyValue::Null => C_VALUE_MISSING.to_string(),
        AnyValue::String(val) => val.to_string(),
        AnyValue::StringOwned(val) => val.to_string(),
        other => other.to_string(),
    }
}

fn derive_first_row(df: &DataFrame, query: &SpecQuery) -> Result<(), String> {
    if df.height() == 0 {
        return Err(format!("{} returned no rows", query.name));
    }
    Ok(())
}

/// `COUNT(*)` result.
fn derive_count(df: &DataFrame, query: &SpecQuery) -> Result<i64, String> {
    derive_first_row(df, query)?;
    derive_f64_from_any_value(derive_cell(df, query.columns[0], 0)?)
        .map(|val| val.round() as i64)
        .ok_or_else(|| format!("{} returned a non-numeric count", query.name))
}

/// `SUM(...)` result; `NULL` over an empty table counts as zero.
fn derive_sum(df: &DataFrame, query: &SpecQuery) -> Result<f64, String> {
    derive_first_row(df, query)?;
    Ok(derive_f64_from_any_value(derive_cell(df, query.columns[0], 0)?).unwrap_or(0.0))
}

fn derive_amount(df: &DataFrame, col: &str, row: usize) -> Result<f64, String> {
    Ok(derive_f64_from_any_value(derive_cell(df, col, row)?).unwrap_or(0.0))
}

/// `(label, amount)` rows.
fn derive_ranked_amounts(
    df: &DataFrame,
    query: &SpecQuery,
) -> Result<Vec<SpecRankedAmount>, String> {
    let [c_label, c_amount] = [query.columns[0], query.columns[query.columns.len() - 1]];
    (0..df.height())
        .map(|n_row| {
            Ok(SpecRankedAmount {
                label: derive_text_from_any_value(derive_cell(df, c_label, n_row)?),
                amount: derive_amount(df, c_amount, n_row)?,
            })
        })
        .collect()
}

/// `(label, count, amount)` rows.
fn derive_ranked_payments(
    df: &DataFrame,
    query: &SpecQuery,
) -> Result<Vec<SpecRankedPayment>, String> {
    (0..df.height())
        .map(|n_row| {
            Ok(SpecRankedPayment {
                label: derive_text_from_any_value(derive_cell(df, query.columns[0], n_row)?),
                cnt_sales: derive_amount(df, query.columns[1], n_row)?.round() as i64,
                amount: derive_amount(df, query.columns[2], n_row)?,
            })
        })
        .collect()
}

/// `(label, _, units)` rows.
fn derive_ranked_units(df: &DataFrame, query: &SpecQuery) -> Result<Vec<SpecRankedUnits>, String> {
    let c_units = query.columns[query.columns.len() - 1];
    (0..df.height())
        .map(|n_row| {
            Ok(SpecRankedUnits {
                label: derive_text_from_any_value(derive_cell(df, query.columns[0], n_row)?),
                units: derive_amount(df, c_units, n_row)?,
            })
        })
        .collect()
}

/// First `(type, cost, hours)` row, if any.
fn derive_maintenance(
    df: &DataFrame,
    query: &SpecQuery,
) -> Result<Option<SpecMaintenanceCost>, String> {
    if df.height() == 0 {
        return Ok(None);
    }
    Ok(Some(SpecMaintenanceCost {
        label: derive_text_from_any_value(derive_cell(df, query.columns[0], 0)?),
        amount: derive_amount(df, query.columns[1], 0)?,
        hours: derive_amount(df, query.columns[2], 0)?,
    }))
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use textilkit_io_sql::{EnumSqlKind, EnumSqlValue, SourceError, SpecRawTable};

    use super::*;

    struct MemoryExecutor {
        dict_tables: BTreeMap<&'static str, SpecRawTable>,
    }

    impl QueryExecutor for MemoryExecutor {
        fn fetch_table(&mut self, sql: &str) -> Result<SpecRawTable, SourceError> {
            self.dict_tables
                .get(sql)
                .cloned()
                .ok_or_else(|| SourceError::Query(format!("no table for {sql}")))
        }
    }

    fn create_table(
        query: &SpecQuery,
        kinds: Vec<EnumSqlKind>,
        rows: Vec<Vec<EnumSqlValue>>,
    ) -> (&'static str, SpecRawTable) {
        (
            query.sql,
            SpecRawTable {
                columns: query.columns.iter().map(ToString::to_string).collect(),
                kinds,
                rows,
            },
        )
    }

    #[test]
    fn test_fetch_dashboard_data_reads_all_sections() {
        let mut executor = MemoryExecutor {
            dict_tables: BTreeMap::from([
                create_table(
                    &Q_TOTAL_VENDAS,
                    vec![EnumSqlKind::Integer],
                    vec![vec![EnumSqlValue::Integer(1500)]],
                ),
                create_table(
                    &Q_VALOR_VENDAS,
                    vec![EnumSqlKind::Float],
                    vec![vec![EnumSqlValue::Float(1234.5)]],
                ),
                create_table(
                    &Q_CUSTO_MANUTENCAO,
                    vec![EnumSqlKind::Float],
                    vec![vec![EnumSqlValue::Null]],
                ),
                create_table(
                    &Q_TOP3_TURNOS,
                    vec![EnumSqlKind::Text, EnumSqlKind::Integer, EnumSqlKind::Float],
                    vec![vec![
                        EnumSqlValue::Text("ManhÃ£".to_string()),
                        EnumSqlValue::Integer(40),
                        EnumSqlValue::Float(15_000.0),
                    ]],
                ),
                create_table(
                    &Q_TOP3_PAGAMENTOS,
                    vec![EnumSqlKind::Text, EnumSqlKind::Integer, EnumSqlKind::Float],
                    vec![vec![
                        EnumSqlValue::Text("Pix".to_string()),
                        EnumSqlValue::Integer(1200),
                        EnumSqlValue::Float(80_000.0),
                    ]],
                ),
                create_table(
                    &Q_MANUTENCAO_CARA,
                    vec![EnumSqlKind::Text, EnumSqlKind::Float, EnumSqlKind::Float],
                    vec![],
                ),
            ]),
        };

        let data = fetch_dashboard_data(&mut executor, "19/10/2026 08:30:00");

        assert_eq!(data.generated_at, "19/10/2026 08:30:00");
        assert_eq!(data.totals.cnt_sales, Some(1500));
        assert_eq!(data.totals.cnt_customers, None);
        assert_eq!(data.totals.amount_sales, Some(1234.5));
        assert_eq!(data.totals.amount_maintenance, Some(0.0));
        assert_eq!(data.top_shifts.len(), 1);
        assert_eq!(data.top_shifts[0].label, "Manhã");
        assert_eq!(data.chart_shifts, data.top_shifts);
        assert_eq!(data.top_payment_methods[0].cnt_sales, 1200);
        assert!(data.top_customers.is_empty());
        assert!(data.costliest_maintenance.is_none());
    }

    #[test]
    fn test_fetch_dashboard_data_survives_total_failure() {
        let mut executor = MemoryExecutor {
            dict_tables: BTreeMap::new(),
        };

        let data = fetch_dashboard_data(&mut executor, "now");

        assert_eq!(data.totals, SpecDashboardTotals::default());
        assert!(data.chart_customers.is_empty());
        assert!(data.costliest_maintenance.is_none());
    }
}
