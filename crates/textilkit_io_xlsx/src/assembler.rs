//! Report assembly: dataset sheets and the dashboard sheet, written into a [`SpecWorkbook`].

use polars::prelude::{AnyValue, DataFrame};

use crate::conf::{
    C_DASHBOARD_SHEET_NAME, C_TITLE_CAPTION_PREFIX, C_VALUE_MISSING, N_ROW_DATASET_BODY,
    N_ROW_DATASET_HEADER, N_ROW_DATASET_TITLE,
};
use crate::layout::{
    C_CAPTION_SUMMARY_FINANCE, C_CAPTION_SUMMARY_TOTALS, EnumDashboardSection,
    N_OFFSET_CHART_FIRST_ROW, N_OFFSET_MAINTENANCE_CAPTION, N_OFFSET_MAINTENANCE_FIRST_DETAIL,
    N_OFFSET_SUMMARY_CAPTION_FINANCE, N_OFFSET_SUMMARY_CAPTION_TOTALS,
    N_OFFSET_SUMMARY_FIRST_AMOUNT, N_OFFSET_SUMMARY_FIRST_TOTAL, N_OFFSET_SUMMARY_GENERATED,
    N_OFFSET_TOP_CAPTION, N_OFFSET_TOP_FIRST_ENTRY,
};
use crate::spec::{
    EnumCellValue, EnumSheetKind, SpecAnchor, SpecDashboardData, SpecSheet, SpecWorkbook,
    SpecXlsxReport,
};
use crate::util::{
    derive_sheet_name, format_count, format_currency, format_rank_label,
};

/// Assemble the whole workbook: dashboard first, then each non-empty dataset in input order.
pub fn assemble_workbook<'a, I>(
    dashboard: &SpecDashboardData,
    datasets: I,
    report: &mut SpecXlsxReport,
) -> SpecWorkbook
where
    I: IntoIterator<Item = (&'a str, &'a DataFrame)>,
{
    let mut workbook = SpecWorkbook::default();
    write_dashboard(&mut workbook, dashboard, report);

    for (name, df_data) in datasets {
        match write_dataset(&mut workbook, name, df_data) {
            Ok(Some(sheet_name)) => {
                tracing::debug!(dataset = name, sheet = %sheet_name, "dataset sheet assembled");
            }
            Ok(None) => {
                tracing::info!(dataset = name, "dataset is empty, no sheet written");
            }
            Err(err) => {
                tracing::warn!(dataset = name, "dataset sheet skipped: {err}");
                report.warn(format!("dataset {name}: {err}"));
            }
        }
    }

    report.sheets = workbook
        .sheet_names()
        .into_iter()
        .map(ToString::to_string)
        .collect();
    workbook
}

////////////////////////////////////////////////////////////////////////////////
// #region DatasetSheets

/// Write one dataset as its own sheet: title caption, blank row, header row, body rows.
///
/// Returns the sheet name, or `None` when the frame has no rows.
pub fn write_dataset(
    workbook: &mut SpecWorkbook,
    name: &str,
    df_data: &DataFrame,
) -> Result<Option<String>, String> {
    if df_data.height() == 0 {
        return Ok(None);
    }

    let c_sheet_name = derive_sheet_name(name);
    let mut sheet = SpecSheet::new(c_sheet_name.clone(), EnumSheetKind::Dataset);

    sheet.write_string(
        N_ROW_DATASET_TITLE,
        0,
        format!("{C_TITLE_CAPTION_PREFIX} {c_sheet_name}"),
    );

    for (n_idx_col, c_label) in df_data.get_column_names_str().into_iter().enumerate() {
        sheet.write_string(N_ROW_DATASET_HEADER, n_idx_col, c_label);
    }

    for (n_idx_col, col) in df_data.get_columns().iter().enumerate() {
        for n_idx_row in 0..df_data.height() {
            let value = col
                .get(n_idx_row)
                .map_err(|err| format!("Failed to access cell value: {err}"))?;
            sheet.write_value(
                N_ROW_DATASET_BODY + n_idx_row,
                n_idx_col,
                derive_cell_value_from_any_value(value),
            );
        }
    }

    workbook.add_sheet(sheet)?;
    Ok(Some(c_sheet_name))
}

fn derive_cell_value_from_any_value(value: AnyValue<'_>) -> EnumCellValue {
    let n_value = match value {
        AnyValue::Null => return EnumCellValue::None,
        AnyValue::String(val) => return EnumCellValue::String(val.to_string()),
        AnyValue::StringOwned(val) => return EnumCellValue::String(val.to_string()),
        AnyValue::Boolean(val) => {
            return EnumCellValue::String(if val { "True" } else { "False" }.to_string());
        }
        AnyValue::UInt8(val) => val as f64,
        AnyValue::UInt16(val) => val as f64,
        AnyValue::UInt32(val) => val as f64,
        AnyValue::UInt64(val) => val as f64,
        AnyValue::Int8(val) => val as f64,
        AnyValue::Int16(val) => val as f64,
        AnyValue::Int32(val) => val as f64,
        AnyValue::Int64(val) => val as f64,
        AnyValue::Int128(val) => val as f64,
        AnyValue::Float32(val) => val as f64,
        AnyValue::Float64(val) => val,
        _ => return EnumCellValue::String(value.to_string()),
    };
    if n_value.is_finite() {
        EnumCellValue::Number(n_value)
    } else {
        EnumCellValue::None
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DashboardSheet

/// Write the dashboard sheet. Always creates the sheet; absent inputs render as missing.
pub fn write_dashboard(
    workbook: &mut SpecWorkbook,
    dashboard: &SpecDashboardData,
    report: &mut SpecXlsxReport,
) {
    let mut sheet = SpecSheet::new(C_DASHBOARD_SHEET_NAME, EnumSheetKind::Dashboard);

    write_summary(&mut sheet, dashboard);
    write_top_customers(&mut sheet, dashboard);
    write_top_payment_methods(&mut sheet, dashboard);
    write_top_shifts(&mut sheet, dashboard);
    write_costliest_maintenance(&mut sheet, dashboard);
    write_chart_sources(&mut sheet, dashboard);

    if let Err(err) = workbook.add_sheet(sheet) {
        tracing::warn!("dashboard sheet not added: {err}");
        report.warn(format!("dashboard: {err}"));
    }
}

fn write_section_headers(sheet: &mut SpecSheet, section: EnumDashboardSection) -> SpecAnchor {
    let anchor = section.anchor();
    for (n_idx, c_label) in section.headers().iter().enumerate() {
        sheet.write_string(anchor.row, anchor.col + n_idx, *c_label);
    }
    anchor
}

fn write_row(sheet: &mut SpecSheet, anchor: SpecAnchor, values: Vec<EnumCellValue>) {
    for (n_idx, value) in values.into_iter().enumerate() {
        sheet.write_value(anchor.row, anchor.col + n_idx, value);
    }
}

fn derive_count_text(value: Option<i64>, unit: &str) -> String {
    value.map_or_else(
        || C_VALUE_MISSING.to_string(),
        |val| format_count(val, unit),
    )
}

fn derive_currency_text(value: Option<f64>) -> String {
    value.map_or_else(|| C_VALUE_MISSING.to_string(), format_currency)
}

fn write_summary(sheet: &mut SpecSheet, dashboard: &SpecDashboardData) {
    let anchor = write_section_headers(sheet, EnumDashboardSection::Summary);
    let totals = &dashboard.totals;

    sheet.write_string(
        anchor.row + N_OFFSET_SUMMARY_GENERATED,
        anchor.col,
        format!("Gerado em: {}", dashboard.generated_at),
    );
    sheet.write_string(
        anchor.row + N_OFFSET_SUMMARY_CAPTION_TOTALS,
        anchor.col,
        C_CAPTION_SUMMARY_TOTALS,
    );

    let l_totals = [
        ("Total de Vendas", derive_count_text(totals.cnt_sales, "vendas")),
        (
            "Total de Produções",
            derive_count_text(totals.cnt_productions, "produções"),
        ),
        (
            "Total de Clientes",
            derive_count_text(totals.cnt_customers, "clientes"),
        ),
        (
            "Total de Funcionários",
            derive_count_text(totals.cnt_employees, "funcionários"),
        ),
        (
            "Total de Fornecedores",
            derive_count_text(totals.cnt_suppliers, "fornecedores"),
        ),
    ];
    for (n_idx, (c_label, c_value)) in l_totals.into_iter().enumerate() {
        write_row(
            sheet,
            anchor.offset(N_OFFSET_SUMMARY_FIRST_TOTAL + n_idx, 0),
            vec![EnumCellValue::text(c_label), EnumCellValue::String(c_value)],
        );
    }

    sheet.write_string(
        anchor.row + N_OFFSET_SUMMARY_CAPTION_FINANCE,
        anchor.col,
        C_CAPTION_SUMMARY_FINANCE,
    );
    let l_amounts = [
        ("Valor Total Vendas", derive_currency_text(totals.amount_sales)),
        (
            "Custo Total Manutenção",
            derive_currency_text(totals.amount_maintenance),
        ),
    ];
    for (n_idx, (c_label, c_value)) in l_amounts.into_iter().enumerate() {
        write_row(
            sheet,
            anchor.offset(N_OFFSET_SUMMARY_FIRST_AMOUNT + n_idx, 0),
            vec![EnumCellValue::text(c_label), EnumCellValue::String(c_value)],
        );
    }
}

fn write_ranked_caption(sheet: &mut SpecSheet, section: EnumDashboardSection) -> SpecAnchor {
    let anchor = write_section_headers(sheet, section);
    if let Some(c_caption) = section.caption() {
        sheet.write_string(anchor.row + N_OFFSET_TOP_CAPTION, anchor.col, c_caption);
    }
    anchor
}

fn write_top_customers(sheet: &mut SpecSheet, dashboard: &SpecDashboardData) {
    let section = EnumDashboardSection::TopCustomers;
    let anchor = write_ranked_caption(sheet, section);
    for (n_idx, item) in dashboard
        .top_customers
        .iter()
        .take(section.n_rows_max())
        .enumerate()
    {
        write_row(
            sheet,
            anchor.offset(N_OFFSET_TOP_FIRST_ENTRY + n_idx, 0),
            vec![
                EnumCellValue::String(format_rank_label(n_idx, &item.label)),
                EnumCellValue::String(format_currency(item.amount)),
            ],
        );
    }
}

fn write_top_payment_methods(sheet: &mut SpecSheet, dashboard: &SpecDashboardData) {
    let section = EnumDashboardSection::TopPaymentMethods;
    let anchor = write_ranked_caption(sheet, section);
    for (n_idx, item) in dashboard
        .top_payment_methods
        .iter()
        .take(section.n_rows_max())
        .enumerate()
    {
        write_row(
            sheet,
            anchor.offset(N_OFFSET_TOP_FIRST_ENTRY + n_idx, 0),
            vec![
                EnumCellValue::String(format_rank_label(n_idx, &item.label)),
                EnumCellValue::String(format_count(item.cnt_sales, "vendas")),
                EnumCellValue::String(format_currency(item.amount)),
            ],
        );
    }
}

fn write_top_shifts(sheet: &mut SpecSheet, dashboard: &SpecDashboardData) {
    let section = EnumDashboardSection::TopShifts;
    let anchor = write_ranked_caption(sheet, section);
    for (n_idx, item) in dashboard
        .top_shifts
        .iter()
        .take(section.n_rows_max())
        .enumerate()
    {
        write_row(
            sheet,
            anchor.offset(N_OFFSET_TOP_FIRST_ENTRY + n_idx, 0),
            vec![
                EnumCellValue::String(format_rank_label(n_idx, &item.label)),
                EnumCellValue::String(format_count(item.units.round() as i64, "unidades")),
            ],
        );
    }
}

fn write_costliest_maintenance(sheet: &mut SpecSheet, dashboard: &SpecDashboardData) {
    let section = EnumDashboardSection::CostliestMaintenance;
    let anchor = write_section_headers(sheet, section);
    if let Some(c_caption) = section.caption() {
        sheet.write_string(anchor.row + N_OFFSET_MAINTENANCE_CAPTION, anchor.col, c_caption);
    }

    let maintenance = dashboard.costliest_maintenance.as_ref();
    let l_details = [
        (
            "Tipo",
            maintenance.map_or_else(|| C_VALUE_MISSING.to_string(), |item| item.label.clone()),
        ),
        (
            "Custo Total",
            derive_currency_text(maintenance.map(|item| item.amount)),
        ),
        (
            "Tempo de Parada Total",
            derive_count_text(maintenance.map(|item| item.hours.round() as i64), "horas"),
        ),
    ];
    for (n_idx, (c_label, c_value)) in l_details.into_iter().enumerate() {
        write_row(
            sheet,
            anchor.offset(N_OFFSET_MAINTENANCE_FIRST_DETAIL + n_idx, 0),
            vec![EnumCellValue::text(c_label), EnumCellValue::String(c_value)],
        );
    }
}

fn write_chart_source<'a, I>(sheet: &mut SpecSheet, section: EnumDashboardSection, rows: I)
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let anchor = write_section_headers(sheet, section);
    for (n_idx, (c_label, n_value)) in rows.into_iter().take(section.n_rows_max()).enumerate() {
        write_row(
            sheet,
            anchor.offset(N_OFFSET_CHART_FIRST_ROW + n_idx, 0),
            vec![EnumCellValue::text(c_label), EnumCellValue::Number(n_value)],
        );
    }
}

fn write_chart_sources(sheet: &mut SpecSheet, dashboard: &SpecDashboardData) {
    write_chart_source(
        sheet,
        EnumDashboardSection::ChartCustomers,
        dashboard
            .chart_customers
            .iter()
            .map(|item| (item.label.as_str(), item.amount)),
    );
    write_chart_source(
        sheet,
        EnumDashboardSection::ChartPaymentMethods,
        dashboard
            .chart_payment_methods
            .iter()
            .map(|item| (item.label.as_str(), item.amount)),
    );
    write_chart_source(
        sheet,
        EnumDashboardSection::ChartShifts,
        dashboard
            .chart_shifts
            .iter()
            .map(|item| (item.label.as_str(), item.units)),
    );
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
