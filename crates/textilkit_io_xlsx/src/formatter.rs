//! Sheet formatting over the assembled workbook model.
//!
//! Formatting only touches formats, merges, widths, filters, panes and charts.
//! Cell values stay as the assembler wrote them.

use crate::conf::{
    N_ROW_DATASET_BODY, N_ROW_DATASET_HEADER, N_ROW_DATASET_TITLE, N_ROWS_AUTOFIT_SAMPLE,
    N_WIDTH_AUTOFIT_MAX, N_WIDTH_AUTOFIT_PADDING, SpecReportFormats,
};
use crate::layout::{
    EnumCaptionStyle, EnumDashboardSection, L_DASHBOARD_COLUMN_WIDTHS, L_DASHBOARD_SECTIONS,
    SpecDashboardChartPlan, derive_caption_cells, derive_chart_value_range,
    derive_dashboard_chart_plans, derive_label_columns,
};
use crate::spec::{
    EnumSheetKind, SpecAnchor, SpecCellRange, SpecPieChart, SpecSheet, SpecSheetHorizontalMerge,
    SpecWorkbook, SpecXlsxReport,
};
use crate::util::{
    derive_rendered_text, estimate_unicode_string_width, parse_cell_ref_a1, parse_cell_range,
};

/// Format every sheet of `workbook`. Failures stay local to their sheet and land in `report`.
pub fn format_workbook(
    workbook: &mut SpecWorkbook,
    formats: &SpecReportFormats,
    report: &mut SpecXlsxReport,
) {
    let l_plans = derive_dashboard_chart_plans();
    for sheet in &mut workbook.sheets {
        let result = match sheet.kind {
            EnumSheetKind::Dashboard => format_dashboard_sheet(sheet, formats, &l_plans, report),
            EnumSheetKind::Dataset => format_dataset_sheet(sheet, formats),
        };
        match result {
            Ok(()) => tracing::debug!(sheet = %sheet.name, "sheet formatted"),
            Err(err) => {
                tracing::warn!(sheet = %sheet.name, "formatting failed: {err}");
                report.warn(format!("sheet {}: formatting failed: {err}", sheet.name));
            }
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region DatasetSheets

/// Banner, header style, autofilter, auto-sized widths and frozen header for a dataset sheet.
pub fn format_dataset_sheet(
    sheet: &mut SpecSheet,
    formats: &SpecReportFormats,
) -> Result<(), String> {
    let n_cols = sheet.width_used();
    let n_rows = sheet.height_used();
    if n_cols == 0 || n_rows <= N_ROW_DATASET_HEADER {
        return Err("sheet has no header row".to_string());
    }

    apply_banner(sheet, n_cols, formats);

    for n_idx_col in 0..n_cols {
        sheet.patch_format(N_ROW_DATASET_HEADER, n_idx_col, &formats.header);
    }

    sheet.autofilter = Some(SpecCellRange {
        row_first: N_ROW_DATASET_HEADER,
        col_first: 0,
        row_last: n_rows - 1,
        col_last: n_cols - 1,
    });

    for n_idx_col in 0..n_cols {
        let n_width = calculate_autofit_width(sheet, n_idx_col);
        sheet.col_widths.insert(n_idx_col, n_width as f64);
    }

    sheet.freeze = Some(SpecAnchor::new(N_ROW_DATASET_BODY, 0));
    Ok(())
}

fn apply_banner(sheet: &mut SpecSheet, n_cols: usize, formats: &SpecReportFormats) {
    let c_title = sheet
        .value(N_ROW_DATASET_TITLE, 0)
        .map(derive_rendered_text)
        .unwrap_or_default();
    sheet.patch_format(N_ROW_DATASET_TITLE, 0, &formats.banner);

    if n_cols > 1 {
        sheet.merges.push(SpecSheetHorizontalMerge {
            row_idx_start: N_ROW_DATASET_TITLE,
            col_idx_start: 0,
            col_idx_end: n_cols - 1,
            text: c_title,
        });
    }
}

/// Width for one column: longest rendered value among the first sheet rows, padded, capped.
///
/// Cells under a merge (the banner) do not count toward the width.
pub fn calculate_autofit_width(sheet: &SpecSheet, col: usize) -> usize {
    let n_len_max = (0..N_ROWS_AUTOFIT_SAMPLE)
        .filter(|&n_row| {
            !sheet.merges.iter().any(|merge| {
                merge.row_idx_start == n_row
                    && merge.col_idx_start <= col
                    && col <= merge.col_idx_end
            })
        })
        .filter_map(|n_row| sheet.value(n_row, col))
        .map(|value| estimate_unicode_string_width(&derive_rendered_text(value)))
        .max()
        .unwrap_or(0);
    (n_len_max + N_WIDTH_AUTOFIT_PADDING).min(N_WIDTH_AUTOFIT_MAX)
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DashboardSheet

fn format_dashboard_sheet(
    sheet: &mut SpecSheet,
    formats: &SpecReportFormats,
    l_plans: &[SpecDashboardChartPlan],
    report: &mut SpecXlsxReport,
) -> Result<(), String> {
    for (n_col, n_width) in L_DASHBOARD_COLUMN_WIDTHS {
        sheet.col_widths.insert(n_col, n_width);
    }

    let l_label_cols = derive_label_columns();
    let l_label_cells: Vec<(usize, usize)> = sheet
        .cells
        .keys()
        .copied()
        .filter(|(_, n_col)| l_label_cols.contains(n_col))
        .collect();
    for (n_row, n_col) in l_label_cells {
        sheet.patch_format(n_row, n_col, &formats.label);
    }

    for section in L_DASHBOARD_SECTIONS {
        let anchor = section.anchor();
        for n_idx in 0..section.headers().len() {
            sheet.patch_format(anchor.row, anchor.col + n_idx, &formats.header_plain);
        }
    }

    for (anchor, style) in derive_caption_cells() {
        let fmt = match style {
            EnumCaptionStyle::Section => &formats.section,
            EnumCaptionStyle::Ranking => &formats.caption_top,
        };
        sheet.patch_format(anchor.row, anchor.col, fmt);
    }

    for (section, fmt) in [
        (EnumDashboardSection::ChartCustomers, &formats.currency),
        (EnumDashboardSection::ChartPaymentMethods, &formats.currency),
        (EnumDashboardSection::ChartShifts, &formats.count),
    ] {
        let range = derive_chart_value_range(section);
        for n_row in range.row_first..=range.row_last {
            sheet.patch_format(n_row, range.col_first, fmt);
        }
    }

    for plan in l_plans {
        match create_pie_chart(plan) {
            Ok(chart) => sheet.charts.push(chart),
            Err(err) => {
                tracing::warn!(chart = %plan.title, "chart skipped: {err}");
                report.warn(format!("chart {}: {err}", plan.title));
            }
        }
    }
    Ok(())
}

/// Resolve a chart plan's A1 references into a chart bound to cell ranges.
pub fn create_pie_chart(plan: &SpecDashboardChartPlan) -> Result<SpecPieChart, String> {
    Ok(SpecPieChart {
        title: plan.title.clone(),
        style: plan.style,
        cell_series_name: parse_cell_ref_a1(&plan.ref_series_name)?,
        range_categories: parse_cell_range(&plan.ref_categories)?,
        range_values: parse_cell_range(&plan.ref_values)?,
        anchor: parse_cell_ref_a1(&plan.ref_anchor)?,
        width_px: plan.width_px,
        height_px: plan.height_px,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use polars::prelude::{Column, DataFrame};

    use super::*;
    use crate::assembler::{write_dashboard, write_dataset};
    use crate::conf::C_NUM_FORMAT_CURRENCY;
    use crate::spec::{EnumCellValue, SpecDashboardData, SpecRankedAmount};

    fn create_dataset_workbook() -> SpecWorkbook {
        let df = DataFrame::new(vec![
            Column::new(
                "Cliente".into(),
                vec![Some("Malharia Sul".to_string()), Some("Ana".to_string())],
            ),
            Column::new("Valor Total (R$)".into(), vec![Some(5000.0f64), Some(12.5)]),
        ])
        .expect("frame");
        let mut workbook = SpecWorkbook::default();
        write_dataset(&mut workbook, "top_clientes", &df).expect("write");
        workbook
    }

    #[test]
    fn test_format_dataset_sheet_applies_banner_header_filter_and_panes() {
        let mut workbook = create_dataset_workbook();
        let sheet_before = workbook.sheets[0].clone();
        let formats = SpecReportFormats::default();

        let sheet = &mut workbook.sheets[0];
        format_dataset_sheet(sheet, &formats).expect("format");

        assert_eq!(
            sheet.merges,
            vec![SpecSheetHorizontalMerge {
                row_idx_start: 0,
                col_idx_start: 0,
                col_idx_end: 1,
                text: "📊 Top Clientes".to_string(),
            }]
        );
        assert_eq!(sheet.format(0, 0), Some(&formats.banner));
        assert_eq!(sheet.format(2, 1), Some(&formats.header));
        assert_eq!(
            sheet.autofilter,
            Some(SpecCellRange {
                row_first: 2,
                col_first: 0,
                row_last: 4,
                col_last: 1
            })
        );
        assert_eq!(sheet.freeze, Some(SpecAnchor::new(3, 0)));

        for (key, cell) in &sheet_before.cells {
            assert_eq!(sheet.cells.get(key).map(|c| &c.value), Some(&cell.value));
        }
    }

    #[test]
    fn test_calculate_autofit_width_pads_and_caps() {
        let mut sheet = SpecSheet::new("S", EnumSheetKind::Dataset);
        sheet.write_string(2, 0, "Cor");
        sheet.write_string(3, 0, "Azul");
        sheet.write_string(2, 1, "x".repeat(80));
        sheet.write_number(3, 2, 1500.25);

        assert_eq!(calculate_autofit_width(&sheet, 0), 6);
        assert_eq!(calculate_autofit_width(&sheet, 1), N_WIDTH_AUTOFIT_MAX);
        assert_eq!(calculate_autofit_width(&sheet, 2), 9);
    }

    #[test]
    fn test_calculate_autofit_width_ignores_rows_past_sample() {
        let mut sheet = SpecSheet::new("S", EnumSheetKind::Dataset);
        sheet.write_string(2, 0, "Id");
        sheet.write_string(N_ROWS_AUTOFIT_SAMPLE, 0, "x".repeat(30));

        assert_eq!(calculate_autofit_width(&sheet, 0), 4);
    }

    #[test]
    fn test_calculate_autofit_width_skips_merged_banner_only() {
        let mut sheet = SpecSheet::new("S", EnumSheetKind::Dataset);
        sheet.write_string(0, 0, "📊 Vendas Por Forma Pagamento");
        sheet.write_string(2, 0, "Forma");
        sheet.write_string(2, 1, "Qtd");
        sheet.merges.push(SpecSheetHorizontalMerge {
            row_idx_start: 0,
            col_idx_start: 0,
            col_idx_end: 1,
            text: "📊 Vendas Por Forma Pagamento".to_string(),
        });
        assert_eq!(calculate_autofit_width(&sheet, 0), 7);

        sheet.merges.clear();
        assert!(calculate_autofit_width(&sheet, 0) > 20);
    }

    #[test]
    fn test_format_workbook_styles_dashboard_and_adds_charts() {
        let mut workbook = SpecWorkbook::default();
        let mut report = SpecXlsxReport::default();
        let data = SpecDashboardData {
            chart_customers: vec![SpecRankedAmount {
                label: "Malharia Sul".to_string(),
                amount: 5000.0,
            }],
            ..Default::default()
        };
        write_dashboard(&mut workbook, &data, &mut report);

        let formats = SpecReportFormats::default();
        format_workbook(&mut workbook, &formats, &mut report);

        let sheet = workbook.sheet("Dashboard").expect("dashboard");
        assert!(report.warnings.is_empty());
        assert_eq!(sheet.col_widths.get(&0), Some(&30.0));
        assert_eq!(sheet.col_widths.get(&12), Some(&25.0));
        assert_eq!(sheet.charts.len(), 3);
        assert_eq!(sheet.charts[0].anchor, SpecAnchor::new(17, 0));
        assert_eq!(sheet.charts[2].style, 12);

        assert_eq!(
            sheet.format(51, 1).and_then(|fmt| fmt.num_format.as_deref()),
            Some(C_NUM_FORMAT_CURRENCY)
        );
        assert_eq!(
            sheet.format(2, 4).and_then(|fmt| fmt.bg_color.as_deref()),
            formats.caption_top.bg_color.as_deref()
        );
        assert_eq!(
            sheet.format(3, 0).and_then(|fmt| fmt.bg_color.as_deref()),
            formats.section.bg_color.as_deref()
        );
        assert_eq!(sheet.format(5, 0).and_then(|fmt| fmt.bold), Some(true));
        assert!(sheet.freeze.is_none());
    }

    #[test]
    fn test_malformed_chart_range_only_drops_that_chart() {
        let mut workbook = SpecWorkbook::default();
        let mut report = SpecXlsxReport::default();
        write_dashboard(&mut workbook, &SpecDashboardData::default(), &mut report);
        let cells_before = workbook.sheets[0].cells.clone();

        let mut l_plans = derive_dashboard_chart_plans();
        l_plans[1].ref_values = "F56:F52".to_string();

        let sheet = &mut workbook.sheets[0];
        format_dashboard_sheet(sheet, &SpecReportFormats::default(), &l_plans, &mut report)
            .expect("format");

        assert_eq!(sheet.charts.len(), 2);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("Formas de Pagamento"));
        assert_eq!(sheet.cells.len(), cells_before.len());
        assert_eq!(
            sheet.value(0, 0),
            Some(&EnumCellValue::text("Indicador"))
        );
    }
}
