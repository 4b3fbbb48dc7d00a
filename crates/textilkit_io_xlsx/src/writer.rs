//! XLSX rendering of a formatted [`SpecWorkbook`], saved once on close.

use std::collections::BTreeSet;
use std::path::PathBuf;

use rust_xlsxwriter::{
    Chart, ChartDataLabel, ChartType, Format, FormatAlign, FormatBorder, Workbook, Worksheet,
    XlsxError,
};

use crate::spec::{
    EnumCellValue, SpecCellFormat, SpecPieChart, SpecSheet, SpecWorkbook, SpecXlsxReport,
};

/// Workbook writer bound to one output path.
pub struct XlsxWriter {
    path_file_out: PathBuf,
    workbook: Workbook,
    report: SpecXlsxReport,
    if_closed: bool,
}

impl XlsxWriter {
    /// Create writer bound to output path.
    ///
    /// The workbook is buffered in memory until [`Self::close`] is called.
    pub fn new(path_file_out: PathBuf) -> Self {
        Self {
            path_file_out,
            workbook: Workbook::new(),
            report: SpecXlsxReport::default(),
            if_closed: false,
        }
    }

    /// Return output file path as string.
    pub fn file_out(&self) -> String {
        self.path_file_out.to_string_lossy().to_string()
    }

    /// Return snapshot of the write report.
    pub fn report(&self) -> SpecXlsxReport {
        self.report.clone()
    }

    /// Flush workbook to disk. Idempotent.
    pub fn close(&mut self) -> Result<(), String> {
        if self.if_closed {
            return Ok(());
        }
        self.workbook
            .save(&self.path_file_out)
            .map_err(derive_xlsx_error_text)?;
        self.if_closed = true;
        tracing::info!(path = %self.file_out(), "workbook saved");
        Ok(())
    }

    /// Render every sheet of `spec_workbook` in order.
    ///
    /// Cell write failures abort; merge, sheet-level and chart failures become warnings.
    pub fn write_workbook(&mut self, spec_workbook: &SpecWorkbook) -> Result<(), String> {
        if self.if_closed {
            return Err("writer already closed".to_string());
        }
        for sheet in &spec_workbook.sheets {
            self.write_sheet(sheet)?;
            self.report.sheets.push(sheet.name.clone());
        }
        Ok(())
    }

    fn write_sheet(&mut self, sheet: &SpecSheet) -> Result<(), String> {
        let worksheet = self.workbook.add_worksheet();
        worksheet
            .set_name(&sheet.name)
            .map_err(derive_xlsx_error_text)?;

        write_cells(worksheet, sheet)?;

        let mut l_warnings = write_merges(worksheet, sheet)?;
        if let Err(err) = apply_sheet_settings(worksheet, sheet) {
            l_warnings.push(format!("sheet {}: {err}", sheet.name));
        }
        for chart in &sheet.charts {
            if let Err(err) = insert_pie_chart(worksheet, &sheet.name, chart) {
                l_warnings.push(format!("chart {}: {err}", chart.title));
            }
        }

        for c_warning in l_warnings {
            tracing::warn!(sheet = %sheet.name, "{c_warning}");
            self.report.warn(c_warning);
        }
        Ok(())
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region SheetRendering

fn write_cells(worksheet: &mut Worksheet, sheet: &SpecSheet) -> Result<(), String> {
    let set_merged_cells = derive_horizontal_merge_tracker(sheet);
    let fmt_default = Format::new();

    for (&(row_idx, col_idx), cell) in &sheet.cells {
        if set_merged_cells.contains(&(row_idx, col_idx)) {
            continue;
        }
        match &cell.format {
            Some(spec) => write_cell_with_format(
                worksheet,
                row_idx,
                col_idx,
                &cell.value,
                &derive_rust_xlsx_format(spec),
            )?,
            None => write_cell_with_format(worksheet, row_idx, col_idx, &cell.value, &fmt_default)?,
        }
    }

    Ok(())
}

/// Write the horizontal merges. A merge Excel rejects becomes a warning and its
/// first cell is written unmerged so the text survives.
fn write_merges(worksheet: &mut Worksheet, sheet: &SpecSheet) -> Result<Vec<String>, String> {
    let mut l_warnings = Vec::new();
    for merge in &sheet.merges {
        let format = sheet
            .format(merge.row_idx_start, merge.col_idx_start)
            .map(derive_rust_xlsx_format)
            .unwrap_or_default();
        let result = worksheet
            .merge_range(
                cast_row_num(merge.row_idx_start)?,
                cast_col_num(merge.col_idx_start)?,
                cast_row_num(merge.row_idx_start)?,
                cast_col_num(merge.col_idx_end)?,
                &merge.text,
                &format,
            )
            .map(|_| ())
            .map_err(derive_xlsx_error_text);
        if let Err(err) = result {
            l_warnings.push(format!(
                "merge row {} cols {}..={}: {err}",
                merge.row_idx_start, merge.col_idx_start, merge.col_idx_end
            ));
            let value = sheet
                .cells
                .get(&(merge.row_idx_start, merge.col_idx_start))
                .map_or_else(
                    || EnumCellValue::text(merge.text.as_str()),
                    |cell| cell.value.clone(),
                );
            write_cell_with_format(
                worksheet,
                merge.row_idx_start,
                merge.col_idx_start,
                &value,
                &format,
            )?;
        }
    }
    Ok(l_warnings)
}

/// Every cell covered by a horizontal merge; those are written by the merge itself.
fn derive_horizontal_merge_tracker(sheet: &SpecSheet) -> BTreeSet<(usize, usize)> {
    sheet
        .merges
        .iter()
        .flat_map(|merge| {
            (merge.col_idx_start..=merge.col_idx_end).map(move |col| (merge.row_idx_start, col))
        })
        .collect()
}

fn apply_sheet_settings(worksheet: &mut Worksheet, sheet: &SpecSheet) -> Result<(), String> {
    for (&col_idx, &n_width) in &sheet.col_widths {
        worksheet
            .set_column_width(cast_col_num(col_idx)?, n_width)
            .map_err(derive_xlsx_error_text)?;
    }
    if let Some(range) = sheet.autofilter {
        worksheet
            .autofilter(
                cast_row_num(range.row_first)?,
                cast_col_num(range.col_first)?,
                cast_row_num(range.row_last)?,
                cast_col_num(range.col_last)?,
            )
            .map_err(derive_xlsx_error_text)?;
    }
    if let Some(anchor) = sheet.freeze {
        worksheet
            .set_freeze_panes(cast_row_num(anchor.row)?, cast_col_num(anchor.col)?)
            .map_err(derive_xlsx_error_text)?;
    }
    Ok(())
}

fn insert_pie_chart(
    worksheet: &mut Worksheet,
    sheet_name: &str,
    spec: &SpecPieChart,
) -> Result<(), String> {
    let mut chart = Chart::new(ChartType::Pie);
    chart
        .add_series()
        .set_name((
            sheet_name,
            cast_row_num(spec.cell_series_name.row)?,
            cast_col_num(spec.cell_series_name.col)?,
        ))
        .set_categories((
            sheet_name,
            cast_row_num(spec.range_categories.row_first)?,
            cast_col_num(spec.range_categories.col_first)?,
            cast_row_num(spec.range_categories.row_last)?,
            cast_col_num(spec.range_categories.col_last)?,
        ))
        .set_values((
            sheet_name,
            cast_row_num(spec.range_values.row_first)?,
            cast_col_num(spec.range_values.col_first)?,
            cast_row_num(spec.range_values.row_last)?,
            cast_col_num(spec.range_values.col_last)?,
        ))
        .set_data_label(ChartDataLabel::new().show_percentage());

    chart.title().set_name(spec.title.as_str());
    chart.legend().set_hidden();
    chart.set_style(spec.style);
    chart.set_width(spec.width_px);
    chart.set_height(spec.height_px);

    worksheet
        .insert_chart(
            cast_row_num(spec.anchor.row)?,
            cast_col_num(spec.anchor.col)?,
            &chart,
        )
        .map_err(derive_xlsx_error_text)?;
    Ok(())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatConversion

fn write_cell_with_format(
    worksheet: &mut Worksheet,
    row_idx: usize,
    col_idx: usize,
    value: &EnumCellValue,
    format: &Format,
) -> Result<(), String> {
    match value {
        EnumCellValue::None => {
            worksheet
                .write_blank(cast_row_num(row_idx)?, cast_col_num(col_idx)?, format)
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::String(val) => {
            worksheet
                .write_string_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
        EnumCellValue::Number(val) => {
            worksheet
                .write_number_with_format(
                    cast_row_num(row_idx)?,
                    cast_col_num(col_idx)?,
                    *val,
                    format,
                )
                .map_err(derive_xlsx_error_text)?;
        }
    }
    Ok(())
}

fn derive_rust_xlsx_format(spec: &SpecCellFormat) -> Format {
    let mut format = Format::new();

    if let Some(val) = spec.font_size {
        format = format.set_font_size(val as f64);
    }
    if spec.bold.unwrap_or(false) {
        format = format.set_bold();
    }

    if let Some(val) = &spec.align
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }
    if let Some(val) = &spec.valign
        && let Some(align) = derive_format_align(val)
    {
        format = format.set_align(align);
    }

    if let Some(val) = &spec.num_format {
        format = format.set_num_format(val.clone());
    }
    if let Some(val) = &spec.bg_color {
        format = format.set_background_color(val.as_str());
    }
    if let Some(val) = &spec.font_color {
        format = format.set_font_color(val.as_str());
    }
    if let Some(val) = spec.border {
        format = format.set_border(derive_format_border(val));
    }

    format
}

fn derive_format_border(border: i64) -> FormatBorder {
    match border {
        1 => FormatBorder::Thin,
        2 => FormatBorder::Medium,
        3 => FormatBorder::Dashed,
        4 => FormatBorder::Dotted,
        5 => FormatBorder::Thick,
        6 => FormatBorder::Double,
        7 => FormatBorder::Hair,
        _ => FormatBorder::None,
    }
}

fn derive_format_align(align: &str) -> Option<FormatAlign> {
    match align.trim().to_ascii_lowercase().as_str() {
        "general" => Some(FormatAlign::General),
        "left" => Some(FormatAlign::Left),
        "center" => Some(FormatAlign::Center),
        "right" => Some(FormatAlign::Right),
        "top" => Some(FormatAlign::Top),
        "bottom" => Some(FormatAlign::Bottom),
        "vcenter" | "vertical_center" => Some(FormatAlign::VerticalCenter),
        _ => None,
    }
}

fn cast_row_num(value: usize) -> Result<u32, String> {
    u32::try_from(value).map_err(|_| format!("row index overflow: {value}"))
}

fn cast_col_num(value: usize) -> Result<u16, String> {
    u16::try_from(value).map_err(|_| format!("column index overflow: {value}"))
}

fn derive_xlsx_error_text(err: XlsxError) -> String {
    format!("xlsx write error: {err}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use calamine::{Data, Reader, Xlsx, open_workbook};
    use polars::prelude::{Column, DataFrame};

    use super::*;
    use crate::assembler::assemble_workbook;
    use crate::conf::SpecReportFormats;
    use crate::formatter::format_workbook;
    use crate::spec::{EnumSheetKind, SpecDashboardData, SpecRankedAmount};

    #[test]
    fn test_write_workbook_round_trips_through_calamine() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let path_out = dir_tmp.path().join("relatorio_textil_20261019_083000.xlsx");

        let df = DataFrame::new(vec![
            Column::new("Tipo de Manutenção".into(), vec![Some("Corretiva".to_string())]),
            Column::new("Custo Total (R$)".into(), vec![Some(7000.0f64)]),
        ])
        .expect("frame");
        let data = SpecDashboardData {
            chart_customers: vec![SpecRankedAmount {
                label: "Malharia Sul".to_string(),
                amount: 5000.0,
            }],
            ..Default::default()
        };

        let mut report = SpecXlsxReport::default();
        let mut spec_workbook =
            assemble_workbook(&data, vec![("manutencao_por_tipo", &df)], &mut report);
        format_workbook(&mut spec_workbook, &SpecReportFormats::default(), &mut report);

        let mut writer = XlsxWriter::new(path_out.clone());
        writer.write_workbook(&spec_workbook).expect("write");
        writer.close().expect("save");
        writer.close().expect("second close is a no-op");
        assert!(writer.report().warnings.is_empty());

        let mut workbook: Xlsx<_> = open_workbook(&path_out).expect("open");
        assert_eq!(
            workbook.sheet_names(),
            vec!["Dashboard".to_string(), "Manutencao Por Tipo".to_string()]
        );

        let range = workbook
            .worksheet_range("Manutencao Por Tipo")
            .expect("dataset sheet");
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("📊 Manutencao Por Tipo".to_string()))
        );
        assert_eq!(
            range.get_value((2, 0)),
            Some(&Data::String("Tipo de Manutenção".to_string()))
        );
        assert_eq!(range.get_value((3, 1)), Some(&Data::Float(7000.0)));

        let range = workbook.worksheet_range("Dashboard").expect("dashboard");
        assert_eq!(
            range.get_value((51, 0)),
            Some(&Data::String("Malharia Sul".to_string()))
        );
        assert_eq!(range.get_value((51, 1)), Some(&Data::Float(5000.0)));
    }

    #[test]
    fn test_merged_banner_skips_covered_cells() {
        let mut sheet = SpecSheet::new("S", EnumSheetKind::Dataset);
        sheet.write_string(0, 0, "📊 S");
        sheet.merges.push(crate::spec::SpecSheetHorizontalMerge {
            row_idx_start: 0,
            col_idx_start: 0,
            col_idx_end: 2,
            text: "📊 S".to_string(),
        });

        let set_cells = derive_horizontal_merge_tracker(&sheet);
        assert_eq!(set_cells.len(), 3);
        assert!(set_cells.contains(&(0, 2)));
        assert!(!set_cells.contains(&(1, 0)));
    }

    #[test]
    fn test_rejected_merge_keeps_banner_text_and_saves() {
        let dir_tmp = tempfile::tempdir().expect("tempdir");
        let path_out = dir_tmp.path().join("merge.xlsx");

        let mut sheet = SpecSheet::new("Estoque Atual", EnumSheetKind::Dataset);
        sheet.write_string(0, 0, "📊 Estoque Atual");
        sheet.write_string(3, 0, "Agulhas");
        // Excel refuses a merge spanning a single cell.
        sheet.merges.push(crate::spec::SpecSheetHorizontalMerge {
            row_idx_start: 0,
            col_idx_start: 0,
            col_idx_end: 0,
            text: "📊 Estoque Atual".to_string(),
        });
        let spec_workbook = SpecWorkbook {
            sheets: vec![sheet],
        };

        let mut writer = XlsxWriter::new(path_out.clone());
        writer.write_workbook(&spec_workbook).expect("write");
        writer.close().expect("save");
        let report = writer.report();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("merge row 0"));

        let mut workbook: Xlsx<_> = open_workbook(&path_out).expect("open");
        let range = workbook.worksheet_range("Estoque Atual").expect("sheet");
        assert_eq!(
            range.get_value((0, 0)),
            Some(&Data::String("📊 Estoque Atual".to_string()))
        );
        assert_eq!(
            range.get_value((3, 0)),
            Some(&Data::String("Agulhas".to_string()))
        );
    }

    #[test]
    fn test_derive_format_align_maps_known_names() {
        assert_eq!(derive_format_align(" Center "), Some(FormatAlign::Center));
        assert_eq!(derive_format_align("vcenter"), Some(FormatAlign::VerticalCenter));
        assert_eq!(derive_format_align("sideways"), None);
    }
}
