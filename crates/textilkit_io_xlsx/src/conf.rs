//! XLSX constants and default format presets.

use crate::spec::SpecCellFormat;

/// Excel worksheet maximum row count.
pub const N_NROWS_EXCEL_MAX: usize = 1_048_576;
/// Excel worksheet maximum column count.
pub const N_NCOLS_EXCEL_MAX: usize = 16_384;
/// Excel sheet name maximum length.
pub const N_LEN_EXCEL_SHEET_NAME_MAX: usize = 31;
/// Characters not allowed in sheet names.
pub const TUP_EXCEL_ILLEGAL: [&str; 7] = ["*", ":", "?", "/", "\\", "[", "]"];

/// Fixed name of the synthetic summary sheet. Always the first sheet.
pub const C_DASHBOARD_SHEET_NAME: &str = "Dashboard";
/// Output workbook file name prefix.
pub const C_REPORT_FILE_PREFIX: &str = "relatorio_textil";
/// Output workbook file extension.
pub const C_REPORT_FILE_EXTENSION: &str = "xlsx";
/// Prefix of the one-row title caption on dataset sheets.
pub const C_TITLE_CAPTION_PREFIX: &str = "📊";

/// Dataset sheet row holding the title caption.
pub const N_ROW_DATASET_TITLE: usize = 0;
/// Dataset sheet row holding the column labels (one blank row after the title).
pub const N_ROW_DATASET_HEADER: usize = 2;
/// First dataset sheet row holding data.
pub const N_ROW_DATASET_BODY: usize = N_ROW_DATASET_HEADER + 1;

/// Rows inspected when auto-sizing dataset columns.
pub const N_ROWS_AUTOFIT_SAMPLE: usize = 100;
/// Width padding added to the longest rendered value.
pub const N_WIDTH_AUTOFIT_PADDING: usize = 2;
/// Width ceiling for auto-sized columns.
pub const N_WIDTH_AUTOFIT_MAX: usize = 50;

/// Currency display prefix used by text renderings and number formats.
pub const C_CURRENCY_PREFIX: &str = "R$";
/// Currency number format for numeric cells.
pub const C_NUM_FORMAT_CURRENCY: &str = "\"R$ \"#,##0.00";
/// Thousands-separated count number format.
pub const C_NUM_FORMAT_COUNT: &str = "#,##0";
/// Text used where a dashboard value could not be computed.
pub const C_VALUE_MISSING: &str = "N/A";

/// Header fill color.
pub const C_COLOR_HEADER_FILL: &str = "#00B2A4";
/// Header font color.
pub const C_COLOR_HEADER_FONT: &str = "#FFFFFF";
/// Banner title fill color.
pub const C_COLOR_TITLE_FILL: &str = "#E8E8E8";
/// Dashboard section caption fill color.
pub const C_COLOR_SECTION_FILL: &str = "#D3D3D3";

/// Named style presets applied by [`crate::formatter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecReportFormats {
    /// Merged title row on dataset sheets.
    pub banner: SpecCellFormat,
    /// Column label row on dataset sheets.
    pub header: SpecCellFormat,
    /// Column label row of dashboard sub-tables.
    pub header_plain: SpecCellFormat,
    /// Dashboard section captions (summary, finance, maintenance).
    pub section: SpecCellFormat,
    /// Dashboard ranking captions (top-N blocks).
    pub caption_top: SpecCellFormat,
    /// Dashboard label columns.
    pub label: SpecCellFormat,
    /// Currency number cells.
    pub currency: SpecCellFormat,
    /// Count number cells.
    pub count: SpecCellFormat,
}

impl Default for SpecReportFormats {
    fn default() -> Self {
        derive_default_report_formats()
    }
}

/// Build default style presets.
pub fn derive_default_report_formats() -> SpecReportFormats {
    let cfg_center = SpecCellFormat {
        align: Some("center".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };
    let cfg_left = SpecCellFormat {
        align: Some("left".to_string()),
        valign: Some("vcenter".to_string()),
        ..Default::default()
    };

    SpecReportFormats {
        banner: cfg_center.with_(SpecCellFormat {
            bold: Some(true),
            font_size: Some(14),
            bg_color: Some(C_COLOR_TITLE_FILL.to_string()),
            ..Default::default()
        }),
        header: cfg_center.with_(SpecCellFormat {
            bold: Some(true),
            font_size: Some(12),
            font_color: Some(C_COLOR_HEADER_FONT.to_string()),
            bg_color: Some(C_COLOR_HEADER_FILL.to_string()),
            border: Some(1),
            ..Default::default()
        }),
        header_plain: cfg_center.with_(SpecCellFormat {
            bold: Some(true),
            border: Some(1),
            ..Default::default()
        }),
        section: cfg_left.with_(SpecCellFormat {
            bold: Some(true),
            font_size: Some(11),
            bg_color: Some(C_COLOR_SECTION_FILL.to_string()),
            ..Default::default()
        }),
        caption_top: cfg_center.with_(SpecCellFormat {
            bold: Some(true),
            font_size: Some(12),
            font_color: Some(C_COLOR_HEADER_FONT.to_string()),
            bg_color: Some(C_COLOR_HEADER_FILL.to_string()),
            ..Default::default()
        }),
        label: cfg_left.with_(SpecCellFormat {
            bold: Some(true),
            ..Default::default()
        }),
        currency: SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_CURRENCY.to_string()),
            ..Default::default()
        },
        count: SpecCellFormat {
            num_format: Some(C_NUM_FORMAT_COUNT.to_string()),
            ..Default::default()
        },
    }
}
