//! `textilkit_io_xlsx`:
//! XLSX report kernel for the textile operations report.
//!
//! - `conf`      : constants and default style presets
//! - `spec`      : workbook model, dashboard inputs, report
//! - `util`      : pure helper functions (naming, value text, A1 references)
//! - `layout`    : dashboard coordinate table
//! - `assembler` : datasets and dashboard into the workbook model
//! - `formatter` : presentation pass over the model
//! - `writer`    : rust_xlsxwriter rendering, single save
pub mod assembler;
pub mod conf;
pub mod formatter;
pub mod layout;
pub mod spec;
pub mod util;
pub mod writer;

pub use assembler::{assemble_workbook, write_dashboard, write_dataset};
pub use conf::{C_DASHBOARD_SHEET_NAME, N_LEN_EXCEL_SHEET_NAME_MAX, SpecReportFormats};
pub use formatter::format_workbook;
pub use spec::{
    EnumCellValue, SpecDashboardData, SpecDashboardTotals, SpecMaintenanceCost, SpecRankedAmount,
    SpecRankedPayment, SpecRankedUnits, SpecSheet, SpecWorkbook, SpecXlsxReport,
};
pub use util::{derive_report_file_name, derive_sheet_name, format_count, format_currency};
pub use writer::XlsxWriter;
