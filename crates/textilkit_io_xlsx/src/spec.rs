//! Shared XLSX specification models: cell formats, the in-memory workbook,
//! dashboard inputs and the per-run report.

use std::collections::BTreeMap;

////////////////////////////////////////////////////////////////////////////////
// #region CellFormatSpecification

/// Cell format specification. `None` fields inherit from whatever is merged underneath.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct SpecCellFormat {
    /// Font size in points.
    pub font_size: Option<i64>,
    /// Bold style.
    pub bold: Option<bool>,

    /// Horizontal alignment.
    pub align: Option<String>,
    /// Vertical alignment.
    pub valign: Option<String>,
    /// Border style for all sides.
    pub border: Option<i64>,

    /// Number format code.
    pub num_format: Option<String>,
    /// Background fill color.
    pub bg_color: Option<String>,
    /// Font color.
    pub font_color: Option<String>,
}

/// Normalized cell value.
#[derive(Debug, Clone, PartialEq)]
pub enum EnumCellValue {
    /// Missing/blank value.
    None,
    /// Text value.
    String(String),
    /// Numeric value.
    Number(f64),
}

impl EnumCellValue {
    /// Shorthand for a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::String(value.into())
    }

    /// Return the text payload, if any.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(val) => Some(val),
            _ => None,
        }
    }
}

impl SpecCellFormat {
    /// Return a new format by overlaying `patch` onto `self`.
    pub fn with_(&self, patch: SpecCellFormat) -> SpecCellFormat {
        self.merge(&patch)
    }

    /// Merge two formats with right-side non-`None` overwrite semantics.
    pub fn merge(&self, other: &SpecCellFormat) -> SpecCellFormat {
        SpecCellFormat {
            font_size: other.font_size.or(self.font_size),
            bold: other.bold.or(self.bold),
            align: other.align.clone().or_else(|| self.align.clone()),
            valign: other.valign.clone().or_else(|| self.valign.clone()),
            border: other.border.or(self.border),
            num_format: other.num_format.clone().or_else(|| self.num_format.clone()),
            bg_color: other.bg_color.clone().or_else(|| self.bg_color.clone()),
            font_color: other.font_color.clone().or_else(|| self.font_color.clone()),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region SheetSpecification

/// Zero-based cell position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpecAnchor {
    /// Zero-based row index.
    pub row: usize,
    /// Zero-based column index.
    pub col: usize,
}

impl SpecAnchor {
    /// Create anchor at `(row, col)`.
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Shift anchor by `(n_rows, n_cols)`.
    pub const fn offset(self, n_rows: usize, n_cols: usize) -> Self {
        Self {
            row: self.row + n_rows,
            col: self.col + n_cols,
        }
    }
}

/// Inclusive rectangular cell range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpecCellRange {
    /// First row (inclusive).
    pub row_first: usize,
    /// First column (inclusive).
    pub col_first: usize,
    /// Last row (inclusive).
    pub row_last: usize,
    /// Last column (inclusive).
    pub col_last: usize,
}

/// Horizontal merge item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecSheetHorizontalMerge {
    /// Row index where merge is applied.
    pub row_idx_start: usize,
    /// Start column index (inclusive).
    pub col_idx_start: usize,
    /// End column index (inclusive).
    pub col_idx_end: usize,
    /// Merge display text.
    pub text: String,
}

/// One stored cell.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecCell {
    /// Cell value.
    pub value: EnumCellValue,
    /// Cell format; `None` writes with the default format.
    pub format: Option<SpecCellFormat>,
}

/// Pie chart bound to cell ranges of its own sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecPieChart {
    /// Chart title.
    pub title: String,
    /// Built-in Excel chart style id.
    pub style: u8,
    /// Cell holding the series name.
    pub cell_series_name: SpecAnchor,
    /// Category labels range.
    pub range_categories: SpecCellRange,
    /// Values range.
    pub range_values: SpecCellRange,
    /// Top-left anchor cell.
    pub anchor: SpecAnchor,
    /// Width in pixels.
    pub width_px: u32,
    /// Height in pixels.
    pub height_px: u32,
}

/// Role of a sheet in the report; decides how it gets formatted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumSheetKind {
    /// Synthetic summary sheet laid out by [`crate::layout`].
    Dashboard,
    /// One catalog dataset (title, blank row, header, body).
    Dataset,
}

/// In-memory worksheet: sparse cell grid plus sheet-level presentation settings.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecSheet {
    /// Unique sheet name.
    pub name: String,
    /// Sheet role.
    pub kind: EnumSheetKind,
    /// Cells keyed by `(row, col)`.
    pub cells: BTreeMap<(usize, usize), SpecCell>,
    /// Horizontal merges.
    pub merges: Vec<SpecSheetHorizontalMerge>,
    /// Explicit column widths.
    pub col_widths: BTreeMap<usize, f64>,
    /// Autofilter range.
    pub autofilter: Option<SpecCellRange>,
    /// First unfrozen cell.
    pub freeze: Option<SpecAnchor>,
    /// Embedded charts.
    pub charts: Vec<SpecPieChart>,
}

impl SpecSheet {
    /// Create empty sheet.
    pub fn new(name: impl Into<String>, kind: EnumSheetKind) -> Self {
        Self {
            name: name.into(),
            kind,
            cells: BTreeMap::new(),
            merges: Vec::new(),
            col_widths: BTreeMap::new(),
            autofilter: None,
            freeze: None,
            charts: Vec::new(),
        }
    }

    /// Store `value` at `(row, col)`. Blank values are not stored.
    pub fn write_value(&mut self, row: usize, col: usize, value: EnumCellValue) {
        if matches!(value, EnumCellValue::None) {
            self.cells.remove(&(row, col));
            return;
        }
        if let EnumCellValue::String(val) = &value
            && val.is_empty()
        {
            self.cells.remove(&(row, col));
            return;
        }
        self.cells.insert(
            (row, col),
            SpecCell {
                value,
                format: None,
            },
        );
    }

    /// Store a text value.
    pub fn write_string(&mut self, row: usize, col: usize, value: impl Into<String>) {
        self.write_value(row, col, EnumCellValue::String(value.into()));
    }

    /// Store a numeric value.
    pub fn write_number(&mut self, row: usize, col: usize, value: f64) {
        self.write_value(row, col, EnumCellValue::Number(value));
    }

    /// Value at `(row, col)`.
    pub fn value(&self, row: usize, col: usize) -> Option<&EnumCellValue> {
        self.cells.get(&(row, col)).map(|cell| &cell.value)
    }

    /// Format at `(row, col)`.
    pub fn format(&self, row: usize, col: usize) -> Option<&SpecCellFormat> {
        self.cells
            .get(&(row, col))
            .and_then(|cell| cell.format.as_ref())
    }

    /// Overlay `patch` onto the format of an existing cell.
    ///
    /// Returns `false` when no cell is stored at `(row, col)`; values are never created here.
    pub fn patch_format(&mut self, row: usize, col: usize, patch: &SpecCellFormat) -> bool {
        let Some(cell) = self.cells.get_mut(&(row, col)) else {
            return false;
        };
        cell.format = Some(match &cell.format {
            Some(fmt) => fmt.merge(patch),
            None => patch.clone(),
        });
        true
    }

    /// Number of used rows (`max row + 1`).
    pub fn height_used(&self) -> usize {
        self.cells.keys().map(|(row, _)| row + 1).max().unwrap_or(0)
    }

    /// Number of used columns (`max col + 1`).
    pub fn width_used(&self) -> usize {
        self.cells.keys().map(|(_, col)| col + 1).max().unwrap_or(0)
    }
}

/// In-memory workbook: ordered, uniquely named sheets.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecWorkbook {
    /// Sheets in output order.
    pub sheets: Vec<SpecSheet>,
}

impl SpecWorkbook {
    /// Append `sheet`; rejects a name already present (case-insensitive, as Excel does).
    pub fn add_sheet(&mut self, sheet: SpecSheet) -> Result<(), String> {
        let c_name_lower = sheet.name.to_lowercase();
        if self
            .sheets
            .iter()
            .any(|existing| existing.name.to_lowercase() == c_name_lower)
        {
            return Err(format!("Duplicate sheet name: {:?}", sheet.name));
        }
        self.sheets.push(sheet);
        Ok(())
    }

    /// Sheet names in output order.
    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.name.as_str()).collect()
    }

    /// Look up sheet by exact name.
    pub fn sheet(&self, name: &str) -> Option<&SpecSheet> {
        self.sheets.iter().find(|sheet| sheet.name == name)
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region DashboardSpecification

/// Entity totals and monetary sums of the summary block. `None` renders as missing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecDashboardTotals {
    /// Number of sales.
    pub cnt_sales: Option<i64>,
    /// Number of production records.
    pub cnt_productions: Option<i64>,
    /// Number of customers.
    pub cnt_customers: Option<i64>,
    /// Number of employees.
    pub cnt_employees: Option<i64>,
    /// Number of suppliers.
    pub cnt_suppliers: Option<i64>,
    /// Sum of sale values.
    pub amount_sales: Option<f64>,
    /// Sum of maintenance costs.
    pub amount_maintenance: Option<f64>,
}

/// Ranked label with a monetary amount.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRankedAmount {
    /// Display label (customer, payment method).
    pub label: String,
    /// Monetary amount.
    pub amount: f64,
}

/// Ranked payment method with sale count and amount.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRankedPayment {
    /// Payment method.
    pub label: String,
    /// Number of sales.
    pub cnt_sales: i64,
    /// Sum of sale values.
    pub amount: f64,
}

/// Ranked shift with produced units.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecRankedUnits {
    /// Shift name.
    pub label: String,
    /// Produced units.
    pub units: f64,
}

/// Costliest maintenance category.
#[derive(Debug, Clone, PartialEq)]
pub struct SpecMaintenanceCost {
    /// Maintenance type.
    pub label: String,
    /// Total cost.
    pub amount: f64,
    /// Total downtime in hours.
    pub hours: f64,
}

/// Every input the dashboard sheet needs. Failed sub-queries leave their part empty.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SpecDashboardData {
    /// Pre-rendered generation timestamp.
    pub generated_at: String,
    /// Summary block values.
    pub totals: SpecDashboardTotals,
    /// Top-3 customers by value.
    pub top_customers: Vec<SpecRankedAmount>,
    /// Top-3 payment methods by value.
    pub top_payment_methods: Vec<SpecRankedPayment>,
    /// Top-3 shifts by units produced.
    pub top_shifts: Vec<SpecRankedUnits>,
    /// Costliest maintenance type.
    pub costliest_maintenance: Option<SpecMaintenanceCost>,
    /// Chart source: top-5 customers by value.
    pub chart_customers: Vec<SpecRankedAmount>,
    /// Chart source: top-5 payment methods by value.
    pub chart_payment_methods: Vec<SpecRankedAmount>,
    /// Chart source: top-3 shifts by units produced.
    pub chart_shifts: Vec<SpecRankedUnits>,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ReportSpecification

/// Per-run workbook report.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SpecXlsxReport {
    /// Sheet names written, in order.
    pub sheets: Vec<String>,
    /// Non-fatal warnings.
    pub warnings: Vec<String>,
}

impl SpecXlsxReport {
    /// Add a warning message.
    pub fn warn(&mut self, msg: impl AsRef<str>) {
        self.warnings.push(msg.as_ref().to_string());
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
