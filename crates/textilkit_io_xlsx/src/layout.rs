//! Dashboard coordinate table.
//!
//! The assembler writes each sub-table at its section anchor and the formatter
//! styles and charts the same cells. Both read positions only from here.

use crate::spec::{SpecAnchor, SpecCellRange};
use crate::util::{derive_cell_ref_a1, derive_range_ref_a1};

/// Blocks written onto the dashboard sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum EnumDashboardSection {
    /// Generation time, entity totals and monetary sums.
    Summary,
    /// Top-3 customers by value.
    TopCustomers,
    /// Top-3 payment methods by value.
    TopPaymentMethods,
    /// Top-3 shifts by units produced.
    TopShifts,
    /// Costliest maintenance type.
    CostliestMaintenance,
    /// Chart source: top-5 customers.
    ChartCustomers,
    /// Chart source: top-5 payment methods.
    ChartPaymentMethods,
    /// Chart source: top-3 shifts.
    ChartShifts,
}

/// Every section, in writing order.
pub const L_DASHBOARD_SECTIONS: [EnumDashboardSection; 8] = [
    EnumDashboardSection::Summary,
    EnumDashboardSection::TopCustomers,
    EnumDashboardSection::TopPaymentMethods,
    EnumDashboardSection::TopShifts,
    EnumDashboardSection::CostliestMaintenance,
    EnumDashboardSection::ChartCustomers,
    EnumDashboardSection::ChartPaymentMethods,
    EnumDashboardSection::ChartShifts,
];

/// Row where the chart-source tables start.
pub const N_ROW_CHART_SOURCES: usize = 50;
/// Row where the charts are anchored.
pub const N_ROW_CHARTS: usize = 17;

impl EnumDashboardSection {
    /// Top-left cell of the section (its column label row).
    pub const fn anchor(self) -> SpecAnchor {
        match self {
            Self::Summary => SpecAnchor::new(0, 0),
            Self::TopCustomers => SpecAnchor::new(0, 4),
            Self::TopPaymentMethods => SpecAnchor::new(0, 7),
            Self::TopShifts => SpecAnchor::new(0, 11),
            Self::CostliestMaintenance => SpecAnchor::new(9, 4),
            Self::ChartCustomers => SpecAnchor::new(N_ROW_CHART_SOURCES, 0),
            Self::ChartPaymentMethods => SpecAnchor::new(N_ROW_CHART_SOURCES, 4),
            Self::ChartShifts => SpecAnchor::new(N_ROW_CHART_SOURCES, 8),
        }
    }

    /// Column labels written on the anchor row.
    pub const fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Summary | Self::TopCustomers | Self::CostliestMaintenance => {
                &["Indicador", "Valor"]
            }
            Self::TopPaymentMethods => &["Indicador", "Nº de Vendas", "Valor Total (R$)"],
            Self::TopShifts => &["Indicador", "Total Produzido (unid.)"],
            Self::ChartCustomers => &["Cliente", "Valor Total (R$)"],
            Self::ChartPaymentMethods => &["Forma de Pagamento", "Valor Total (R$)"],
            Self::ChartShifts => &["Turno", "Total Produzido (unidades)"],
        }
    }

    /// Section caption text, for sections that have a single one.
    pub const fn caption(self) -> Option<&'static str> {
        match self {
            Self::TopCustomers => Some("🏆 TOP 3 CLIENTES"),
            Self::TopPaymentMethods => Some("💳 TOP 3 FORMAS PAGAMENTO"),
            Self::TopShifts => Some("🕐 TOP 3 TURNOS"),
            Self::CostliestMaintenance => Some("🔧 MANUTENÇÃO MAIS CARA"),
            _ => None,
        }
    }

    /// Maximum number of ranked rows.
    pub const fn n_rows_max(self) -> usize {
        match self {
            Self::ChartCustomers | Self::ChartPaymentMethods => 5,
            Self::TopCustomers | Self::TopPaymentMethods | Self::TopShifts | Self::ChartShifts => 3,
            Self::Summary | Self::CostliestMaintenance => 0,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////
// #region SectionOffsets

/// Ranked blocks: caption row offset from the anchor.
pub const N_OFFSET_TOP_CAPTION: usize = 2;
/// Ranked blocks: first entry row offset from the anchor.
pub const N_OFFSET_TOP_FIRST_ENTRY: usize = 4;

/// Summary block: "Gerado em" row.
pub const N_OFFSET_SUMMARY_GENERATED: usize = 1;
/// Summary block: totals caption row.
pub const N_OFFSET_SUMMARY_CAPTION_TOTALS: usize = 3;
/// Summary block: first total row.
pub const N_OFFSET_SUMMARY_FIRST_TOTAL: usize = 5;
/// Summary block: finance caption row.
pub const N_OFFSET_SUMMARY_CAPTION_FINANCE: usize = 11;
/// Summary block: first monetary row.
pub const N_OFFSET_SUMMARY_FIRST_AMOUNT: usize = 13;

/// Summary captions.
pub const C_CAPTION_SUMMARY_TOTALS: &str = "📈 RESUMO GERAL";
/// Summary finance caption.
pub const C_CAPTION_SUMMARY_FINANCE: &str = "💰 FINANCEIRO";

/// Maintenance block: caption row offset.
pub const N_OFFSET_MAINTENANCE_CAPTION: usize = 1;
/// Maintenance block: first detail row offset.
pub const N_OFFSET_MAINTENANCE_FIRST_DETAIL: usize = 3;

/// Chart-source blocks: first data row offset (right below the labels).
pub const N_OFFSET_CHART_FIRST_ROW: usize = 1;

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region FormatTargets

/// Caption style class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnumCaptionStyle {
    /// Grey section caption.
    Section,
    /// Teal ranking caption.
    Ranking,
}

/// Every caption cell and the style it takes.
pub fn derive_caption_cells() -> Vec<(SpecAnchor, EnumCaptionStyle)> {
    let anchor_summary = EnumDashboardSection::Summary.anchor();
    let anchor_maintenance = EnumDashboardSection::CostliestMaintenance.anchor();

    let mut l_cells = vec![
        (
            anchor_summary.offset(N_OFFSET_SUMMARY_CAPTION_TOTALS, 0),
            EnumCaptionStyle::Section,
        ),
        (
            anchor_summary.offset(N_OFFSET_SUMMARY_CAPTION_FINANCE, 0),
            EnumCaptionStyle::Section,
        ),
        (
            anchor_maintenance.offset(N_OFFSET_MAINTENANCE_CAPTION, 0),
            EnumCaptionStyle::Section,
        ),
    ];
    for section in [
        EnumDashboardSection::TopCustomers,
        EnumDashboardSection::TopPaymentMethods,
        EnumDashboardSection::TopShifts,
    ] {
        l_cells.push((
            section.anchor().offset(N_OFFSET_TOP_CAPTION, 0),
            EnumCaptionStyle::Ranking,
        ));
    }
    l_cells
}

/// Fixed dashboard column widths.
pub const L_DASHBOARD_COLUMN_WIDTHS: [(usize, f64); 9] = [
    (0, 30.0),
    (1, 25.0),
    (4, 30.0),
    (5, 20.0),
    (7, 25.0),
    (8, 18.0),
    (9, 20.0),
    (11, 25.0),
    (12, 25.0),
];

/// Label columns rendered bold and left aligned.
pub fn derive_label_columns() -> [usize; 3] {
    [
        EnumDashboardSection::Summary.anchor().col,
        EnumDashboardSection::TopCustomers.anchor().col,
        EnumDashboardSection::TopPaymentMethods.anchor().col,
    ]
}

/// Numeric value range of a chart-source section (second column, data rows only).
pub fn derive_chart_value_range(section: EnumDashboardSection) -> SpecCellRange {
    let anchor = section.anchor();
    SpecCellRange {
        row_first: anchor.row + N_OFFSET_CHART_FIRST_ROW,
        col_first: anchor.col + 1,
        row_last: anchor.row + section.n_rows_max(),
        col_last: anchor.col + 1,
    }
}

/// Label range of a chart-source section (first column, data rows only).
pub fn derive_chart_category_range(section: EnumDashboardSection) -> SpecCellRange {
    let anchor = section.anchor();
    SpecCellRange {
        row_first: anchor.row + N_OFFSET_CHART_FIRST_ROW,
        col_first: anchor.col,
        row_last: anchor.row + section.n_rows_max(),
        col_last: anchor.col,
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ChartPlans

/// Chart width in pixels.
pub const N_CHART_WIDTH_PX: u32 = 567;
/// Chart height in pixels.
pub const N_CHART_HEIGHT_PX: u32 = 378;

/// One planned chart, referencing its source cells by A1 text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDashboardChartPlan {
    /// Chart title.
    pub title: String,
    /// Built-in Excel chart style id.
    pub style: u8,
    /// Series name cell, e.g. `B51`.
    pub ref_series_name: String,
    /// Category labels, e.g. `A52:A56`.
    pub ref_categories: String,
    /// Values, e.g. `B52:B56`.
    pub ref_values: String,
    /// Anchor cell, e.g. `A18`.
    pub ref_anchor: String,
    /// Width in pixels.
    pub width_px: u32,
    /// Height in pixels.
    pub height_px: u32,
}

/// Pie charts of the dashboard, bound to the chart-source sections.
pub fn derive_dashboard_chart_plans() -> Vec<SpecDashboardChartPlan> {
    [
        (EnumDashboardSection::ChartCustomers, "🏆 Top 5 Clientes", 10u8),
        (
            EnumDashboardSection::ChartPaymentMethods,
            "💳 Top 5 Formas de Pagamento",
            11u8,
        ),
        (EnumDashboardSection::ChartShifts, "🕐 Top 3 Turnos de Produção", 12u8),
    ]
    .into_iter()
    .map(|(section, title, style)| {
        let anchor = section.anchor();
        SpecDashboardChartPlan {
            title: title.to_string(),
            style,
            ref_series_name: derive_cell_ref_a1(anchor.offset(0, 1)),
            ref_categories: derive_range_ref_a1(derive_chart_category_range(section)),
            ref_values: derive_range_ref_a1(derive_chart_value_range(section)),
            ref_anchor: derive_cell_ref_a1(SpecAnchor::new(N_ROW_CHARTS, anchor.col)),
            width_px: N_CHART_WIDTH_PX,
            height_px: N_CHART_HEIGHT_PX,
        }
    })
    .collect()
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
