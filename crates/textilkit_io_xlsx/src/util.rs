//! Stateless helper utilities: sheet naming, value rendering, A1 references.

use crate::conf::{
    C_CURRENCY_PREFIX, C_REPORT_FILE_EXTENSION, C_REPORT_FILE_PREFIX, N_LEN_EXCEL_SHEET_NAME_MAX,
    N_NCOLS_EXCEL_MAX, N_NROWS_EXCEL_MAX, TUP_EXCEL_ILLEGAL,
};
use crate::spec::{EnumCellValue, SpecAnchor, SpecCellRange};

////////////////////////////////////////////////////////////////////////////////
// #region SheetNormalization

/// Replace invalid chars and trim to valid Excel sheet name.
pub fn sanitize_sheet_name(name: &str, replace_to: &str) -> String {
    let mut c_name = name.to_string();
    for c_illegal in TUP_EXCEL_ILLEGAL {
        c_name = c_name.replace(c_illegal, replace_to);
    }
    c_name = c_name.trim().to_string();
    if c_name.is_empty() {
        c_name = "Sheet".to_string();
    }

    c_name.chars().take(N_LEN_EXCEL_SHEET_NAME_MAX).collect()
}

/// Title-case `text`: a letter following a non-letter is uppercased, any other letter lowercased.
pub fn convert_to_title_case(text: &str) -> String {
    let mut c_out = String::with_capacity(text.len());
    let mut if_prev_is_letter = false;
    for chr in text.chars() {
        if chr.is_alphabetic() {
            if if_prev_is_letter {
                c_out.extend(chr.to_lowercase());
            } else {
                c_out.extend(chr.to_uppercase());
            }
            if_prev_is_letter = true;
        } else {
            c_out.push(chr);
            if_prev_is_letter = false;
        }
    }
    c_out
}

/// Derive a sheet name from a dataset key (`top_clientes` -> `Top Clientes`).
pub fn derive_sheet_name(dataset_name: &str) -> String {
    sanitize_sheet_name(&convert_to_title_case(&dataset_name.replace('_', " ")), "_")
}

/// Output file name `relatorio_textil_<stamp>.xlsx`; `stamp` is `YYYYMMDD_HHMMSS`.
pub fn derive_report_file_name(stamp: &str) -> String {
    format!("{C_REPORT_FILE_PREFIX}_{stamp}.{C_REPORT_FILE_EXTENSION}")
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region ValueRendering

/// Group the digits of a non-negative integer string with `,`.
fn derive_grouped_digits(digits: &str) -> String {
    let n_len = digits.len();
    let mut c_out = String::with_capacity(n_len + n_len / 3);
    for (n_idx, chr) in digits.chars().enumerate() {
        if n_idx > 0 && (n_len - n_idx) % 3 == 0 {
            c_out.push(',');
        }
        c_out.push(chr);
    }
    c_out
}

/// Thousands-separated integer (`1500` -> `1,500`).
pub fn format_thousands(value: i64) -> String {
    let c_digits = value.unsigned_abs().to_string();
    let c_grouped = derive_grouped_digits(&c_digits);
    if value < 0 {
        format!("-{c_grouped}")
    } else {
        c_grouped
    }
}

/// Currency text with two decimals (`1234.5` -> `R$ 1,234.50`).
pub fn format_currency(value: f64) -> String {
    let c_fixed = format!("{:.2}", value.abs());
    let (c_int, c_frac) = c_fixed.split_once('.').unwrap_or((c_fixed.as_str(), "00"));
    let c_sign = if value < 0.0 && c_fixed.chars().any(|chr| chr.is_ascii_digit() && chr != '0')
    {
        "-"
    } else {
        ""
    };
    format!(
        "{C_CURRENCY_PREFIX} {c_sign}{}.{c_frac}",
        derive_grouped_digits(c_int)
    )
}

/// Count text with unit suffix (`1500, "vendas"` -> `1,500 vendas`).
pub fn format_count(value: i64, unit: &str) -> String {
    format!("{} {unit}", format_thousands(value))
}

/// Ranked list label (`0, "Ana"` -> `1º - Ana`).
pub fn format_rank_label(idx_zero_based: usize, label: &str) -> String {
    format!("{}º - {label}", idx_zero_based + 1)
}

/// Text a cell shows by default, used for width estimation.
pub fn derive_rendered_text(value: &EnumCellValue) -> String {
    match value {
        EnumCellValue::None => String::new(),
        EnumCellValue::String(val) => val.clone(),
        EnumCellValue::Number(val) => {
            if val.fract() == 0.0 && val.abs() < 1e15 {
                format!("{val:.0}")
            } else {
                val.to_string()
            }
        }
    }
}

/// Estimate displayed width units for text; non-ASCII glyphs count wider.
pub fn estimate_unicode_string_width(s: &str) -> usize {
    let n_ascii = s.chars().filter(|chr| chr.is_ascii()).count();
    let n_non_ascii = s.chars().count().saturating_sub(n_ascii);
    n_ascii + (n_non_ascii as f64 * 1.6).round() as usize
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region CellReferences

/// Column letters for a zero-based column index (`0` -> `A`, `27` -> `AB`).
pub fn derive_column_letters(col: usize) -> String {
    let mut l_chars = Vec::new();
    let mut n_rest = col + 1;
    while n_rest > 0 {
        let n_rem = (n_rest - 1) % 26;
        l_chars.push(char::from(b'A' + n_rem as u8));
        n_rest = (n_rest - 1) / 26;
    }
    l_chars.iter().rev().collect()
}

/// A1 reference for an anchor (`(51, 1)` -> `B52`).
pub fn derive_cell_ref_a1(anchor: SpecAnchor) -> String {
    format!("{}{}", derive_column_letters(anchor.col), anchor.row + 1)
}

/// A1 range reference (`B52:B56`).
pub fn derive_range_ref_a1(range: SpecCellRange) -> String {
    format!(
        "{}:{}",
        derive_cell_ref_a1(SpecAnchor::new(range.row_first, range.col_first)),
        derive_cell_ref_a1(SpecAnchor::new(range.row_last, range.col_last))
    )
}

/// Parse an A1 cell reference; `$` markers are accepted and ignored.
pub fn parse_cell_ref_a1(reference: &str) -> Result<SpecAnchor, String> {
    let c_ref = reference.trim().replace('$', "");
    let n_letters = c_ref
        .chars()
        .take_while(|chr| chr.is_ascii_alphabetic())
        .count();
    let (c_col, c_row) = c_ref.split_at(n_letters);

    if c_col.is_empty() || c_col.len() > 3 || c_row.is_empty() {
        return Err(format!("Malformed cell reference: {reference:?}"));
    }
    if !c_row.chars().all(|chr| chr.is_ascii_digit()) {
        return Err(format!("Malformed cell reference: {reference:?}"));
    }

    let n_col_1based = c_col
        .chars()
        .map(|chr| usize::from(chr.to_ascii_uppercase() as u8 - b'A') + 1)
        .fold(0usize, |acc, n_digit| acc * 26 + n_digit);
    let n_row_1based = c_row
        .parse::<usize>()
        .map_err(|err| format!("Malformed cell reference: {reference:?}: {err}"))?;

    if n_row_1based == 0 || n_row_1based > N_NROWS_EXCEL_MAX || n_col_1based > N_NCOLS_EXCEL_MAX {
        return Err(format!("Cell reference out of bounds: {reference:?}"));
    }

    Ok(SpecAnchor::new(n_row_1based - 1, n_col_1based - 1))
}

/// Parse `A1:B2` (or a single `A1`) into an ordered inclusive range.
pub fn parse_cell_range(reference: &str) -> Result<SpecCellRange, String> {
    let (c_first, c_last) = match reference.split_once(':') {
        Some((first, last)) => (first, last),
        None => (reference, reference),
    };
    let anchor_first = parse_cell_ref_a1(c_first)?;
    let anchor_last = parse_cell_ref_a1(c_last)?;

    if anchor_last.row < anchor_first.row || anchor_last.col < anchor_first.col {
        return Err(format!("Cell range is reversed: {reference:?}"));
    }

    Ok(SpecCellRange {
        row_first: anchor_first.row,
        col_first: anchor_first.col,
        row_last: anchor_last.row,
        col_last: anchor_last.col,
    })
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_sheet_name_from_dataset_key() {
        assert_eq!(derive_sheet_name("vendas_por_produto"), "Vendas Por Produto");
        assert_eq!(derive_sheet_name("top_clientes"), "Top Clientes");
        assert_eq!(
            derive_sheet_name("vendas_por_forma_pagamento"),
            "Vendas Por Forma Pagamento"
        );
    }

    #[test]
    fn test_derive_sheet_name_truncates_to_excel_limit() {
        let c_name = derive_sheet_name("relatorio_de_consumo_de_materiais_por_maquina");
        assert_eq!(c_name.chars().count(), N_LEN_EXCEL_SHEET_NAME_MAX);
        assert_eq!(c_name, "Relatorio De Consumo De Materia");
    }

    #[test]
    fn test_convert_to_title_case_lowercases_inner_letters() {
        assert_eq!(convert_to_title_case("pRODUÇÃO por TURNO"), "Produção Por Turno");
        assert_eq!(convert_to_title_case("abc2def"), "Abc2Def");
    }

    #[test]
    fn test_sanitize_sheet_name_replaces_illegal_chars() {
        assert_eq!(sanitize_sheet_name("a/b:c", "_"), "a_b_c");
        assert_eq!(sanitize_sheet_name("   ", "_"), "Sheet");
    }

    #[test]
    fn test_format_currency_and_count() {
        assert_eq!(format_currency(1234.5), "R$ 1,234.50");
        assert_eq!(format_currency(0.0), "R$ 0.00");
        assert_eq!(format_currency(1_000_000.0), "R$ 1,000,000.00");
        assert_eq!(format_currency(-98.5), "R$ -98.50");
        assert_eq!(format_count(1500, "vendas"), "1,500 vendas");
        assert_eq!(format_count(999, "unidades"), "999 unidades");
        assert_eq!(format_thousands(-1_234_567), "-1,234,567");
    }

    #[test]
    fn test_format_rank_label() {
        assert_eq!(format_rank_label(0, "Malharia Sul"), "1º - Malharia Sul");
        assert_eq!(format_rank_label(2, "Pix"), "3º - Pix");
    }

    #[test]
    fn test_derive_rendered_text_for_numbers() {
        assert_eq!(derive_rendered_text(&EnumCellValue::Number(20.0)), "20");
        assert_eq!(derive_rendered_text(&EnumCellValue::Number(1500.25)), "1500.25");
        assert_eq!(derive_rendered_text(&EnumCellValue::None), "");
    }

    #[test]
    fn test_cell_references_round_trip_through_a1() {
        assert_eq!(derive_column_letters(0), "A");
        assert_eq!(derive_column_letters(25), "Z");
        assert_eq!(derive_column_letters(27), "AB");
        assert_eq!(derive_cell_ref_a1(SpecAnchor::new(51, 1)), "B52");

        let range = parse_cell_range("$B$52:B56").expect("valid range");
        assert_eq!(
            range,
            SpecCellRange {
                row_first: 51,
                col_first: 1,
                row_last: 55,
                col_last: 1
            }
        );
        assert_eq!(derive_range_ref_a1(range), "B52:B56");
        assert_eq!(parse_cell_ref_a1("AB3"), Ok(SpecAnchor::new(2, 27)));
    }

    #[test]
    fn test_parse_cell_range_rejects_malformed_references() {
        assert!(parse_cell_range("B0:B5").is_err());
        assert!(parse_cell_range("52B").is_err());
        assert!(parse_cell_range("B56:B52").is_err());
        assert!(parse_cell_range("B52:").is_err());
        assert!(parse_cell_range("ZZZZ1").is_err());
        assert!(parse_cell_range("A1:B2x").is_err());
    }
}
