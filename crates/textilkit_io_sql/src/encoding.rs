//! Repair of UTF-8 text that was decoded as Latin-1 somewhere upstream.

use std::borrow::Cow;

/// Marker of double-decoded UTF-8: lead bytes `0xC3` read as Latin-1.
pub const C_MOJIBAKE_MARKER: char = 'Ã';

/// Repair mis-decoded text such as `ProduÃ§Ã£o` -> `Produção`.
///
/// Text without the marker is borrowed unchanged. When the marker is present every
/// char is narrowed to one Latin-1 byte and the bytes are decoded as UTF-8; if any
/// char is above U+00FF or the bytes are not valid UTF-8 the input is returned as is.
pub fn repair_mojibake(text: &str) -> Cow<'_, str> {
    if !text.contains(C_MOJIBAKE_MARKER) {
        return Cow::Borrowed(text);
    }

    let v_bytes: Option<Vec<u8>> = text
        .chars()
        .map(|chr| u8::try_from(u32::from(chr)).ok())
        .collect();
    match v_bytes.map(String::from_utf8) {
        Some(Ok(c_repaired)) => Cow::Owned(c_repaired),
        _ => Cow::Borrowed(text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repair_mojibake_fixes_double_decoded_text() {
        assert_eq!(repair_mojibake("ProduÃ§Ã£o"), "Produção");
        assert_eq!(repair_mojibake("ManhÃ£"), "Manhã");
        assert_eq!(repair_mojibake("CartÃ£o de CrÃ©dito"), "Cartão de Crédito");
    }

    #[test]
    fn test_repair_mojibake_leaves_clean_text_borrowed() {
        assert!(matches!(repair_mojibake("Tarde"), Cow::Borrowed("Tarde")));
        assert!(matches!(repair_mojibake("Produção"), Cow::Borrowed(_)));
        assert_eq!(repair_mojibake(""), "");
    }

    #[test]
    fn test_repair_mojibake_falls_back_on_failure() {
        // lone marker: 0xC3 without continuation byte
        assert_eq!(repair_mojibake("Ã"), "Ã");
        // char above U+00FF cannot be narrowed
        assert_eq!(repair_mojibake("Ã§ € ok"), "Ã§ € ok");
        assert_eq!(repair_mojibake("Ã§ 📊"), "Ã§ 📊");
    }

    #[test]
    fn test_repair_mojibake_is_idempotent() {
        for c_text in ["ProduÃ§Ã£o", "Manhã", "Ã", "plain", "SÃ£o Paulo"] {
            let c_once = repair_mojibake(c_text).into_owned();
            let c_twice = repair_mojibake(&c_once).into_owned();
            assert_eq!(c_once, c_twice, "{c_text}");
        }
    }
}
