//! Spreadsheet column letters.

use log::warn;

/// Converts a column label such as `A` or `AB` into a zero-based index.
///
/// Letters count base 26 with `A` = 1, so `A` is 0, `Z` is 25 and `AA` is 26.
/// Lowercase letters are accepted. Returns `None` for an empty label, for any
/// non-alphabetic character, or when the index would overflow.
pub fn column_letter_to_index(label: &str) -> Option<usize> {
    if label.is_empty() {
        return None;
    }
    let mut column: usize = 0;
    for ch in label.chars() {
        let upper = ch.to_ascii_uppercase();
        if !upper.is_ascii_uppercase() {
            return None;
        }
        let digit = (upper as u8 - b'A' + 1) as usize;
        column = column.checked_mul(26)?.checked_add(digit)?;
    }
    Some(column - 1)
}

/// Resolves an optional column (cc, bcc, attachments).
///
/// A blank label means the feature is not used. An unparsable label is
/// treated the same way, with a warning.
pub fn resolve_optional_column(label: Option<&str>) -> Option<usize> {
    let label = label.map(str::trim).filter(|l| !l.is_empty())?;
    let index = column_letter_to_index(label);
    if index.is_none() {
        warn!("Ignoring invalid column label \"{}\"", label);
    }
    index
}
