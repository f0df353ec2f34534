//! Delimiter-packed income lines.
//!
//! Older exports store an entry's lines as one text column, `"methodId:amount;..."`.
//! Such text is decoded here, at the import boundary, and nowhere else: the ledger
//! itself only ever handles structured [`IncomeLine`] values.

use crate::{
    errors::{Error, Result},
    models::IncomeLine,
};

const LINE_SEPARATOR: char = ';';
const FIELD_SEPARATOR: char = ':';

/// Decodes `"1:100;2:50"` into income lines. Empty text (or a trailing separator)
/// yields no lines.
///
/// # Errors
/// Returns [`Error::Validation`] for a segment without exactly one `:`, or with an id
/// or amount that does not parse.
pub fn decode_lines(encoded: &str) -> Result<Vec<IncomeLine>> {
    encoded
        .split(LINE_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(decode_segment)
        .collect()
}

fn decode_segment(segment: &str) -> Result<IncomeLine> {
    let malformed = || Error::validation(format!("malformed income line '{segment}'"));

    let (id, amount) = segment.split_once(FIELD_SEPARATOR).ok_or_else(malformed)?;
    if amount.contains(FIELD_SEPARATOR) {
        return Err(malformed());
    }

    let method_id = id.trim().parse::<i64>().map_err(|_| malformed())?;
    let amount = amount.trim().parse::<f64>().map_err(|_| malformed())?;
    Ok(IncomeLine { method_id, amount })
}

/// Encodes lines back into the packed form, for exports read by older tooling.
#[must_use]
pub fn encode_lines(lines: &[IncomeLine]) -> String {
    lines
        .iter()
        .map(|line| format!("{}{FIELD_SEPARATOR}{}", line.method_id, line.amount))
        .collect::<Vec<_>>()
        .join(&LINE_SEPARATOR.to_string())
}
