//! Display formatting for identifiers.
//!
//! The separator is cosmetic. It is never part of an identifier's value and is stripped before
//! any decoding or validation.

use crate::constants::{DISPLAY_GROUP_LEN, SEPARATOR};

/// Inserts the separator after the third character, e.g. `"A00006"` becomes `"A00-006"`.
///
/// Values of three characters or fewer are returned unchanged.
pub fn format_display(value: &str) -> String {
    match value.char_indices().nth(DISPLAY_GROUP_LEN) {
        Some((split, _)) => {
            let (head, tail) = value.split_at(split);
            let mut out = String::with_capacity(value.len() + 1);
            out.push_str(head);
            out.push(SEPARATOR);
            out.push_str(tail);
            out
        }
        None => value.to_string(),
    }
}

/// Removes separators and whitespace and uppercases the remainder.
///
/// This is the normal form used by decoding and every checksum validator.
pub fn strip_separators(input: &str) -> String {
    input
        .chars()
        .filter(|c| *c != SEPARATOR && !c.is_whitespace())
        .map(|c| c.to_ascii_uppercase())
        .collect()
}
