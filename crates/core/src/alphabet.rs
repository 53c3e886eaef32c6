//! The 30-symbol national patient ID alphabet.
//!
//! The letters `B`, `I`, `O`, `Q`, `S` and `Z` are left out because they are easily mistaken
//! for `8`, `1`, `0`, `0`, `5` and `2` when an identifier is handwritten or read aloud.
//!
//! A symbol's index in [`ALPHABET`] is its numeric value, so `'0'` is 0 and `'Y'` is 29.

use crate::{NpidError, NpidResult};

/// Number of symbols in the alphabet, and the largest supported radix.
pub const ALPHABET_LEN: u32 = 30;

/// Ordered symbol table. Index position is the symbol's value.
pub const ALPHABET: [char; ALPHABET_LEN as usize] = [
    '0', '1', '2', '3', '4', '5', '6', '7', '8', '9', 'A', 'C', 'D', 'E', 'F', 'G', 'H', 'J', 'K',
    'L', 'M', 'N', 'P', 'R', 'T', 'U', 'V', 'W', 'X', 'Y',
];

/// Returns the symbol for `value`.
///
/// # Errors
///
/// Returns [`NpidError::InvalidDigit`] if `value` is 30 or more.
pub fn symbol_of(value: u32) -> NpidResult<char> {
    ALPHABET
        .get(value as usize)
        .copied()
        .ok_or(NpidError::InvalidDigit(value))
}

/// Returns the numeric value (0..=29) of `c`.
///
/// Lowercase letters are accepted and treated as their uppercase form.
///
/// # Errors
///
/// Returns [`NpidError::InvalidCharacter`] for anything outside the alphabet, including the
/// excluded letters.
pub fn value_of(c: char) -> NpidResult<u32> {
    let upper = c.to_ascii_uppercase();
    let value = match upper {
        '0'..='9' => upper as u32 - '0' as u32,
        'A' => 10,
        'C' => 11,
        'D' => 12,
        'E' => 13,
        'F' => 14,
        'G' => 15,
        'H' => 16,
        'J' => 17,
        'K' => 18,
        'L' => 19,
        'M' => 20,
        'N' => 21,
        'P' => 22,
        'R' => 23,
        'T' => 24,
        'U' => 25,
        'V' => 26,
        'W' => 27,
        'X' => 28,
        'Y' => 29,
        _ => return Err(NpidError::InvalidCharacter(c)),
    };
    Ok(value)
}

/// Returns true if `c` is an alphabet symbol (case-insensitive).
pub fn is_symbol(c: char) -> bool {
    value_of(c).is_ok()
}
