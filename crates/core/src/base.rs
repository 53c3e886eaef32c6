//! Positional conversion between decimal integers and alphabet strings.
//!
//! The converter is generic over the radix (2..=30). Symbols are taken from
//! [`ALPHABET`](crate::alphabet::ALPHABET), so a radix-16 string uses `0-9` and `A C D E F G`.

use crate::alphabet::{self, ALPHABET_LEN};
use crate::constants::MIN_RADIX;
use crate::format::strip_separators;
use crate::{NpidError, NpidResult};

fn check_radix(radix: u32) -> NpidResult<()> {
    if (MIN_RADIX..=ALPHABET_LEN).contains(&radix) {
        Ok(())
    } else {
        Err(NpidError::InvalidRadix(radix))
    }
}

/// Encodes `number` in `radix`, most significant symbol first, with no padding.
///
/// Zero encodes to the empty string; callers pad explicitly with [`pad`].
///
/// # Errors
///
/// Returns [`NpidError::InvalidRadix`] if `radix` is outside `2..=30`.
pub fn encode(number: u64, radix: u32) -> NpidResult<String> {
    check_radix(radix)?;

    let radix = u64::from(radix);
    let mut symbols = Vec::new();
    let mut quotient = number;
    while quotient > 0 {
        // remainder < radix <= 30, so the lookup cannot fail
        symbols.push(alphabet::symbol_of((quotient % radix) as u32)?);
        quotient /= radix;
    }

    Ok(symbols.iter().rev().collect())
}

/// Decodes an alphabet string in `radix` back to its decimal value.
///
/// Separators and whitespace are ignored and letters are case-insensitive, so display forms
/// such as `"000-00M"` decode directly. The empty string decodes to 0.
///
/// # Errors
///
/// - [`NpidError::InvalidRadix`] if `radix` is outside `2..=30`.
/// - [`NpidError::InvalidCharacter`] for a character outside the alphabet, or a symbol whose
///   value is not below `radix`.
/// - [`NpidError::Overflow`] if the value does not fit in a `u64`.
pub fn decode(input: &str, radix: u32) -> NpidResult<u64> {
    check_radix(radix)?;

    let normalised = strip_separators(input);
    let mut decimal: u64 = 0;
    let mut weight: Option<u64> = Some(1);

    for c in normalised.chars().rev() {
        let digit = alphabet::value_of(c)?;
        if digit >= radix {
            return Err(NpidError::InvalidCharacter(c));
        }
        if digit > 0 {
            let place = weight.ok_or(NpidError::Overflow)?;
            let term = place
                .checked_mul(u64::from(digit))
                .ok_or(NpidError::Overflow)?;
            decimal = decimal.checked_add(term).ok_or(NpidError::Overflow)?;
        }
        // Leading zeros are allowed past the u64 range, so the weight overflows lazily.
        weight = weight.and_then(|w| w.checked_mul(u64::from(radix)));
    }

    Ok(decimal)
}

/// Left-pads `encoded` with `'0'` to `width` characters.
///
/// Strings already at or beyond `width` are returned unchanged.
pub fn pad(encoded: &str, width: usize) -> String {
    format!("{encoded:0>width$}")
}
