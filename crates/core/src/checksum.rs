//! Check digit algorithms.
//!
//! Three versions are supported and they are not interchangeable: an identifier format commits
//! to one version for its whole lifetime, and identifiers carry the version they were generated
//! with.
//!
//! - **V1** is Luhn's algorithm over the decimal digits of a number. It is used by legacy
//!   identifiers, where the check digit is appended to the decimal value before base conversion.
//! - **V2** is a Luhn variant run directly over the base-30 string. Each character weighs its
//!   ASCII code point minus 48, so letters weigh more than 9 (`'A'` is 17, `'M'` is 29) rather
//!   than their alphabet position. Issued identifiers depend on this arithmetic and it must not
//!   change. The check is always a decimal digit.
//! - **V3** is Luhn mod N with N = 30, producing a check symbol from the full alphabet.

use std::fmt;
use std::str::FromStr;

use crate::alphabet::{self, ALPHABET_LEN};
use crate::base;
use crate::format::strip_separators;
use crate::{NpidError, NpidResult};

/// Selects the check digit algorithm.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChecksumVersion {
    /// Luhn over decimal digits.
    V1,
    /// Luhn over ASCII-offset weights of the encoded string.
    V2,
    /// Luhn mod 30 over alphabet positions.
    V3,
}

impl ChecksumVersion {
    /// Numeric tag (1, 2 or 3).
    pub fn number(self) -> u8 {
        match self {
            ChecksumVersion::V1 => 1,
            ChecksumVersion::V2 => 2,
            ChecksumVersion::V3 => 3,
        }
    }

    /// Computes the check symbol for `core`.
    ///
    /// For V1 `core` is a string of decimal digits; for V2 and V3 it is an alphabet string.
    /// Separators and whitespace are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`NpidError::InvalidCharacter`] if `core` contains a character the version
    /// cannot weigh.
    pub fn compute(self, core: &str) -> NpidResult<char> {
        match self {
            ChecksumVersion::V1 => {
                let digits = decimal_digits(&strip_separators(core))?;
                Ok(char::from(b'0' + luhn_digits(&digits)))
            }
            ChecksumVersion::V2 => alphabet_luhn_check(core),
            ChecksumVersion::V3 => luhn_mod_n_check(core),
        }
    }

    /// Validates `candidate` under this version.
    ///
    /// V2 and V3 treat the last character as the check symbol. V1 decodes the whole candidate
    /// from `radix` and checks the last decimal digit of the result. An empty candidate is never
    /// valid.
    ///
    /// # Errors
    ///
    /// Propagates [`NpidError::InvalidCharacter`] (and, for V1, decoding errors).
    pub fn is_valid(self, candidate: &str, radix: u32) -> NpidResult<bool> {
        match self {
            ChecksumVersion::V1 => {
                if strip_separators(candidate).is_empty() {
                    return Ok(false);
                }
                Ok(is_valid_v1(base::decode(candidate, radix)?))
            }
            ChecksumVersion::V2 => is_valid_v2(candidate),
            ChecksumVersion::V3 => is_valid_v3(candidate),
        }
    }
}

impl fmt::Display for ChecksumVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.number())
    }
}

impl FromStr for ChecksumVersion {
    type Err = NpidError;

    /// Accepts `1`, `2`, `3` with an optional `v`/`V` prefix.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed
            .strip_prefix('v')
            .or_else(|| trimmed.strip_prefix('V'))
            .unwrap_or(trimmed);
        match digits {
            "1" => Ok(ChecksumVersion::V1),
            "2" => Ok(ChecksumVersion::V2),
            "3" => Ok(ChecksumVersion::V3),
            _ => Err(NpidError::InvalidChecksumVersion(s.to_string())),
        }
    }
}

impl TryFrom<u8> for ChecksumVersion {
    type Error = NpidError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(ChecksumVersion::V1),
            2 => Ok(ChecksumVersion::V2),
            3 => Ok(ChecksumVersion::V3),
            other => Err(NpidError::InvalidChecksumVersion(other.to_string())),
        }
    }
}

fn decimal_digits(s: &str) -> NpidResult<Vec<u8>> {
    s.chars()
        .map(|c| {
            c.to_digit(10)
                .map(|d| d as u8)
                .ok_or(NpidError::InvalidCharacter(c))
        })
        .collect()
}

fn luhn_digits(digits: &[u8]) -> u8 {
    let parity = digits.len() % 2;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(index, &digit)| {
            let mut digit = u32::from(digit);
            if index % 2 == parity {
                digit *= 2;
            }
            if digit > 9 {
                digit -= 9;
            }
            digit
        })
        .sum();

    ((10 - sum % 10) % 10) as u8
}

/// V1: Luhn check digit over the decimal digits of `number`.
///
/// Every other digit is doubled, starting from the second-to-last digit of `number` and moving
/// left. The result is appended as `number * 10 + check`.
pub fn luhn_check_digit(number: u64) -> u8 {
    let digits: Vec<u8> = number.to_string().bytes().map(|b| b - b'0').collect();
    luhn_digits(&digits)
}

/// V1 validation: the last decimal digit of `number` must be the check digit of the rest.
pub fn is_valid_v1(number: u64) -> bool {
    let core = number / 10;
    let check = (number % 10) as u8;
    check == luhn_check_digit(core)
}

/// V2: alphabet Luhn check digit over an encoded `core`.
///
/// # Errors
///
/// Returns [`NpidError::InvalidCharacter`] for any character outside the alphabet.
pub fn alphabet_luhn_check(core: &str) -> NpidResult<char> {
    let normalised = strip_separators(core);
    let mut sum: i64 = 0;

    for (i, c) in normalised.chars().rev().enumerate() {
        if !alphabet::is_symbol(c) {
            return Err(NpidError::InvalidCharacter(c));
        }
        let digit = i64::from(u32::from(c)) - 48;
        let weight = if i % 2 == 0 {
            2 * digit - 9 * (digit / 5)
        } else {
            digit
        };
        sum += weight;
    }

    let sum = sum.abs() + 10;
    let check = (10 - sum % 10) % 10;
    Ok(char::from(b'0' + check as u8))
}

/// V3: Luhn mod 30 check symbol over an encoded `core`.
///
/// # Errors
///
/// Returns [`NpidError::InvalidCharacter`] for any character outside the alphabet.
pub fn luhn_mod_n_check(core: &str) -> NpidResult<char> {
    const N: u32 = ALPHABET_LEN;

    let normalised = strip_separators(core);
    let mut factor = 2;
    let mut sum = 0;

    for c in normalised.chars().rev() {
        let code_point = alphabet::value_of(c)?;
        let addend = factor * code_point;
        sum += addend / N + addend % N;
        factor = if factor == 2 { 1 } else { 2 };
    }

    alphabet::symbol_of((N - sum % N) % N)
}

fn split_check(candidate: &str) -> NpidResult<Option<(String, char)>> {
    let normalised = strip_separators(candidate);
    if let Some(bad) = normalised.chars().find(|c| !alphabet::is_symbol(*c)) {
        return Err(NpidError::InvalidCharacter(bad));
    }

    let mut core = normalised;
    let check = match core.pop() {
        Some(check) if !core.is_empty() => check,
        _ => return Ok(None),
    };
    Ok(Some((core, check)))
}

/// V2 validation: the last character must be the alphabet Luhn check of the rest.
///
/// Candidates shorter than two characters are not valid.
///
/// # Errors
///
/// Returns [`NpidError::InvalidCharacter`] for any character outside the alphabet.
pub fn is_valid_v2(candidate: &str) -> NpidResult<bool> {
    match split_check(candidate)? {
        Some((core, check)) => Ok(alphabet_luhn_check(&core)? == check),
        None => Ok(false),
    }
}

/// V3 validation: the last character must be the Luhn mod 30 check of the rest.
///
/// # Errors
///
/// Returns [`NpidError::InvalidCharacter`] for any character outside the alphabet.
pub fn is_valid_v3(candidate: &str) -> NpidResult<bool> {
    match split_check(candidate)? {
        Some((core, check)) => Ok(luhn_mod_n_check(&core)? == check),
        None => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alphabet::ALPHABET;

    #[test]
    fn test_luhn_check_digit_known_values() {
        assert_eq!(luhn_check_digit(20), 6);
        assert_eq!(luhn_check_digit(500), 5);
        assert_eq!(luhn_check_digit(24_300_000), 6);
        assert_eq!(luhn_check_digit(84_084), 3);
        assert_eq!(luhn_check_digit(840_848), 5);
        assert_eq!(luhn_check_digit(7_992_739_871), 4);
        assert_eq!(luhn_check_digit(0), 0);
    }

    #[test]
    fn test_is_valid_v1() {
        assert!(!is_valid_v1(840_848));
        assert!(is_valid_v1(8_408_485));
        assert!(is_valid_v1(79_927_398_714));
        assert!(!is_valid_v1(79_927_398_713));
        assert!(is_valid_v1(0));
    }

    #[test]
    fn test_v1_detects_every_single_decimal_substitution() {
        let valid = 8_408_485u64;
        let digits = valid.to_string();
        for pos in 0..digits.len() {
            for replacement in b'0'..=b'9' {
                let mut bytes = digits.clone().into_bytes();
                if bytes[pos] == replacement {
                    continue;
                }
                bytes[pos] = replacement;
                let mutated: u64 = String::from_utf8(bytes).unwrap().parse().unwrap();
                assert!(!is_valid_v1(mutated), "{mutated} should be rejected");
            }
        }
    }

    #[test]
    fn test_v1_compute_on_digit_string() {
        assert_eq!(ChecksumVersion::V1.compute("20").unwrap(), '6');
        assert_eq!(ChecksumVersion::V1.compute("24300000").unwrap(), '6');
        assert_eq!(
            ChecksumVersion::V1.compute("2A"),
            Err(NpidError::InvalidCharacter('A'))
        );
    }

    #[test]
    fn test_v1_is_valid_decodes_candidate() {
        // "000-06V" is 206 = 20 * 10 + 6
        assert!(ChecksumVersion::V1.is_valid("000-06V", 30).unwrap());
        assert!(!ChecksumVersion::V1.is_valid("000-06W", 30).unwrap());
    }

    #[test]
    fn test_v1_rejects_empty_candidate() {
        assert!(!ChecksumVersion::V1.is_valid("", 30).unwrap());
        assert!(!ChecksumVersion::V1.is_valid("-", 30).unwrap());
        assert!(!ChecksumVersion::V1.is_valid(" - ", 30).unwrap());
        assert!(ChecksumVersion::V1.is_valid("0", 30).unwrap());
    }

    #[test]
    fn test_alphabet_luhn_digits_match_classic_luhn() {
        assert_eq!(alphabet_luhn_check("12345").unwrap(), '5');
        assert_eq!(alphabet_luhn_check("7992739871").unwrap(), '3');
    }

    #[test]
    fn test_alphabet_luhn_uses_ascii_offsets_for_letters() {
        // 'M' weighs 29 (77 - 48), doubled and folded to 13: (13 + 10) -> check 7
        assert_eq!(alphabet_luhn_check("0000M").unwrap(), '7');
        assert_eq!(alphabet_luhn_check("000-0m").unwrap(), '7');
    }

    #[test]
    fn test_alphabet_luhn_empty_core() {
        assert_eq!(alphabet_luhn_check("").unwrap(), '0');
    }

    #[test]
    fn test_alphabet_luhn_rejects_excluded_letters() {
        assert_eq!(
            alphabet_luhn_check("000B0"),
            Err(NpidError::InvalidCharacter('B'))
        );
    }

    #[test]
    fn test_is_valid_v2() {
        assert!(is_valid_v2("0000M7").unwrap());
        assert!(is_valid_v2("000-0M7").unwrap());
        assert!(!is_valid_v2("0000M8").unwrap());
        assert!(!is_valid_v2("0000MA").unwrap());
        assert!(!is_valid_v2("7").unwrap());
        assert!(!is_valid_v2("").unwrap());
        assert_eq!(is_valid_v2("0000S7"), Err(NpidError::InvalidCharacter('S')));
    }

    #[test]
    fn test_luhn_mod_n_known_values() {
        assert_eq!(luhn_mod_n_check("0000M").unwrap(), 'L');
        assert_eq!(luhn_mod_n_check("1").unwrap(), 'X');
        assert_eq!(luhn_mod_n_check("10").unwrap(), 'Y');
        assert_eq!(luhn_mod_n_check("").unwrap(), '0');
    }

    #[test]
    fn test_luhn_mod_n_check_is_alphabet_symbol() {
        for core in ["A0000", "YYYYY", "8A08A", "12345", "KLMNP"] {
            let check = luhn_mod_n_check(core).unwrap();
            assert!(ALPHABET.contains(&check));
        }
    }

    #[test]
    fn test_is_valid_v3() {
        assert!(is_valid_v3("0000ML").unwrap());
        assert!(is_valid_v3("000-0ml").unwrap());
        assert!(!is_valid_v3("0000MK").unwrap());
        assert!(!is_valid_v3("L").unwrap());
        assert_eq!(is_valid_v3("0000M!"), Err(NpidError::InvalidCharacter('!')));
    }

    #[test]
    fn test_v3_detects_every_single_substitution() {
        let core = "8A08A";
        let valid = format!("{core}{}", luhn_mod_n_check(core).unwrap());
        assert!(is_valid_v3(&valid).unwrap());

        for pos in 0..valid.len() {
            for &replacement in ALPHABET.iter() {
                let mut chars: Vec<char> = valid.chars().collect();
                if chars[pos] == replacement {
                    continue;
                }
                chars[pos] = replacement;
                let mutated: String = chars.into_iter().collect();
                assert!(!is_valid_v3(&mutated).unwrap(), "{mutated} should be rejected");
            }
        }
    }

    #[test]
    fn test_version_parsing() {
        assert_eq!("1".parse::<ChecksumVersion>().unwrap(), ChecksumVersion::V1);
        assert_eq!(" v2 ".parse::<ChecksumVersion>().unwrap(), ChecksumVersion::V2);
        assert_eq!("V3".parse::<ChecksumVersion>().unwrap(), ChecksumVersion::V3);
        assert!(matches!(
            "4".parse::<ChecksumVersion>(),
            Err(NpidError::InvalidChecksumVersion(_))
        ));
        assert!(ChecksumVersion::try_from(0u8).is_err());
        assert_eq!(ChecksumVersion::try_from(3u8).unwrap(), ChecksumVersion::V3);
    }

    #[test]
    fn test_version_display() {
        assert_eq!(ChecksumVersion::V2.to_string(), "v2");
        assert_eq!(ChecksumVersion::V3.number(), 3);
    }
}
