//! Identifier generation, parsing and validation.
//!
//! [`Codec`] combines the base converter and the checksum engine. It is a plain value built
//! from a [`CodecConfig`]; it holds no mutable state, so one instance can be shared freely
//! across threads and every call is independent of every other.

use std::fmt;
use std::ops::RangeInclusive;

use crate::alphabet;
use crate::base;
use crate::checksum::{luhn_check_digit, ChecksumVersion};
use crate::config::{ChecksumMode, CodecConfig};
use crate::constants::DEFAULT_SOURCE_RADIX;
use crate::format::{format_display, strip_separators};
use crate::{NpidError, NpidResult};

/// A sequence number as supplied by a caller.
///
/// Resolved once at the codec boundary so the rest of the pipeline only deals with a `u64`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum SequenceInput {
    /// A decimal sequence number.
    Decimal(u64),
    /// A string of digits in the codec's source radix (decimal digits, or alphabet symbols for
    /// an already-encoded value).
    Encoded(String),
}

impl SequenceInput {
    /// True for an empty or whitespace-only encoded value.
    pub fn is_empty(&self) -> bool {
        matches!(self, SequenceInput::Encoded(raw) if raw.trim().is_empty())
    }

    fn resolve(&self, source_radix: u32) -> NpidResult<u64> {
        match self {
            SequenceInput::Decimal(number) => Ok(*number),
            SequenceInput::Encoded(raw) => {
                let trimmed = raw.trim();
                if source_radix == DEFAULT_SOURCE_RADIX
                    && !trimmed.bytes().all(|b| b.is_ascii_digit())
                {
                    return Err(NpidError::NegativeOrNonIntegerInput(raw.clone()));
                }
                base::decode(trimmed, source_radix)
            }
        }
    }
}

impl From<u64> for SequenceInput {
    fn from(number: u64) -> Self {
        SequenceInput::Decimal(number)
    }
}

impl From<&str> for SequenceInput {
    fn from(raw: &str) -> Self {
        SequenceInput::Encoded(raw.to_string())
    }
}

impl From<String> for SequenceInput {
    fn from(raw: String) -> Self {
        SequenceInput::Encoded(raw)
    }
}

/// A national patient identifier.
///
/// Once constructed by a [`Codec`], the value is guaranteed to:
/// - be exactly `size` characters long,
/// - contain only alphabet symbols (never the separator),
/// - carry the checksum mode and version it was generated with.
///
/// # Display format
/// `Display` inserts the separator after the third character (`A00-006`). Use
/// [`NationalPatientId::value`] for the raw form stored in databases and export documents.
///
/// # Deserialization
/// Deserialized values go through the same width and alphabet checks as [`Codec::parse`], and
/// the stored decimal must match the value. The check symbol itself is not re-verified.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawNationalPatientId"))]
pub struct NationalPatientId {
    decimal_id: u64,
    value: String,
    base: u32,
    size: usize,
    mode: ChecksumMode,
    version: ChecksumVersion,
}

impl NationalPatientId {
    /// The decimal integer the identifier was derived from.
    ///
    /// In legacy mode this already includes the V1 check digit as its last digit.
    pub fn decimal_id(&self) -> u64 {
        self.decimal_id
    }

    /// The raw value, without separator.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The radix the value is rendered in.
    pub fn base(&self) -> u32 {
        self.base
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn mode(&self) -> ChecksumMode {
        self.mode
    }

    pub fn version(&self) -> ChecksumVersion {
        self.version
    }

    /// The positional part of the value.
    ///
    /// In appended mode this is the value without its trailing check symbol; otherwise the
    /// whole value is positional.
    pub fn core(&self) -> &str {
        match self.mode {
            ChecksumMode::Appended => match self.value.char_indices().last() {
                Some((last, _)) => &self.value[..last],
                None => "",
            },
            ChecksumMode::Legacy | ChecksumMode::Verbatim => &self.value,
        }
    }

    /// The trailing check symbol in appended mode.
    pub fn check_symbol(&self) -> Option<char> {
        match self.mode {
            ChecksumMode::Appended => self.value.chars().last(),
            ChecksumMode::Legacy | ChecksumMode::Verbatim => None,
        }
    }

    /// The display form with the separator inserted.
    pub fn display(&self) -> String {
        format_display(&self.value)
    }

    /// Validates this identifier with the version it carries.
    ///
    /// # Errors
    ///
    /// Propagates checksum errors; these only occur for identifiers built outside a [`Codec`].
    pub fn validate(&self) -> NpidResult<bool> {
        self.version.is_valid(&self.value, self.base)
    }
}

/// Unchecked field set, only used as the deserialization source for [`NationalPatientId`].
#[cfg(feature = "serde")]
#[derive(serde::Deserialize)]
struct RawNationalPatientId {
    decimal_id: u64,
    value: String,
    base: u32,
    size: usize,
    mode: ChecksumMode,
    version: ChecksumVersion,
}

#[cfg(feature = "serde")]
impl TryFrom<RawNationalPatientId> for NationalPatientId {
    type Error = NpidError;

    fn try_from(raw: RawNationalPatientId) -> Result<Self, Self::Error> {
        // the source radix is not stored; decimal is the only one every mode accepts
        let config = CodecConfig::new(
            DEFAULT_SOURCE_RADIX,
            raw.base,
            raw.size,
            raw.mode,
            raw.version,
        )?;
        let codec = Codec::new(config);

        if let Some(bad) = raw
            .value
            .chars()
            .find(|c| !alphabet::is_symbol(*c) || c.is_ascii_lowercase())
        {
            return Err(NpidError::InvalidCharacter(bad));
        }
        check_width(&raw.value, raw.size)?;

        let decimal_id = codec.decode(codec.positional(&raw.value))?;
        if decimal_id != raw.decimal_id {
            return Err(NpidError::InvalidConfig(format!(
                "decimal_id {} does not match value {:?} ({})",
                raw.decimal_id, raw.value, decimal_id
            )));
        }

        Ok(codec.build(decimal_id, raw.value))
    }
}

fn check_width(value: &str, size: usize) -> NpidResult<()> {
    let actual = value.chars().count();
    if actual != size {
        return Err(NpidError::InvalidLength {
            expected: size,
            actual,
        });
    }
    Ok(())
}

impl fmt::Display for NationalPatientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&format_display(&self.value))
    }
}

/// Generates, parses and validates identifiers for one [`CodecConfig`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Codec {
    config: CodecConfig,
}

impl Codec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// The all-zero identifier, returned for absent or empty input.
    pub fn zero(&self) -> NationalPatientId {
        self.build(0, base::pad("", self.config.size()))
    }

    fn build(&self, decimal_id: u64, value: String) -> NationalPatientId {
        NationalPatientId {
            decimal_id,
            value,
            base: self.config.target_radix(),
            size: self.config.size(),
            mode: self.config.mode(),
            version: self.config.version(),
        }
    }

    fn render(&self, decimal_id: u64, width: usize) -> NpidResult<String> {
        let encoded = base::encode(decimal_id, self.config.target_radix())?;
        if encoded.len() > width {
            return Err(NpidError::CapacityExceeded {
                encoded,
                size: width,
            });
        }
        Ok(base::pad(&encoded, width))
    }

    /// Generates the identifier for `input`.
    ///
    /// - `None` or an empty encoded value yields the all-zero identifier.
    /// - Legacy mode: `decimal_id = n * 10 + V1(n)`, rendered and padded to `size`.
    /// - Appended mode: `decimal_id = n`, rendered and padded to `size - 1`, followed by the
    ///   check symbol of the configured version computed over that padded core.
    /// - Verbatim mode: `decimal_id = n`, rendered and padded to `size`.
    ///
    /// # Errors
    ///
    /// - [`NpidError::NegativeOrNonIntegerInput`] for a decimal string that is not a plain
    ///   non-negative integer.
    /// - [`NpidError::InvalidCharacter`] for an encoded input outside the source radix.
    /// - [`NpidError::CapacityExceeded`] if the rendered value does not fit.
    /// - [`NpidError::Overflow`] if the decimal value does not fit in a `u64`.
    pub fn generate(&self, input: Option<&SequenceInput>) -> NpidResult<NationalPatientId> {
        let input = match input {
            Some(input) if !input.is_empty() => input,
            _ => return Ok(self.zero()),
        };

        let number = input.resolve(self.config.source_radix())?;
        let size = self.config.size();

        match self.config.mode() {
            ChecksumMode::Legacy => {
                let check = luhn_check_digit(number);
                let decimal_id = number
                    .checked_mul(10)
                    .and_then(|n| n.checked_add(u64::from(check)))
                    .ok_or(NpidError::Overflow)?;
                let value = self.render(decimal_id, size)?;
                Ok(self.build(decimal_id, value))
            }
            ChecksumMode::Appended => {
                let mut value = self.render(number, size - 1)?;
                let check = self.config.version().compute(&value)?;
                value.push(check);
                Ok(self.build(number, value))
            }
            ChecksumMode::Verbatim => {
                let value = self.render(number, size)?;
                Ok(self.build(number, value))
            }
        }
    }

    /// Generates the identifier for a decimal sequence number.
    pub fn generate_decimal(&self, number: u64) -> NpidResult<NationalPatientId> {
        self.generate(Some(&SequenceInput::Decimal(number)))
    }

    /// Lazily generates identifiers for every sequence number in `range`.
    ///
    /// Ranges are independent, so callers may split a large range across workers.
    pub fn generate_range(
        &self,
        range: RangeInclusive<u64>,
    ) -> impl Iterator<Item = NpidResult<NationalPatientId>> + '_ {
        range.map(move |number| self.generate_decimal(number))
    }

    /// Decodes a display or raw value from the target radix.
    ///
    /// The whole value is decoded; in appended mode use [`Codec::parse`] to drop the check
    /// symbol first.
    pub fn decode(&self, input: &str) -> NpidResult<u64> {
        base::decode(input, self.config.target_radix())
    }

    /// Returns true if `candidate` carries a correct check symbol for the configured version.
    ///
    /// Separators, whitespace and letter case are ignored.
    ///
    /// # Errors
    ///
    /// Returns [`NpidError::InvalidCharacter`] if `candidate` contains a character outside the
    /// alphabet.
    pub fn validate(&self, candidate: &str) -> NpidResult<bool> {
        let normalised = strip_separators(candidate);
        let version = self.config.version();
        let valid = version.is_valid(&normalised, self.config.target_radix())?;
        if !valid {
            tracing::debug!(candidate = %normalised, %version, "check symbol mismatch");
        }
        Ok(valid)
    }

    /// Parses a display or raw value into an identifier, checking width and check symbol.
    ///
    /// # Errors
    ///
    /// - [`NpidError::InvalidCharacter`] for characters outside the alphabet.
    /// - [`NpidError::InvalidLength`] if the value is not exactly `size` symbols.
    /// - [`NpidError::ChecksumMismatch`] if the check symbol is wrong.
    pub fn parse(&self, input: &str) -> NpidResult<NationalPatientId> {
        let value = strip_separators(input);
        if let Some(bad) = value.chars().find(|c| !alphabet::is_symbol(*c)) {
            return Err(NpidError::InvalidCharacter(bad));
        }

        check_width(&value, self.config.size())?;

        if !self.validate(&value)? {
            return Err(NpidError::ChecksumMismatch(value));
        }

        let decimal_id = self.decode(self.positional(&value))?;

        Ok(self.build(decimal_id, value))
    }

    /// The part of an already width-checked value that encodes `decimal_id`.
    fn positional<'a>(&self, value: &'a str) -> &'a str {
        match self.config.mode() {
            ChecksumMode::Appended => &value[..self.config.size() - 1],
            ChecksumMode::Legacy | ChecksumMode::Verbatim => value,
        }
    }
}
