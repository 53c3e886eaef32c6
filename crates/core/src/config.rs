//! Codec configuration.
//!
//! Configuration is resolved once at process startup and passed into [`Codec`](crate::Codec).
//! Nothing in the codec reads environment variables or other process-wide state, so the
//! checksum version in effect is always an explicit value that tests can set directly.

use std::fmt;
use std::str::FromStr;

use crate::alphabet::ALPHABET_LEN;
use crate::checksum::ChecksumVersion;
use crate::constants::{DEFAULT_SIZE, DEFAULT_SOURCE_RADIX, DEFAULT_TARGET_RADIX, MIN_RADIX};
use crate::{NpidError, NpidResult};

/// How the check symbol is attached to an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ChecksumMode {
    /// A V1 check digit is appended to the decimal sequence number before base conversion.
    /// Every character of the value is part of the positional encoding.
    Legacy,
    /// The sequence number is encoded and one check symbol is appended to the padded core.
    Appended,
    /// The input already carries its check symbol and is only re-rendered and padded.
    Verbatim,
}

impl fmt::Display for ChecksumMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChecksumMode::Legacy => "legacy",
            ChecksumMode::Appended => "appended",
            ChecksumMode::Verbatim => "verbatim",
        };
        f.write_str(name)
    }
}

impl FromStr for ChecksumMode {
    type Err = NpidError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "legacy" => Ok(ChecksumMode::Legacy),
            "appended" => Ok(ChecksumMode::Appended),
            "verbatim" => Ok(ChecksumMode::Verbatim),
            other => Err(NpidError::InvalidConfig(format!(
                "unknown checksum mode '{other}' (expected legacy, appended or verbatim)"
            ))),
        }
    }
}

/// Codec configuration resolved at startup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodecConfig {
    source_radix: u32,
    target_radix: u32,
    size: usize,
    mode: ChecksumMode,
    version: ChecksumVersion,
}

impl Default for CodecConfig {
    /// The legacy configuration: decimal input, base-30 output, six characters, V1.
    ///
    /// Identifiers already in circulation were issued with this configuration.
    fn default() -> Self {
        Self {
            source_radix: DEFAULT_SOURCE_RADIX,
            target_radix: DEFAULT_TARGET_RADIX,
            size: DEFAULT_SIZE,
            mode: ChecksumMode::Legacy,
            version: ChecksumVersion::V1,
        }
    }
}

impl CodecConfig {
    /// Create a new `CodecConfig`.
    ///
    /// # Errors
    ///
    /// - [`NpidError::InvalidRadix`] if either radix is outside `2..=30`.
    /// - [`NpidError::InvalidConfig`] if `size` leaves no room for the value, or the mode and
    ///   version do not belong together (`Legacy` needs V1 and decimal input; `Appended`
    ///   needs V2 or V3).
    pub fn new(
        source_radix: u32,
        target_radix: u32,
        size: usize,
        mode: ChecksumMode,
        version: ChecksumVersion,
    ) -> NpidResult<Self> {
        for radix in [source_radix, target_radix] {
            if !(MIN_RADIX..=ALPHABET_LEN).contains(&radix) {
                return Err(NpidError::InvalidRadix(radix));
            }
        }

        let min_size = if mode == ChecksumMode::Appended { 2 } else { 1 };
        if size < min_size {
            return Err(NpidError::InvalidConfig(format!(
                "size must be at least {min_size} for {mode} mode, got {size}"
            )));
        }

        if mode == ChecksumMode::Legacy && source_radix != DEFAULT_SOURCE_RADIX {
            return Err(NpidError::InvalidConfig(format!(
                "legacy mode needs decimal input, got source radix {source_radix}"
            )));
        }

        match (mode, version) {
            (ChecksumMode::Legacy, ChecksumVersion::V2 | ChecksumVersion::V3) => {
                return Err(NpidError::InvalidConfig(format!(
                    "legacy mode folds a V1 check digit into the decimal value; {version} is not supported"
                )));
            }
            (ChecksumMode::Appended, ChecksumVersion::V1) => {
                return Err(NpidError::InvalidConfig(
                    "appended mode needs an alphabet checksum (v2 or v3)".into(),
                ));
            }
            _ => {}
        }

        Ok(Self {
            source_radix,
            target_radix,
            size,
            mode,
            version,
        })
    }

    /// The current configuration: decimal input, base-30 output, six characters, V2 appended.
    pub fn current() -> Self {
        Self {
            mode: ChecksumMode::Appended,
            version: ChecksumVersion::V2,
            ..Self::default()
        }
    }

    pub fn source_radix(&self) -> u32 {
        self.source_radix
    }

    pub fn target_radix(&self) -> u32 {
        self.target_radix
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
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse the checksum version from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `None` so the caller can fall back to the
/// version implied by the checksum mode.
pub fn checksum_version_from_env_value(
    value: Option<String>,
) -> NpidResult<Option<ChecksumVersion>> {
    non_empty(value).map(|v| v.parse()).transpose()
}

/// Parse the checksum mode from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns [`ChecksumMode::Legacy`].
pub fn checksum_mode_from_env_value(value: Option<String>) -> NpidResult<ChecksumMode> {
    let parsed = non_empty(value).map(|v| v.parse()).transpose()?;
    Ok(parsed.unwrap_or(ChecksumMode::Legacy))
}

/// Parse a numeric setting (size or radix) from an optional string value.
///
/// If `value` is `None` or empty/whitespace, returns `default`.
pub fn number_from_env_value<T: FromStr>(
    name: &str,
    value: Option<String>,
    default: T,
) -> NpidResult<T> {
    match non_empty(value) {
        Some(v) => v
            .parse()
            .map_err(|_| NpidError::InvalidConfig(format!("{name} must be a number, got '{v}'"))),
        None => Ok(default),
    }
}

/// The version a mode uses when none is configured explicitly.
pub fn default_version_for(mode: ChecksumMode) -> ChecksumVersion {
    match mode {
        ChecksumMode::Legacy | ChecksumMode::Verbatim => ChecksumVersion::V1,
        ChecksumMode::Appended => ChecksumVersion::V2,
    }
}
