#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NpidError {
    #[error("invalid character {0:?}: not in the national patient ID alphabet")]
    InvalidCharacter(char),
    #[error("digit value {0} is outside the alphabet range")]
    InvalidDigit(u32),
    #[error("unsupported checksum version: {0:?}")]
    InvalidChecksumVersion(String),
    #[error("sequence number must be a non-negative integer, got: {0:?}")]
    NegativeOrNonIntegerInput(String),
    #[error("radix {0} is not supported (must be between 2 and 30)")]
    InvalidRadix(u32),
    #[error("encoded value {encoded:?} does not fit in {size} characters")]
    CapacityExceeded { encoded: String, size: usize },
    #[error("value exceeds the 64-bit decimal range")]
    Overflow,
    #[error("invalid codec configuration: {0}")]
    InvalidConfig(String),
    #[error("identifier must be {expected} characters, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("check symbol mismatch for identifier '{0}'")]
    ChecksumMismatch(String),
}

pub type NpidResult<T> = std::result::Result<T, NpidError>;
