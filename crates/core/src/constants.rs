//! Constants shared by the codec and its callers.

/// Display separator inserted after the third character of an identifier.
pub const SEPARATOR: char = '-';

/// Number of characters shown before the separator in the display form.
pub const DISPLAY_GROUP_LEN: usize = 3;

/// Default identifier width, including any check symbol.
pub const DEFAULT_SIZE: usize = 6;

/// Default radix of incoming sequence numbers.
pub const DEFAULT_SOURCE_RADIX: u32 = 10;

/// Default radix identifiers are rendered in.
pub const DEFAULT_TARGET_RADIX: u32 = 30;

/// Smallest radix the base converter accepts.
pub const MIN_RADIX: u32 = 2;
