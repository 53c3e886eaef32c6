//! # NPID Core
//!
//! Generation and validation of National Patient IDs.
//!
//! A national patient ID is a short, fixed-width string that clinicians and clerks can copy by
//! hand or read over the phone. It is derived from a decimal sequence number and rendered in a
//! 30-symbol alphabet that leaves out letters easily confused with digits. A check symbol lets a
//! mistyped ID be rejected without looking it up anywhere.
//!
//! ## Example
//!
//! ```
//! use npid_core::{Codec, CodecConfig};
//!
//! # fn main() -> Result<(), npid_core::NpidError> {
//! let codec = Codec::new(CodecConfig::default());
//! let id = codec.generate_decimal(20)?;
//!
//! assert_eq!(id.to_string(), "000-06V");
//! assert_eq!(id.decimal_id(), 206);
//! assert!(codec.validate("000-06V")?);
//! # Ok(())
//! # }
//! ```
//!
//! ## Checksum modes
//! - **Legacy**: a V1 (Luhn) check digit is appended to the decimal sequence number, and the
//!   result is encoded. `decode(value)` gives back the full decimal including the check digit.
//! - **Appended**: the sequence number is encoded, and a V2 or V3 check symbol is appended.
//! - **Verbatim**: an already-checked value is re-rendered and padded.
//!
//! The crate is pure: no I/O, no global state. Every type is `Send + Sync`, and a [`Codec`] can
//! be shared across threads without locking.
//!
//! **No export concerns**: SQL and JSON batch generation live in `npid-export`.

pub mod alphabet;
pub mod base;
pub mod checksum;
pub mod config;
pub mod constants;
mod error;
pub mod format;
mod identifier;

pub use checksum::ChecksumVersion;
pub use config::{ChecksumMode, CodecConfig};
pub use error::{NpidError, NpidResult};
pub use format::{format_display, strip_separators};
pub use identifier::{Codec, NationalPatientId, SequenceInput};
