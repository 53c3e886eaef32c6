//! NPID Export
//!
//! Bulk export of national patient IDs for loading into external stores.
//!
//! - [`sql`] produces the table definition and a batched `INSERT` statement for a relational
//!   database.
//! - [`json`] produces chunked bulk-import documents for a document store and writes them to
//!   disk alongside a log file.
//!
//! Both are thin wrappers over [`npid_core::Codec`]: they decide nothing about the identifiers
//! themselves, only how a range of them is laid out.

pub mod json;
pub mod sql;

pub use json::{build_batches, write_batches, Batch, BatchOptions, ExportSummary, IdDocument};
pub use sql::{ids_sql, table_sql};

/// Errors that can occur during export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The range end is before its start
    #[error("Invalid range: start {start} is greater than end {end}")]
    InvalidRange { start: u64, end: u64 },

    /// Batches must hold at least one document
    #[error("Chunk size must be at least 1")]
    InvalidChunkSize,

    /// File prefixes name files inside the output directory and cannot contain a path
    #[error("Invalid file prefix {0:?}: must be a plain file name")]
    InvalidPrefix(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Document serialisation failed
    #[error("failed to serialize batch: {0}")]
    Serialization(serde_json::Error),

    /// Identifier generation failed
    #[error("identifier error: {0}")]
    Npid(#[from] npid_core::NpidError),
}

pub type ExportResult<T> = std::result::Result<T, ExportError>;

pub(crate) fn check_range(start: u64, end: u64) -> ExportResult<()> {
    if start > end {
        return Err(ExportError::InvalidRange { start, end });
    }
    Ok(())
}
