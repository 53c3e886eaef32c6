//! Chunked JSON documents for document-store bulk import.
//!
//! Each identifier becomes one document keyed by a running counter:
//!
//! ```json
//! { "_id": "1", "national_id": "00006V", "decimal_id": 206 }
//! ```
//!
//! Documents are grouped into batches of `chunk_size` and each batch is written as
//! `{ "docs": [...] }` to its own file, `<prefix>_0001.json`, `<prefix>_0002.json`, and so on.
//! Every written file is recorded in `<prefix>.log` in the same directory.
//!
//! Shuffling spreads consecutive identifiers across batches, so that identifiers handed out from
//! one import do not follow each other numerically.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use npid_core::Codec;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{check_range, ExportError, ExportResult};

/// One identifier as stored in the document store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdDocument {
    /// Running counter over the exported range, starting at 1
    #[serde(rename = "_id")]
    pub id: String,

    /// Identifier value without separators
    pub national_id: String,

    /// Decimal form of the identifier
    pub decimal_id: u64,
}

/// A bulk-import request body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Batch {
    pub docs: Vec<IdDocument>,
}

/// Controls how a range is split into batch files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchOptions {
    /// Maximum number of documents per batch
    pub chunk_size: usize,

    /// Shuffle identifiers before numbering and chunking
    pub shuffle: bool,

    /// File name prefix for batch and log files
    pub file_prefix: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            shuffle: false,
            file_prefix: "national_patient_ids".into(),
        }
    }
}

/// Result of writing batches to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    /// Batch files in write order
    pub files: Vec<PathBuf>,

    /// Total documents written
    pub documents: usize,

    /// Log file the batches were recorded in
    pub log_file: PathBuf,
}

/// Builds the batches for every sequence number from `start` to `end` inclusive.
///
/// The running counter follows the final (possibly shuffled) order. `rng` is only used when
/// `options.shuffle` is set.
///
/// # Errors
///
/// - [`ExportError::InvalidRange`] if `start > end`
/// - [`ExportError::InvalidChunkSize`] if `options.chunk_size` is 0
/// - [`ExportError::Npid`] for the first identifier that cannot be generated
pub fn build_batches<R: Rng + ?Sized>(
    codec: &Codec,
    start: u64,
    end: u64,
    options: &BatchOptions,
    rng: &mut R,
) -> ExportResult<Vec<Batch>> {
    check_range(start, end)?;
    if options.chunk_size == 0 {
        return Err(ExportError::InvalidChunkSize);
    }

    let mut ids = codec
        .generate_range(start..=end)
        .collect::<Result<Vec<_>, _>>()?;
    if options.shuffle {
        ids.shuffle(rng);
    }

    let docs: Vec<IdDocument> = ids
        .into_iter()
        .enumerate()
        .map(|(index, id)| IdDocument {
            id: (index + 1).to_string(),
            national_id: id.value().to_string(),
            decimal_id: id.decimal_id(),
        })
        .collect();

    Ok(docs
        .chunks(options.chunk_size)
        .map(|chunk| Batch {
            docs: chunk.to_vec(),
        })
        .collect())
}

fn check_prefix(prefix: &str) -> ExportResult<()> {
    if prefix.is_empty() || prefix.chars().any(|c| c == '/' || c == '\\') {
        return Err(ExportError::InvalidPrefix(prefix.to_string()));
    }
    Ok(())
}

/// Writes `batches` into `dir` and appends one line per file to the log.
///
/// `dir` is created if it does not exist. Existing batch files with the same names are
/// overwritten; the log is appended to.
///
/// # Errors
///
/// - [`ExportError::InvalidPrefix`] if `options.file_prefix` is empty or contains a path
///   separator
/// - [`ExportError::Io`] if a file cannot be written
/// - [`ExportError::Serialization`] if a batch cannot be encoded
pub fn write_batches(
    dir: &Path,
    batches: &[Batch],
    options: &BatchOptions,
) -> ExportResult<ExportSummary> {
    check_prefix(&options.file_prefix)?;
    fs::create_dir_all(dir)?;

    let log_file = dir.join(format!("{}.log", options.file_prefix));
    let mut log = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file)?;

    let mut files = Vec::with_capacity(batches.len());
    let mut documents = 0;

    for (index, batch) in batches.iter().enumerate() {
        let file_name = format!("{}_{:04}.json", options.file_prefix, index + 1);
        let path = dir.join(&file_name);

        let body = serde_json::to_string_pretty(batch).map_err(ExportError::Serialization)?;
        fs::write(&path, body)?;
        writeln!(
            log,
            "{} {} {}",
            Utc::now().to_rfc3339(),
            file_name,
            batch.docs.len()
        )?;

        tracing::info!(file = %path.display(), docs = batch.docs.len(), "wrote batch");
        documents += batch.docs.len();
        files.push(path);
    }

    Ok(ExportSummary {
        files,
        documents,
        log_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(7)
    }

    fn options(chunk_size: usize, shuffle: bool) -> BatchOptions {
        BatchOptions {
            chunk_size,
            shuffle,
            ..BatchOptions::default()
        }
    }

    #[test]
    fn test_build_batches_chunks_in_order() {
        let batches =
            build_batches(&Codec::default(), 1, 25, &options(10, false), &mut rng()).unwrap();

        assert_eq!(batches.len(), 3);
        assert_eq!(batches[0].docs.len(), 10);
        assert_eq!(batches[2].docs.len(), 5);

        let doc = &batches[1].docs[9];
        assert_eq!(doc.id, "20");
        assert_eq!(doc.national_id, "00006V");
        assert_eq!(doc.decimal_id, 206);
    }

    #[test]
    fn test_national_id_has_no_separator() {
        let batches =
            build_batches(&Codec::default(), 1, 50, &options(100, false), &mut rng()).unwrap();
        assert!(batches[0].docs.iter().all(|d| !d.national_id.contains('-')));
        assert!(batches[0].docs.iter().all(|d| d.national_id.len() == 6));
    }

    #[test]
    fn test_shuffle_keeps_every_identifier_once() {
        let batches =
            build_batches(&Codec::default(), 1, 200, &options(64, true), &mut rng()).unwrap();

        let docs: Vec<&IdDocument> = batches.iter().flat_map(|b| b.docs.iter()).collect();
        assert_eq!(docs.len(), 200);

        let values: HashSet<&str> = docs.iter().map(|d| d.national_id.as_str()).collect();
        assert_eq!(values.len(), 200);

        // counter follows the shuffled order
        let counters: Vec<String> = docs.iter().map(|d| d.id.clone()).collect();
        let expected: Vec<String> = (1..=200).map(|n: usize| n.to_string()).collect();
        assert_eq!(counters, expected);

        let ordered =
            build_batches(&Codec::default(), 1, 200, &options(64, false), &mut rng()).unwrap();
        assert_ne!(batches, ordered);
    }

    #[test]
    fn test_build_batches_rejects_zero_chunk() {
        let result = build_batches(&Codec::default(), 1, 5, &options(0, false), &mut rng());
        assert!(matches!(result, Err(ExportError::InvalidChunkSize)));
    }

    #[test]
    fn test_build_batches_rejects_reversed_range() {
        let result = build_batches(&Codec::default(), 9, 1, &options(5, false), &mut rng());
        assert!(matches!(result, Err(ExportError::InvalidRange { .. })));
    }

    #[test]
    fn test_document_json_shape() {
        let doc = IdDocument {
            id: "1".into(),
            national_id: "00006V".into(),
            decimal_id: 206,
        };
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "_id": "1", "national_id": "00006V", "decimal_id": 206 })
        );
    }

    #[test]
    fn test_write_batches_creates_files_and_log() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let opts = options(10, false);
        let batches = build_batches(&Codec::default(), 1, 25, &opts, &mut rng()).unwrap();

        let summary = write_batches(&out, &batches, &opts).unwrap();

        assert_eq!(summary.documents, 25);
        assert_eq!(summary.files.len(), 3);
        assert_eq!(
            summary.files[0].file_name().unwrap(),
            "national_patient_ids_0001.json"
        );

        let body = fs::read_to_string(&summary.files[2]).unwrap();
        let batch: Batch = serde_json::from_str(&body).unwrap();
        assert_eq!(batch, batches[2]);

        let log = fs::read_to_string(&summary.log_file).unwrap();
        let lines: Vec<&str> = log.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("national_patient_ids_0001.json 10"));
        assert!(lines[2].ends_with("national_patient_ids_0003.json 5"));
    }

    #[test]
    fn test_write_batches_rejects_path_prefix() {
        let temp = TempDir::new().unwrap();
        let out = temp.path().join("out");
        let batches =
            build_batches(&Codec::default(), 1, 5, &options(5, false), &mut rng()).unwrap();

        for prefix in ["../escape", "a/b", "a\\b", ""] {
            let opts = BatchOptions {
                file_prefix: prefix.into(),
                ..options(5, false)
            };
            let result = write_batches(&out, &batches, &opts);
            assert!(
                matches!(result, Err(ExportError::InvalidPrefix(_))),
                "{prefix:?} should be rejected"
            );
        }

        assert!(!out.exists());
        assert!(!temp.path().join("escape.log").exists());
    }

    #[test]
    fn test_write_batches_appends_to_log() {
        let temp = TempDir::new().unwrap();
        let opts = BatchOptions {
            chunk_size: 5,
            shuffle: false,
            file_prefix: "ids".into(),
        };
        let batches = build_batches(&Codec::default(), 1, 5, &opts, &mut rng()).unwrap();

        write_batches(temp.path(), &batches, &opts).unwrap();
        let summary = write_batches(temp.path(), &batches, &opts).unwrap();

        assert_eq!(summary.log_file, temp.path().join("ids.log"));
        let log = fs::read_to_string(&summary.log_file).unwrap();
        assert_eq!(log.lines().count(), 2);
    }
}
