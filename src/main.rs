use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use npid_core::config::{
    checksum_mode_from_env_value, checksum_version_from_env_value, default_version_for,
    number_from_env_value,
};
use npid_core::constants::{DEFAULT_SIZE, DEFAULT_SOURCE_RADIX, DEFAULT_TARGET_RADIX};
use npid_core::{ChecksumMode, ChecksumVersion, Codec, CodecConfig, SequenceInput};
use npid_export::{BatchOptions, build_batches, ids_sql, table_sql, write_batches};

#[derive(Parser)]
#[command(name = "npid")]
#[command(about = "National Patient ID generator and validator")]
struct Cli {
    /// Checksum mode: legacy, appended or verbatim [env: NPID_CHECKSUM_MODE]
    #[arg(long, global = true)]
    mode: Option<ChecksumMode>,
    /// Checksum version: 1, 2 or 3 [env: NPID_CHECKSUM_VERSION]
    #[arg(long = "checksum-version", global = true)]
    checksum_version: Option<ChecksumVersion>,
    /// Identifier width including the check symbol [env: NPID_SIZE]
    #[arg(long, global = true)]
    size: Option<usize>,
    /// Radix of incoming sequence numbers [env: NPID_SOURCE_RADIX]
    #[arg(long, global = true)]
    source_radix: Option<u32>,
    /// Radix identifiers are rendered in [env: NPID_TARGET_RADIX]
    #[arg(long, global = true)]
    target_radix: Option<u32>,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the table definition and INSERT statement for a range of sequence numbers
    Sql {
        /// First sequence number
        start: u64,
        /// Last sequence number (inclusive)
        end: u64,
    },
    /// Write chunked JSON bulk-import documents for a range of sequence numbers
    Json {
        /// First sequence number
        start: u64,
        /// Last sequence number (inclusive)
        end: u64,
        /// Output directory
        #[arg(long)]
        out: PathBuf,
        /// Documents per file
        #[arg(long, default_value_t = 1000)]
        chunk_size: usize,
        /// Shuffle identifiers before numbering
        #[arg(long)]
        shuffle: bool,
        /// File name prefix for batch and log files
        #[arg(long, default_value = "national_patient_ids")]
        prefix: String,
    },
    /// Generate the identifier for one sequence number
    Generate {
        /// Sequence number, in the source radix
        sequence: String,
    },
    /// Check an identifier's check symbol
    Validate {
        /// Identifier, with or without separator
        id: String,
    },
    /// Decode an identifier to its decimal value
    Decode {
        /// Identifier, with or without separator
        id: String,
        /// Radix to decode from (defaults to the target radix)
        #[arg(long)]
        radix: Option<u32>,
    },
}

/// Resolve the codec configuration once, before any command runs.
///
/// Command-line flags win over environment variables; unset or empty variables fall back to
/// the legacy defaults.
fn resolve_config(cli: &Cli) -> anyhow::Result<CodecConfig> {
    let env = |name: &str| std::env::var(name).ok();

    let mode = match cli.mode {
        Some(mode) => mode,
        None => checksum_mode_from_env_value(env("NPID_CHECKSUM_MODE"))?,
    };
    let version = match cli.checksum_version {
        Some(version) => version,
        None => checksum_version_from_env_value(env("NPID_CHECKSUM_VERSION"))?
            .unwrap_or_else(|| default_version_for(mode)),
    };
    let size = match cli.size {
        Some(size) => size,
        None => number_from_env_value("NPID_SIZE", env("NPID_SIZE"), DEFAULT_SIZE)?,
    };
    let source_radix = match cli.source_radix {
        Some(radix) => radix,
        None => number_from_env_value(
            "NPID_SOURCE_RADIX",
            env("NPID_SOURCE_RADIX"),
            DEFAULT_SOURCE_RADIX,
        )?,
    };
    let target_radix = match cli.target_radix {
        Some(radix) => radix,
        None => number_from_env_value(
            "NPID_TARGET_RADIX",
            env("NPID_TARGET_RADIX"),
            DEFAULT_TARGET_RADIX,
        )?,
    };

    Ok(CodecConfig::new(
        source_radix,
        target_radix,
        size,
        mode,
        version,
    )?)
}

/// Entry point for the `npid` command.
///
/// Logs go to stderr so that stdout carries only SQL, identifiers and results.
///
/// # Environment Variables
/// - `NPID_CHECKSUM_MODE`: `legacy` (default), `appended` or `verbatim`
/// - `NPID_CHECKSUM_VERSION`: `1`, `2` or `3` (defaults to the mode's version)
/// - `NPID_SIZE`: identifier width (default 6)
/// - `NPID_SOURCE_RADIX` / `NPID_TARGET_RADIX`: default 10 / 30
/// - `RUST_LOG`: log filter
fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("npid=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    tracing::debug!(
        mode = %config.mode(),
        version = %config.version(),
        size = config.size(),
        "resolved codec configuration"
    );
    let codec = Codec::new(config);

    match cli.command {
        Some(Commands::Sql { start, end }) => {
            println!("{}", table_sql());
            println!("{}", ids_sql(&codec, start, end)?);
        }
        Some(Commands::Json {
            start,
            end,
            out,
            chunk_size,
            shuffle,
            prefix,
        }) => {
            let options = BatchOptions {
                chunk_size,
                shuffle,
                file_prefix: prefix,
            };
            let batches = build_batches(&codec, start, end, &options, &mut rand::thread_rng())?;
            let summary = write_batches(&out, &batches, &options)?;
            tracing::info!(
                "++ Exported {} ids to {}",
                summary.documents,
                out.display()
            );
            println!(
                "Wrote {} documents in {} files (log: {})",
                summary.documents,
                summary.files.len(),
                summary.log_file.display()
            );
        }
        Some(Commands::Generate { sequence }) => {
            let id = codec.generate(Some(&SequenceInput::Encoded(sequence)))?;
            println!("{}\t{}", id, id.decimal_id());
        }
        Some(Commands::Validate { id }) => {
            if codec.validate(&id)? {
                println!("valid");
            } else {
                println!("invalid");
                return Ok(ExitCode::FAILURE);
            }
        }
        Some(Commands::Decode { id, radix }) => {
            let decimal = match radix {
                Some(radix) => npid_core::base::decode(&id, radix)?,
                None => codec.decode(&id)?,
            };
            println!("{}", decimal);
        }
        None => {
            println!("Use 'npid --help' for commands");
        }
    }

    Ok(ExitCode::SUCCESS)
}
