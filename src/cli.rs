//! Command-line interface definitions for s3grep.
//!
//! All arguments use the clap derive API, following standard conventions
//! for verbosity and output control.
//!
//! # Example
//!
//! ```bash
//! # Search every text object in a bucket for a substring
//! s3grep my-bucket "connection refused"
//!
//! # Print every per-category key list in the summary
//! s3grep my-bucket "connection refused" --debug
//!
//! # Machine-readable report for scripting
//! s3grep my-bucket "connection refused" --output json
//!
//! # S3-compatible services
//! s3grep my-bucket needle --endpoint-url http://localhost:9000
//! ```

use crate::scanner::DEFAULT_BATCH_SIZE;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Search for a substring in text objects within an S3 bucket.
///
/// Objects are classified (text, binary, folder marker, access denied,
/// non-standard storage class, unreadable) and text objects are searched
/// for the substring. A local cache keyed by object key and ETag lets
/// repeated scans skip unchanged objects.
#[derive(Debug, Parser)]
#[command(name = "s3grep")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The name of the S3 bucket
    #[arg(value_name = "BUCKET")]
    pub bucket: String,

    /// The substring to search for (case-sensitive)
    #[arg(value_name = "SUBSTRING")]
    pub substring: String,

    /// Print per-category object key listings in the final summary
    #[arg(long)]
    pub debug: bool,

    /// Number of objects per processing batch
    #[arg(long, value_name = "N", default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Path to the classification cache file
    ///
    /// If not specified, `s3grep-cache-<bucket>.json` in the working
    /// directory is used.
    #[arg(long, value_name = "PATH")]
    pub cache: Option<PathBuf>,

    /// Disable the classification cache
    #[arg(long, conflicts_with = "cache")]
    pub no_cache: bool,

    /// Output format for the final report
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Custom S3 endpoint URL (MinIO, Backblaze, and other S3-compatible services)
    #[arg(long, value_name = "URL", env = "AWS_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// AWS region override
    #[arg(long, value_name = "REGION")]
    pub region: Option<String>,

    /// Emit fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors and the final report
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Output format for the final report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary on stdout
    Text,
    /// The full scan report as a JSON document
    Json,
}
