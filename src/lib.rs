//! s3grep - Substring Search Across an S3 Bucket
//!
//! Scans every object in a bucket, classifies each one (text, binary,
//! folder marker, access denied, non-standard storage class, unreadable),
//! and reports which text objects contain a target substring. A persisted
//! per-bucket cache keyed by object key and ETag makes repeated scans skip
//! unchanged objects entirely.

pub mod cache;
pub mod classify;
pub mod cli;
pub mod error;
pub mod logging;
pub mod progress;
pub mod remote;
pub mod scanner;

use crate::cache::CacheStore;
use crate::cli::{Cli, OutputFormat};
use crate::error::ExitCode;
use crate::progress::Progress;
use crate::remote::S3Store;
use crate::scanner::{Finder, ScanReport};
use anyhow::Result;

/// Run a full scan from parsed CLI arguments and report the outcome.
pub async fn run_app(cli: Cli) -> Result<ExitCode> {
    let store = S3Store::connect(cli.region.clone(), cli.endpoint_url.clone()).await;

    let cache_store = if cli.no_cache {
        CacheStore::disabled()
    } else {
        let path = cli
            .cache
            .clone()
            .unwrap_or_else(|| CacheStore::default_path(&cli.bucket));
        CacheStore::new(path)
    };

    // Progress bars would corrupt a JSON report piped to stdout.
    let show_progress = !cli.quiet && cli.output == OutputFormat::Text;
    let progress = Progress::new(!show_progress);

    let finder = Finder::new(&store, &cache_store, &progress).with_batch_size(cli.batch_size);
    let report = finder.scan(&cli.bucket, &cli.substring).await?;

    match cli.output {
        OutputFormat::Text => report.print_summary(&cli.substring, cli.debug),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    Ok(exit_code_for(&report))
}

/// Map a finished scan to its process exit code.
fn exit_code_for(report: &ScanReport) -> ExitCode {
    if report.listing_error.is_some() || report.had_object_errors() {
        ExitCode::PartialSuccess
    } else if report.matched_keys().is_empty() {
        ExitCode::NoMatches
    } else {
        ExitCode::Success
    }
}
