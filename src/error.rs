//! Structured error handling and exit codes.

use serde::Serialize;

/// Exit codes for the s3grep application.
///
/// - 0: Success (scan completed, matches found)
/// - 1: General error (credentials, malformed cache, unexpected failure)
/// - 2: No matches (scan completed normally, nothing matched)
/// - 3: Partial success (completed with non-fatal errors or an aborted listing)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Scan completed and at least one object matched.
    Success = 0,
    /// An unexpected or fatal error occurred.
    GeneralError = 1,
    /// Scan completed but no object contained the substring.
    NoMatches = 2,
    /// Scan finished with some non-fatal errors or partial listing data.
    PartialSuccess = 3,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "SG000",
            Self::GeneralError => "SG001",
            Self::NoMatches => "SG002",
            Self::PartialSuccess => "SG003",
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "SG001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
        }
    }
}
