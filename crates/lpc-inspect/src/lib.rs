//! LPC Inspect - CLI for looking inside signed peer data
//!
//! This crate provides a command-line interface for:
//! - Parsing and matching versioned protocol strings
//! - Sealing peer records with a seed-derived key
//! - Opening and verifying sealed envelopes
//! - Decoding bare peer records

pub mod cli;
pub mod output;

pub use cli::Cli;
pub use output::{JsonResponse, OutputFormat, OutputFormatter};

/// Exit codes for CLI operations
///
/// - 0: Success
/// - 1: General error
/// - 2: Verification failed - the envelope did not open
/// - 3: Invalid input - bad arguments or undecodable data
/// - 4: No match - the protocols are not compatible
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    VerificationFailed = 2,
    InvalidInput = 3,
    NoMatch = 4,
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl ExitCode {
    /// Convert to process exit code
    pub fn to_exit_code(self) -> std::process::ExitCode {
        std::process::ExitCode::from(self as u8)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExitCode::Success => "SUCCESS",
            ExitCode::GeneralError => "GENERAL_ERROR",
            ExitCode::VerificationFailed => "VERIFICATION_FAILED",
            ExitCode::InvalidInput => "INVALID_INPUT",
            ExitCode::NoMatch => "NO_MATCH",
        }
    }
}
