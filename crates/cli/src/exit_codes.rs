//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract: audit scripts branch on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success, no high-risk items                               |
//! | 1    | Revenue leakage found (at least one High-risk item)       |
//! | 2    | CLI usage error (bad args)                                |
//! | 3    | Invalid config (TOML parse or validation)                 |
//! | 4    | Input validation (missing column, bad amount, empty data) |
//! | 5    | Runtime error (file IO, output write)                     |
//!
//! Like `diff(1)`, exit 1 means "found something", not "crashed".

use revguard_recon::ReconError;

/// Success - no item classified High risk.
pub const EXIT_SUCCESS: u8 = 0;

/// At least one invoice line has no supporting clinical documentation.
pub const EXIT_LEAKAGE_FOUND: u8 = 1;

/// Usage error - bad arguments. Clap exits with this code on its own.
pub const EXIT_USAGE: u8 = 2;

/// Config file failed to parse or validate.
pub const EXIT_INVALID_CONFIG: u8 = 3;

/// Input data rejected before matching (missing column, bad amount, empty or malformed CSV).
pub const EXIT_INPUT_VALIDATION: u8 = 4;

/// Cannot read inputs or write outputs.
pub const EXIT_RUNTIME: u8 = 5;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => EXIT_INVALID_CONFIG,
        ReconError::Csv(_) => EXIT_INPUT_VALIDATION,
        ReconError::Io(_) => EXIT_RUNTIME,
        e if e.is_validation() => EXIT_INPUT_VALIDATION,
        _ => EXIT_RUNTIME,
    }
}
