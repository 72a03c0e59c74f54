//! CLI Exit Code Registry
//!
//! Single source of truth for `scoreline` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                             |
//! |------|-----------------------------------------------------|
//! | 0    | Success                                             |
//! | 1    | General error (unspecified)                         |
//! | 2    | CLI usage error (bad args, missing subcommand)      |
//! | 3    | Score mismatches found (`fail_on_mismatch` only)    |
//! | 4    | Invalid config                                      |
//! | 5    | Runtime error (IO, malformed input)                 |

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing subcommand.
pub const EXIT_USAGE: u8 = 2;

/// Provider and event tallies disagree on at least one match and the
/// config sets `fail_on_mismatch`.
pub const EXIT_RECON_MISMATCH: u8 = 3;

/// Config could not be parsed or failed validation.
pub const EXIT_RECON_INVALID_CONFIG: u8 = 4;

/// Input files unreadable or malformed, output not writable.
pub const EXIT_RECON_RUNTIME: u8 = 5;
