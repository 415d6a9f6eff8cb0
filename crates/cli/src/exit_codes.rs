//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, bad flags)    |
//! | 3-9     | import/classify  | Input and classification codes           |
//! | 20-29   | export           | Output writing codes                     |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

use receiptdeck_engine::EngineError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Import / classify (3-9)
// =============================================================================

/// Input file cannot be read (missing, permission denied).
pub const EXIT_IMPORT_UNREADABLE: u8 = 3;

/// Input could not be parsed into records (bad CSV, no header,
/// duplicate header columns).
pub const EXIT_IMPORT_MALFORMED: u8 = 4;

/// A required column is missing from the header.
pub const EXIT_IMPORT_MISSING_COLUMN: u8 = 5;

/// Two records carry the same id.
pub const EXIT_IMPORT_DUPLICATE_ID: u8 = 6;

/// Config file failed to parse or validate.
pub const EXIT_CONFIG: u8 = 7;

// =============================================================================
// Export (20-29)
// =============================================================================

/// Output file could not be written.
pub const EXIT_EXPORT_WRITE: u8 = 20;

// =============================================================================
// Engine error mapping
// =============================================================================

/// Map an engine error to its exit code.
pub fn engine_exit_code(err: &EngineError) -> u8 {
    match err {
        EngineError::Ingestion(_) => EXIT_IMPORT_MALFORMED,
        EngineError::MissingColumn { .. } => EXIT_IMPORT_MISSING_COLUMN,
        EngineError::DuplicateId { .. } => EXIT_IMPORT_DUPLICATE_ID,
        EngineError::ConfigParse(_) | EngineError::ConfigValidation(_) => EXIT_CONFIG,
        // Cursor protocol errors are handled inside the review loop; one
        // escaping to the top level is a plain failure.
        EngineError::OutOfRange { .. }
        | EngineError::RejectionPending
        | EngineError::NothingPending => EXIT_ERROR,
    }
}
