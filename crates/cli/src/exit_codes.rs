//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `rgrid` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 3-9     | data             | Loading, parsing and writing table data  |
//! | 10-19   | table            | Refused table actions                    |
//! | 20-29   | replay           | Replay could not start                   |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into `grid_exit_code` or the relevant command

use replaygrid_engine::GridError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure (terminal setup, logger).
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, unknown column name, bad --where.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Data (3-9)
// =============================================================================

/// Reading or writing a file failed.
pub const EXIT_DATA_IO: u8 = 3;

/// The data source (file or URL) could not deliver rows.
pub const EXIT_DATA_LOAD: u8 = 4;

/// A script or data file is not in the expected shape.
pub const EXIT_DATA_PARSE: u8 = 5;

// =============================================================================
// Table (10-19)
// =============================================================================

/// Edited value does not fit the column kind.
pub const EXIT_TABLE_INVALID_VALUE: u8 = 10;

/// Action refused by the table (no edit open, search hidden, bad cell).
pub const EXIT_TABLE_REJECTED: u8 = 11;

// =============================================================================
// Replay (20-29)
// =============================================================================

/// Replay requested with nothing recorded beyond the initial snapshot.
pub const EXIT_REPLAY_EMPTY: u8 = 20;

/// Replay requested while a replay is running, or input sent during one.
pub const EXIT_REPLAY_BUSY: u8 = 21;

/// Map a table error to its exit code.
pub fn grid_exit_code(err: &GridError) -> u8 {
    match err {
        GridError::NoHistoryToReplay => EXIT_REPLAY_EMPTY,
        GridError::AlreadyReplaying | GridError::ReplayInProgress => EXIT_REPLAY_BUSY,
        GridError::DataLoadFailed(_) => EXIT_DATA_LOAD,
        GridError::InvalidCellValue { .. } => EXIT_TABLE_INVALID_VALUE,
        GridError::NoActiveEdit
        | GridError::SearchInactive
        | GridError::NoSuchCell { .. }
        | GridError::NoSuchColumn(_)
        | GridError::Unmounted => EXIT_TABLE_REJECTED,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_distinct() {
        let mut codes = vec![
            EXIT_SUCCESS,
            EXIT_ERROR,
            EXIT_USAGE,
            EXIT_DATA_IO,
            EXIT_DATA_LOAD,
            EXIT_DATA_PARSE,
            EXIT_TABLE_INVALID_VALUE,
            EXIT_TABLE_REJECTED,
            EXIT_REPLAY_EMPTY,
            EXIT_REPLAY_BUSY,
        ];
        let total = codes.len();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), total);
    }

    #[test]
    fn grid_errors_land_in_their_ranges() {
        assert_eq!(grid_exit_code(&GridError::NoHistoryToReplay), EXIT_REPLAY_EMPTY);
        assert_eq!(grid_exit_code(&GridError::ReplayInProgress), EXIT_REPLAY_BUSY);
        assert_eq!(grid_exit_code(&GridError::DataLoadFailed("x".into())), EXIT_DATA_LOAD);
        assert_eq!(
            grid_exit_code(&GridError::InvalidCellValue {
                column: 0,
                value: "abc".into(),
                expected: "a number",
            }),
            EXIT_TABLE_INVALID_VALUE
        );
        assert_eq!(grid_exit_code(&GridError::NoActiveEdit), EXIT_TABLE_REJECTED);
    }
}
