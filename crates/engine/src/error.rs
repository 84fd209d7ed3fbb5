use std::fmt;

use crate::table::RecordId;

#[derive(Debug, Clone, PartialEq)]
pub enum GridError {
    /// Replay requested while the history holds only the initial snapshot.
    NoHistoryToReplay,
    /// Replay requested while another replay is still running.
    AlreadyReplaying,
    /// A user action arrived while a replay is applying the history.
    ReplayInProgress,
    /// The bootstrap data source failed.
    DataLoadFailed(String),
    /// Editor input does not fit the column kind.
    InvalidCellValue { column: usize, value: String, expected: &'static str },
    /// Save requested with no cell being edited.
    NoActiveEdit,
    /// Search input received while the search row is hidden.
    SearchInactive,
    /// Edit cursor points at a record or column that does not exist.
    NoSuchCell { record: RecordId, column: usize },
    /// Column index out of range.
    NoSuchColumn(usize),
    /// The widget has been torn down.
    Unmounted,
}

impl fmt::Display for GridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHistoryToReplay => write!(f, "no state changes to replay yet"),
            Self::AlreadyReplaying => write!(f, "a replay is already running"),
            Self::ReplayInProgress => write!(f, "table is replaying; input ignored"),
            Self::DataLoadFailed(msg) => write!(f, "failed to load data: {msg}"),
            Self::InvalidCellValue { column, value, expected } => {
                write!(f, "column {}: '{value}' is not {expected}", column + 1)
            }
            Self::NoActiveEdit => write!(f, "no cell is being edited"),
            Self::SearchInactive => write!(f, "search is not active"),
            Self::NoSuchCell { record, column } => {
                write!(f, "no cell at record {} column {}", record.0, column + 1)
            }
            Self::NoSuchColumn(column) => write!(f, "no column {}", column + 1),
            Self::Unmounted => write!(f, "table has been torn down"),
        }
    }
}

impl std::error::Error for GridError {}
