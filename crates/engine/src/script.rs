//! Scripted user actions.
//!
//! A script is a JSON array of actions, each one the same call a view would
//! make on a key press or click:
//!
//! ```json
//! [
//!   {"action": "sort", "column": 1},
//!   {"action": "toggle_search"},
//!   {"action": "search", "column": 0, "needle": "the"},
//!   {"action": "edit", "record": 3, "column": 0},
//!   {"action": "save", "value": "The Lord of the Rings"}
//! ]
//! ```
//!
//! Records are addressed by record id (load index), not by view position.

use serde::{Deserialize, Serialize};

use crate::error::GridError;
use crate::table::RecordId;
use crate::widget::Widget;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Action {
    Sort { column: usize },
    Edit { record: usize, column: usize },
    Save { value: String },
    CancelEdit,
    ToggleSearch,
    Search { column: usize, needle: String },
}

impl Action {
    /// Perform the action on `widget`; returns the ordinal it was recorded at.
    pub fn apply(&self, widget: &mut Widget) -> Result<usize, GridError> {
        match self {
            Action::Sort { column } => widget.sort(*column),
            Action::Edit { record, column } => widget.show_editor(RecordId(*record), *column),
            Action::Save { value } => widget.save(value),
            Action::CancelEdit => widget.cancel_edit(),
            Action::ToggleSearch => widget.toggle_search(),
            Action::Search { column, needle } => widget.search(*column, needle),
        }
    }
}

/// Failure while running a script: which step, and why.
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptError {
    /// 0-based index of the failing action
    pub step: usize,
    pub error: GridError,
}

impl std::fmt::Display for ScriptError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "step {}: {}", self.step + 1, self.error)
    }
}

impl std::error::Error for ScriptError {}

pub fn parse_script(json: &str) -> Result<Vec<Action>, String> {
    serde_json::from_str(json).map_err(|e| format!("invalid script: {}", e))
}

/// Apply every action in order, stopping at the first failure.
/// Returns the number of actions applied.
pub fn run_script(widget: &mut Widget, actions: &[Action]) -> Result<usize, ScriptError> {
    for (step, action) in actions.iter().enumerate() {
        action.apply(widget).map_err(|error| ScriptError { step, error })?;
    }
    Ok(actions.len())
}
