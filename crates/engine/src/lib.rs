pub mod cell;
pub mod error;
pub mod events;
pub mod filter;
pub mod history;
pub mod replay;
pub mod schedule;
pub mod script;
pub mod source;
pub mod table;
pub mod validation;
pub mod widget;

#[cfg(test)]
pub mod harness;

pub use cell::CellValue;
pub use error::GridError;
pub use table::{RecordId, Row, TableState};
pub use widget::{LoadStatus, Widget};
