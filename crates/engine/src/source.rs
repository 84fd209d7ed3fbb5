//! Bootstrap data sources.
//!
//! The widget never fetches on its own; the host hands it a provider.
//! File and HTTP providers live in `replaygrid-io`.

use crate::cell::CellValue;

/// Rows of primitive cell values, as loaded (no record ids yet).
pub type RawRows = Vec<Vec<CellValue>>;

pub trait DataProvider {
    /// Fetch the full data set. Called once per load.
    fn fetch(&self) -> Result<RawRows, String>;

    /// Short description for log lines and error banners.
    fn describe(&self) -> String {
        "data source".to_string()
    }
}

/// Fixed in-memory rows.
#[derive(Debug, Clone, Default)]
pub struct StaticProvider {
    rows: RawRows,
}

impl StaticProvider {
    pub fn new(rows: RawRows) -> Self {
        Self { rows }
    }
}

impl DataProvider for StaticProvider {
    fn fetch(&self) -> Result<RawRows, String> {
        Ok(self.rows.clone())
    }

    fn describe(&self) -> String {
        format!("{} static rows", self.rows.len())
    }
}

/// Any callback returning rows.
pub struct FnProvider<F>(pub F);

impl<F> DataProvider for FnProvider<F>
where
    F: Fn() -> Result<RawRows, String>,
{
    fn fetch(&self) -> Result<RawRows, String> {
        (self.0)()
    }

    fn describe(&self) -> String {
        "callback".to_string()
    }
}
