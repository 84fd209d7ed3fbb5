// File I/O operations

pub mod csv;
pub mod json;
pub mod provider;

/// Export file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
        }
    }

    /// MIME type of the exported contents
    pub fn mime(&self) -> &'static str {
        match self {
            ExportFormat::Json => "text/json",
            ExportFormat::Csv => "text/csv",
        }
    }

    /// Default download name, as the browser widget offered it
    pub fn default_file_name(&self) -> String {
        format!("data.{}", self.extension())
    }

    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            _ => None,
        }
    }
}

/// Render rows in `format`.
pub fn export_string(
    data: &[Vec<replaygrid_engine::CellValue>],
    format: ExportFormat,
) -> Result<String, String> {
    match format {
        ExportFormat::Json => json::to_string_pretty(data),
        ExportFormat::Csv => csv::to_string(data),
    }
}

/// Write rows to `path` in `format`.
pub fn export(
    data: &[Vec<replaygrid_engine::CellValue>],
    format: ExportFormat,
    path: &std::path::Path,
) -> Result<(), String> {
    match format {
        ExportFormat::Json => json::export(data, path),
        ExportFormat::Csv => csv::export(data, path),
    }
}
