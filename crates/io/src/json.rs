// JSON import/export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;

use replaygrid_engine::source::RawRows;
use replaygrid_engine::CellValue;

/// Array of arrays, pretty-printed with a one-space indent.
pub fn to_string_pretty(data: &[Vec<CellValue>]) -> Result<String, String> {
    let mut out = Vec::new();
    write_pretty(&mut out, data)?;
    String::from_utf8(out).map_err(|e| e.to_string())
}

pub fn export(data: &[Vec<CellValue>], path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| e.to_string())?;
    let writer = BufWriter::new(file);
    write_pretty(writer, data)
}

fn write_pretty<W: std::io::Write>(writer: W, data: &[Vec<CellValue>]) -> Result<(), String> {
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut ser = serde_json::Serializer::with_formatter(writer, formatter);
    data.serialize(&mut ser).map_err(|e| e.to_string())
}

/// Parse bootstrap data: a JSON array of row arrays.
pub fn parse(content: &str) -> Result<RawRows, String> {
    serde_json::from_str(content).map_err(|e| format!("invalid table data: {}", e))
}

pub fn import(path: &Path) -> Result<RawRows, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    parse(&content)
}
