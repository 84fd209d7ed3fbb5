// CSV import/export

use std::io::Read;
use std::path::Path;

use replaygrid_engine::source::RawRows;
use replaygrid_engine::CellValue;

/// Render rows as CSV: every cell quoted, embedded quotes doubled,
/// `\n` after every row, no trailing delimiter.
pub fn to_string(data: &[Vec<CellValue>]) -> Result<String, String> {
    let mut writer = writer_builder().from_writer(Vec::new());
    write_rows(&mut writer, data)?;
    let bytes = writer.into_inner().map_err(|e| e.to_string())?;
    String::from_utf8(bytes).map_err(|e| e.to_string())
}

pub fn export(data: &[Vec<CellValue>], path: &Path) -> Result<(), String> {
    let mut writer = writer_builder().from_path(path).map_err(|e| e.to_string())?;
    write_rows(&mut writer, data)
}

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    // Rows may differ in width when the source data was ragged
    builder
        .flexible(true)
        .quote_style(csv::QuoteStyle::Always)
        .terminator(csv::Terminator::Any(b'\n'));
    builder
}

fn write_rows<W: std::io::Write>(writer: &mut csv::Writer<W>, data: &[Vec<CellValue>]) -> Result<(), String> {
    for row in data {
        let record: Vec<String> = row.iter().map(|cell| cell.to_string()).collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}

pub fn import(path: &Path) -> Result<RawRows, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<RawRows, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line. The delimiter
/// that produces the most consistent field count (>1 field) wins.
fn sniff_delimiter(content: &str) -> u8 {
    let candidates: &[u8] = &[b'\t', b';', b',', b'|'];
    let sample_lines: Vec<&str> = content.lines().take(10).collect();

    if sample_lines.is_empty() {
        return b',';
    }

    let mut best = b',';
    let mut best_score = 0u64;

    for &delim in candidates {
        let counts: Vec<usize> = sample_lines
            .iter()
            .map(|line| {
                csv::ReaderBuilder::new()
                    .delimiter(delim)
                    .has_headers(false)
                    .flexible(true)
                    .from_reader(line.as_bytes())
                    .records()
                    .next()
                    .and_then(|r| r.ok())
                    .map(|r| r.len())
                    .unwrap_or(1)
            })
            .collect();

        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        let target = counts[0];
        let consistent = counts.iter().filter(|&&c| c == target).count() as u64;
        let score = consistent * target as u64;

        if score > best_score {
            best_score = score;
            best = delim;
        }
    }

    best
}

/// Read file and convert to UTF-8 if needed (handles Windows-1252, Latin-1, etc.)
pub fn read_file_as_utf8(path: &Path) -> Result<String, String> {
    let mut file = std::fs::File::open(path).map_err(|e| e.to_string())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes).map_err(|e| e.to_string())?;

    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Typed cell from a CSV field: empty → null, finite number → number, else text.
fn cell_from_field(field: &str) -> CellValue {
    if field.is_empty() {
        return CellValue::Null;
    }
    match field.trim().parse::<f64>() {
        Ok(n) if n.is_finite() => CellValue::number(n),
        _ => CellValue::text(field),
    }
}

pub fn import_from_string(content: &str, delimiter: u8) -> Result<RawRows, String> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| e.to_string())?;
        rows.push(record.iter().map(cell_from_field).collect());
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn books() -> Vec<Vec<CellValue>> {
        vec![
            vec!["The Hobbit".into(), "J. R. R. Tolkien".into(), 1937i64.into()],
            vec!["Say \"hi\" now".into(), "Anon".into(), 2.5f64.into()],
        ]
    }

    #[test]
    fn test_every_cell_quoted_and_quotes_doubled() {
        let out = to_string(&books()).unwrap();
        assert_eq!(
            out,
            "\"The Hobbit\",\"J. R. R. Tolkien\",\"1937\"\n\"Say \"\"hi\"\" now\",\"Anon\",\"2.5\"\n"
        );
    }

    #[test]
    fn test_null_exports_as_empty_quoted_cell() {
        let out = to_string(&[vec![CellValue::Null, "x".into()]]).unwrap();
        assert_eq!(out, "\"\",\"x\"\n");
    }

    #[test]
    fn test_export_then_import() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data.csv");
        export(&books(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.ends_with('\n'));

        let rows = import(&path).unwrap();
        assert_eq!(rows, books());
    }

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "Name;Age;City\nAlice;30;Paris\nBob;25;London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "Name\tAge\tCity\nAlice\t30\tParis\nBob\t25\tLondon\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        let content = "Name;Address;City\n\"Doe, Jane\";\"123 Main St, Apt 4\";Paris\nBob;\"456 Elm\";London\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_import_types_fields() {
        let rows = import_from_string("a,,3\n", b',').unwrap();
        assert_eq!(rows, vec![vec![CellValue::text("a"), CellValue::Null, CellValue::number(3.0)]]);
    }

    #[test]
    fn test_import_windows_1252() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // "Café" in Windows-1252
        fs::write(&path, b"Caf\xe9,1\n").unwrap();
        let rows = import(&path).unwrap();
        assert_eq!(rows[0][0], CellValue::text("Café"));
    }
}
