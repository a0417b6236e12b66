use crate::engine::ports::{SheetData, SheetSource};
use crate::engine::BackendError;
use std::path::PathBuf;

/// A CSV file acting as the active sheet.
///
/// The first record is the header row. The delimiter is picked from the
/// header line, and rows shorter than the header are padded with empty cells.
/// Every sheet line keeps its row: blank lines become rows of empty cells so
/// that row numbers stay aligned with the file.
pub struct CsvSheet {
    path: PathBuf,
}

impl CsvSheet {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Picks the most frequent of `,` `;` tab `|` in the header line.
pub fn detect_delimiter(header_line: &str) -> u8 {
    [b',', b';', b'\t', b'|']
        .into_iter()
        .max_by_key(|&d| header_line.bytes().filter(|&b| b == d).count())
        .filter(|&d| header_line.as_bytes().contains(&d))
        .unwrap_or(b',')
}

/// Number of empty lines starting at `from`, the byte right after the
/// previous record. The csv reader drops these lines silently.
///
/// A `\n` that completes a `\r\n` pair belongs to the previous line.
fn blank_lines_at(bytes: &[u8], from: usize) -> usize {
    let mut count = 0;
    for i in from..bytes.len() {
        match bytes[i] {
            b'\r' => count += 1,
            b'\n' if i == 0 || bytes[i - 1] != b'\r' => count += 1,
            b'\n' => {}
            _ => break,
        }
    }
    count
}

impl SheetSource for CsvSheet {
    fn read_sheet(&self) -> Result<SheetData, BackendError> {
        let content = std::fs::read_to_string(&self.path)?;
        let header_line = content.lines().next().unwrap_or("");
        let delimiter = detect_delimiter(header_line);

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(content.as_bytes());

        let mut record = csv::StringRecord::new();
        if !reader.read_record(&mut record)? {
            return Ok(SheetData::default());
        }
        let headers: Vec<String> = record
            .iter()
            .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
            .collect();

        let mut rows = Vec::new();
        loop {
            let after_previous = reader.position().byte() as usize;
            if !reader.read_record(&mut record)? {
                break;
            }
            for _ in 0..blank_lines_at(content.as_bytes(), after_previous) {
                rows.push(vec![String::new(); headers.len()]);
            }
            let mut cells: Vec<String> = record.iter().map(str::to_string).collect();
            if cells.len() < headers.len() {
                cells.resize(headers.len(), String::new());
            }
            rows.push(cells);
        }
        Ok(SheetData { headers, rows })
    }
}
