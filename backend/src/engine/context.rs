//! Per-row data handed to the placeholder engine and the processor.

/// Field name to value mapping of one row, in header order.
///
/// Inserting a name that is already present replaces its value but keeps
/// its original position (last write wins).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
    entries: Vec<(String, String)>,
}

impl FieldMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs headers with row cells. Missing cells become empty values.
    pub fn from_row(headers: &[String], cells: &[String]) -> Self {
        let mut map = Self::new();
        for (i, header) in headers.iter().enumerate() {
            map.insert(header.clone(), cells.get(i).cloned().unwrap_or_default());
        }
        map
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// A row is populated when at least one cell has non-blank content.
pub fn is_populated(cells: &[String]) -> bool {
    cells.iter().any(|c| !c.trim().is_empty())
}

/// Everything the processor knows about one row.
#[derive(Debug, Clone)]
pub struct RowContext {
    /// Sheet row number (the header is row 1, so data row `i` is `i + 2`).
    pub row_number: usize,
    pub fields: FieldMap,
    cells: Vec<String>,
}

impl RowContext {
    pub fn new(headers: &[String], cells: &[String], row_number: usize) -> Self {
        Self {
            row_number,
            fields: FieldMap::from_row(headers, cells),
            cells: cells.to_vec(),
        }
    }

    /// Trimmed cell value at a zero-based column, empty when out of range.
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(|c| c.trim()).unwrap_or("")
    }
}
