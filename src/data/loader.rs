use std::path::Path;
use thiserror::Error;

/// Required date column.
pub const WEEK_COLUMN: &str = "week";
/// Required value column.
pub const UNITS_COLUMN: &str = "units_sold";

#[derive(Debug, Error)]
pub enum DataError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("dataset is empty (no header row)")]
    Empty,
    #[error("the dataset must contain a '{0}' column")]
    MissingColumn(&'static str),
    #[error("no rows survived date/value parsing")]
    NoUsableRows,
}

/// A parsed CSV: one header row plus string records, order preserved.
#[derive(Debug, Clone)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub records: Vec<Vec<String>>,
}

impl RawTable {
    /// Load a CSV file. Handles quoted fields and skips blank lines;
    /// cells are trimmed. Ragged rows are padded with empty cells so
    /// column indexing stays valid.
    pub fn load(path: &Path) -> Result<Self, DataError> {
        let content = std::fs::read_to_string(path).map_err(|source| DataError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self, DataError> {
        // Strip BOM if present (common on Windows-exported CSVs)
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let mut lines = content.lines().filter(|l| !l.trim().is_empty());
        let headers = match lines.next() {
            Some(line) => split_csv_line(line),
            None => return Err(DataError::Empty),
        };

        let width = headers.len();
        let records = lines
            .map(|line| {
                let mut cells = split_csv_line(line);
                cells.resize(width, String::new());
                cells
            })
            .collect();

        Ok(Self { headers, records })
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Check the two required columns exist. Returns (week_idx, units_idx).
    /// This runs before any modeling; a missing column is terminal.
    pub fn validate_columns(&self) -> Result<(usize, usize), DataError> {
        let week = self
            .column_index(WEEK_COLUMN)
            .ok_or(DataError::MissingColumn(WEEK_COLUMN))?;
        let units = self
            .column_index(UNITS_COLUMN)
            .ok_or(DataError::MissingColumn(UNITS_COLUMN))?;
        Ok((week, units))
    }

    /// First `n` raw records, for the preview pane.
    pub fn preview(&self, n: usize) -> &[Vec<String>] {
        &self.records[..self.records.len().min(n)]
    }
}

/// Split one CSV line into cells. Double quotes wrap cells containing
/// commas; "" inside a quoted cell is an escaped quote.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = line.trim_end_matches('\r').chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes => {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    cell.push('"');
                } else {
                    in_quotes = false;
                }
            }
            '"' => in_quotes = true,
            ',' if !in_quotes => {
                cells.push(cell.trim().to_string());
                cell = String::new();
            }
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_string());
    cells
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let table = RawTable::parse("week,units_sold\n01/01/23,100\n08/01/23,150\n").unwrap();
        assert_eq!(table.headers, vec!["week", "units_sold"]);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0], vec!["01/01/23", "100"]);
    }

    #[test]
    fn test_parse_quoted_cells() {
        let table = RawTable::parse("name,note\n\"Acme, Inc\",\"said \"\"hi\"\"\"\n").unwrap();
        assert_eq!(table.records[0][0], "Acme, Inc");
        assert_eq!(table.records[0][1], "said \"hi\"");
    }

    #[test]
    fn test_parse_skips_blank_lines_and_pads_ragged_rows() {
        let table = RawTable::parse("a,b,c\n1,2,3\n\n4,5\n").unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[1], vec!["4", "5", ""]);
    }

    #[test]
    fn test_empty_file_rejected() {
        assert!(matches!(RawTable::parse(""), Err(DataError::Empty)));
        assert!(matches!(RawTable::parse("\n\n"), Err(DataError::Empty)));
    }

    #[test]
    fn test_validate_columns_present() {
        let table = RawTable::parse("week,units_sold,store\n01/01/23,100,A\n").unwrap();
        let (w, u) = table.validate_columns().unwrap();
        assert_eq!((w, u), (0, 1));
    }

    #[test]
    fn test_validate_missing_units_column() {
        let table = RawTable::parse("week,revenue\n01/01/23,100\n").unwrap();
        match table.validate_columns() {
            Err(DataError::MissingColumn(col)) => assert_eq!(col, UNITS_COLUMN),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_missing_week_column() {
        let table = RawTable::parse("date,units_sold\n01/01/23,100\n").unwrap();
        match table.validate_columns() {
            Err(DataError::MissingColumn(col)) => assert_eq!(col, WEEK_COLUMN),
            other => panic!("expected MissingColumn, got {:?}", other),
        }
    }

    #[test]
    fn test_preview_caps_at_len() {
        let table = RawTable::parse("a\n1\n2\n").unwrap();
        assert_eq!(table.preview(5).len(), 2);
        assert_eq!(table.preview(1).len(), 1);
    }
}
