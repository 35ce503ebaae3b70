// CSV loading

use std::collections::HashSet;
use std::path::Path;

use anyhow::{Context, Result, bail};
use fedprep_core::{CellValue, Row, TabularInput};

/// Read a CSV file with a header row into a [`TabularInput`]
///
/// Column order follows the header. Every cell is kept as text; the encoder
/// decides what it means.
pub fn read_csv(path: &Path) -> Result<TabularInput> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;

    let headers: Vec<String> = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .iter()
        .map(str::to_owned)
        .collect();

    let mut seen = HashSet::new();
    if let Some(dup) = headers.iter().find(|h| !seen.insert(h.as_str())) {
        bail!("Duplicate column '{dup}' in {}", path.display());
    }

    let mut rows = Vec::new();
    for (i, record) in reader.records().enumerate() {
        // Ragged records are reported by the csv reader with their line
        let record = record.with_context(|| format!("Failed to read data row {i}"))?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(h, v)| (h.clone(), CellValue::Text(v.to_owned())))
            .collect();
        rows.push(row);
    }

    Ok(TabularInput::new(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn reads_rows_in_header_order() {
        let file = csv_file("b,a\n1, 2\n3,4\n");
        let input = read_csv(file.path()).unwrap();

        assert_eq!(input.rows().len(), 2);
        let first = &input.rows()[0];
        assert_eq!(first.columns().collect::<Vec<_>>(), ["b", "a"]);
        assert_eq!(first.get("a"), Some(&CellValue::Text("2".into())));

        let matrix = fedprep_core::encode(&input).unwrap();
        assert_eq!(matrix.rows(), [vec![1u8, 2], vec![3, 4]]);
    }

    #[test]
    fn header_only_is_empty() {
        let file = csv_file("x,y\n");
        let input = read_csv(file.path()).unwrap();
        assert!(input.is_empty());
    }

    #[test]
    fn rejects_duplicate_headers() {
        let file = csv_file("x,x\n1,2\n");
        assert!(read_csv(file.path()).is_err());
    }

    #[test]
    fn rejects_ragged_rows() {
        let file = csv_file("x,y\n1,2\n3\n");
        assert!(read_csv(file.path()).is_err());
    }
}
