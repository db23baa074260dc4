use std::path::Path;

use csv::ReaderBuilder;
use tracing::info;

use crate::error::{PipelineError, Result};

/// A delimited file as found on disk: one header row plus data rows, with
/// row and column order preserved exactly. Fields are untyped strings; they
/// carry no meaning until the normalizer maps them positionally.
#[derive(Debug, Clone)]
pub struct RawTable {
    /// Column names as the file claims them. Discovered, not depended upon.
    pub headers: Vec<String>,
    /// Each data row, one `String` per field.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Read `path` into a [`RawTable`].
///
/// Fails with `SourceUnavailable` when the file cannot be opened or read,
/// and with `MalformedInput` when a row's field count differs from the
/// header's.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn read_table<P: AsRef<Path>>(path: P) -> Result<RawTable> {
    let path = path.as_ref();
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(false)
        .from_path(path)
        .map_err(|e| csv_error(path, e))?;

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| csv_error(path, e))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| csv_error(path, e))?;
        rows.push(record.iter().map(|f| f.trim().to_string()).collect());
    }

    info!(rows = rows.len(), columns = headers.len(), "table extracted");
    Ok(RawTable { headers, rows })
}

/// I/O problems mean the source is unavailable; everything else (ragged
/// rows, quoting errors) is malformed input.
fn csv_error(path: &Path, err: csv::Error) -> PipelineError {
    match err.into_kind() {
        csv::ErrorKind::Io(io) => PipelineError::SourceUnavailable {
            path: path.to_path_buf(),
            source: io,
        },
        other => PipelineError::MalformedInput(format!("{}: {other:?}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn preserves_row_and_column_order() {
        let file = write_csv(
            "Company_Name,Ship_Name,Built_Year,GT,DWT,Length,Width\n\
             Maersk,Alpha,2001,50000,80000,300,40\n\
             Maersk,Beta,1998,40000,70000,280,38\n\
             MSC,Gamma,2010,60000,90000,320,42\n",
        );
        let table = read_table(file.path()).unwrap();
        assert_eq!(table.headers.len(), 7);
        assert_eq!(table.headers[0], "Company_Name");
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[0][1], "Alpha");
        assert_eq!(table.rows[2], vec!["MSC", "Gamma", "2010", "60000", "90000", "320", "42"]);
    }

    #[test]
    fn header_only_file_yields_zero_rows() {
        let file = write_csv("Company_Name,Ship_Name,Built_Year,GT,DWT,Length,Width\n");
        let table = read_table(file.path()).unwrap();
        assert!(table.is_empty());
        assert_eq!(table.headers.len(), 7);
    }

    #[test]
    fn ragged_row_is_malformed_input() {
        let file = write_csv(
            "a,b,c,d,e,f,g\n\
             1,2,3,4,5,6,7\n\
             1,2,3\n",
        );
        let err = read_table(file.path()).unwrap_err();
        assert!(matches!(err, PipelineError::MalformedInput(_)), "got {err:?}");
    }

    #[test]
    fn missing_file_is_source_unavailable() {
        let err = read_table("does/not/exist.csv").unwrap_err();
        assert!(matches!(err, PipelineError::SourceUnavailable { .. }), "got {err:?}");
    }
}
