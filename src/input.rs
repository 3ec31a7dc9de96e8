use std::path::Path;

use anyhow::Context;
use tracing::debug;

use crate::error::PipelineError;
use crate::models::{CellValue, RawRecord};

/// Decoded sheet: header row plus one record per data row.
#[derive(Debug, Clone, Default)]
pub struct DecodedTable {
    pub headers: Vec<String>,
    pub rows: Vec<RawRecord>,
}

/// Reads the whole input file. This is the only step that waits on I/O.
pub async fn acquire(path: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    let path = path.ok_or(PipelineError::MissingInput)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read input file {}", path.display()))?;
    debug!(path = %path.display(), bytes = bytes.len(), "input file read");
    Ok(bytes)
}

pub fn decode_rows(bytes: &[u8]) -> Result<DecodedTable, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(bytes);

    // Cells are decoded lossily so one badly encoded cell cannot sink the run.
    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect();
    let mut rows = Vec::new();

    for result in reader.byte_records() {
        let record = result?;
        let row = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let cell = record
                    .get(idx)
                    .map(|field| CellValue::from_raw(&String::from_utf8_lossy(field)))
                    .unwrap_or(CellValue::Empty);
                (header.clone(), cell)
            })
            .collect::<RawRecord>();
        rows.push(row);
    }

    Ok(DecodedTable { headers, rows })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn decodes_rows_by_header() {
        let csv = "Epid Tahun (Tkh Onset),Epid Minggu (Tkh Onset),Nama\n2023,5,Ali\n2023,,Siti\n";
        let table = decode_rows(csv.as_bytes()).unwrap();

        assert_eq!(table.headers.len(), 3);
        assert_eq!(table.rows.len(), 2);
        assert_eq!(
            table.rows[0].get("Epid Minggu (Tkh Onset)"),
            Some(&CellValue::Number(5.0))
        );
        assert_eq!(table.rows[1].get("Epid Minggu (Tkh Onset)"), Some(&CellValue::Empty));
        assert_eq!(table.rows[1].get("Nama"), Some(&CellValue::Text("Siti".to_string())));
    }

    #[test]
    fn short_rows_fill_with_empty_cells() {
        let table = decode_rows(b"a,b,c\n1\n").unwrap();
        assert_eq!(table.rows[0].get("a"), Some(&CellValue::Number(1.0)));
        assert_eq!(table.rows[0].get("c"), Some(&CellValue::Empty));
    }

    #[test]
    fn header_whitespace_is_trimmed() {
        let table = decode_rows(b" Tarikh Onset \n2023-05-01\n").unwrap();
        assert_eq!(table.headers, vec!["Tarikh Onset".to_string()]);
    }

    #[test]
    fn invalid_utf8_cell_does_not_abort_decoding() {
        let mut csv = b"Tarikh Onset,Nama\n2023-05-01,Ali\n2023-05-01,".to_vec();
        csv.extend_from_slice(&[0x4a, 0xe9, 0x72]);
        csv.extend_from_slice(b"\n2023-05-02,Siti\n");

        let table = decode_rows(&csv).unwrap();
        assert_eq!(table.rows.len(), 3);
        assert_eq!(
            table.rows[1].get("Tarikh Onset"),
            Some(&CellValue::Text("2023-05-01".to_string()))
        );
        assert_eq!(
            table.rows[1].get("Nama"),
            Some(&CellValue::Text("J\u{FFFD}r".to_string()))
        );
    }

    #[tokio::test]
    async fn acquire_requires_a_path() {
        let err = acquire(None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PipelineError>(),
            Some(PipelineError::MissingInput)
        ));
    }

    #[tokio::test]
    async fn acquire_reads_file_bytes() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Tarikh Onset\n2023-05-01\n").unwrap();

        let bytes = acquire(Some(file.path())).await.unwrap();
        assert_eq!(bytes, b"Tarikh Onset\n2023-05-01\n");
    }

    #[tokio::test]
    async fn acquire_reports_unreadable_path() {
        let err = acquire(Some(Path::new("/nonexistent/cases.csv"))).await.unwrap_err();
        assert!(err.to_string().contains("/nonexistent/cases.csv"));
    }
}
