//! Claims export decoding: CSV via the `csv` crate, XLSX/XLS via `calamine`.
//!
//! Decoding is the only fallible stage of the pipeline. Per-cell anomalies
//! are never errors here; they flow through as [`CellValue`]s and degrade to
//! sentinels downstream.

use std::fs::File;
use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader as SheetReader};
use claims_core::error::{ClaimsError, Result};
use claims_core::models::{CellValue, RawClaim};
use tracing::debug;

/// Default number of records per streamed batch.
pub const DEFAULT_BATCH_SIZE: usize = 2_000;

/// Read a claims export fully into memory.
///
/// Dispatches on the file extension. Zero data rows is a terminal
/// [`ClaimsError::EmptyDataset`], distinct from a decode failure.
pub fn read_claims_file(path: &Path) -> Result<Vec<RawClaim>> {
    let mut records = Vec::new();
    stream_claims_file(path, DEFAULT_BATCH_SIZE, |batch, _| {
        records.extend(batch);
    })?;
    if records.is_empty() {
        return Err(ClaimsError::EmptyDataset);
    }
    Ok(records)
}

/// Stream a claims export through `sink` in batches of at most `batch_size`
/// records.
///
/// `sink` receives each batch together with a 0–100 progress figure, capped
/// at 99.0 until the file is fully decoded; the final call always reports
/// 100.0 and may carry an empty batch. Returns the total record count.
pub fn stream_claims_file<F>(path: &Path, batch_size: usize, mut sink: F) -> Result<usize>
where
    F: FnMut(Vec<RawClaim>, f64),
{
    let batch_size = batch_size.max(1);
    match extension_of(path).as_str() {
        "csv" => stream_csv(path, batch_size, &mut sink),
        "xlsx" | "xls" => stream_spreadsheet(path, batch_size, &mut sink),
        other => Err(ClaimsError::UnsupportedFormat(other.to_string())),
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase()
}

// ── CSV ───────────────────────────────────────────────────────────────────────

fn stream_csv<F>(path: &Path, batch_size: usize, sink: &mut F) -> Result<usize>
where
    F: FnMut(Vec<RawClaim>, f64),
{
    let file = File::open(path).map_err(|source| ClaimsError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let total_bytes = file.metadata().map(|m| m.len()).unwrap_or(0);

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').trim().to_string())
        .collect();

    let mut batch: Vec<RawClaim> = Vec::new();
    let mut count = 0usize;
    let mut record = csv::StringRecord::new();

    while reader.read_record(&mut record)? {
        // A line of nothing but blank cells is not a record.
        if record.iter().all(|field| field.trim().is_empty()) {
            continue;
        }

        let mut claim = RawClaim::default();
        for (i, header) in headers.iter().enumerate() {
            let cell = record.get(i).unwrap_or("");
            claim.set_column(header, CellValue::from_text(cell));
        }
        batch.push(claim);
        count += 1;

        if batch.len() >= batch_size {
            let progress = if total_bytes > 0 {
                ((reader.position().byte() as f64 / total_bytes as f64) * 100.0).min(99.0)
            } else {
                99.0
            };
            sink(std::mem::take(&mut batch), progress);
        }
    }

    debug!(records = count, path = %path.display(), "CSV decoded");
    sink(batch, 100.0);
    Ok(count)
}

// ── XLSX / XLS ────────────────────────────────────────────────────────────────

fn stream_spreadsheet<F>(path: &Path, batch_size: usize, sink: &mut F) -> Result<usize>
where
    F: FnMut(Vec<RawClaim>, f64),
{
    let mut workbook =
        open_workbook_auto(path).map_err(|e| ClaimsError::Spreadsheet(e.to_string()))?;

    // The export always lives on the first worksheet.
    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| ClaimsError::Spreadsheet("workbook has no sheets".to_string()))?;
    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| ClaimsError::Spreadsheet(e.to_string()))?;

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        sink(Vec::new(), 100.0);
        return Ok(0);
    };
    let headers: Vec<String> = header_row.iter().map(header_text).collect();
    let total_rows = range.height().saturating_sub(1).max(1);

    let mut batch: Vec<RawClaim> = Vec::new();
    let mut count = 0usize;

    for row in rows {
        if row.iter().all(cell_is_blank) {
            continue;
        }

        let mut claim = RawClaim::default();
        for (i, header) in headers.iter().enumerate() {
            let value = row.get(i).map(cell_to_value).unwrap_or(CellValue::Empty);
            claim.set_column(header, value);
        }
        batch.push(claim);
        count += 1;

        if batch.len() >= batch_size {
            let progress = ((count as f64 / total_rows as f64) * 100.0).min(99.0);
            sink(std::mem::take(&mut batch), progress);
        }
    }

    debug!(records = count, sheet = %sheet, path = %path.display(), "spreadsheet decoded");
    sink(batch, 100.0);
    Ok(count)
}

fn header_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.trim().to_string(),
        other => other.to_string().trim().to_string(),
    }
}

fn cell_is_blank(cell: &Data) -> bool {
    matches!(cell, Data::Empty) || matches!(cell, Data::String(s) if s.trim().is_empty())
}

/// Map a spreadsheet cell onto the pipeline's raw cell type. Serial dates
/// stay numeric so the date normalizer can apply the epoch conversion.
fn cell_to_value(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::from_text(s),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(dt) => CellValue::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::from_text(s),
        Data::Error(_) => CellValue::Empty,
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_csv(dir: &TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = File::create(&path).expect("create temp csv");
        file.write_all(contents.as_bytes()).expect("write temp csv");
        path
    }

    const SAMPLE: &str = "\
Claim Status,Claim File Date,Close Date,Claim Amount,Settled Amount,Region
SETTLED,01-01-2024,10-01-2024,\"1,000\",900,North
REJECTED,05-01-2024,20-01-2024,500,0,South
";

    #[test]
    fn test_read_csv_happy_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_csv(&dir, "claims.csv", SAMPLE);

        let records = read_claims_file(&path).expect("read csv");
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].claim_status.as_deref(), Some("SETTLED"));
        assert_eq!(records[0].claim_amount, CellValue::Text("1,000".to_string()));
        assert_eq!(records[0].region.as_deref(), Some("North"));
        assert_eq!(records[1].region.as_deref(), Some("South"));
    }

    #[test]
    fn test_read_csv_absent_column_is_none() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_csv(&dir, "claims.csv", "Claim Status,Region\nSETTLED,North\n");

        let records = read_claims_file(&path).expect("read csv");
        assert_eq!(records[0].state, None);
        assert_eq!(records[0].claim_file_date, CellValue::Empty);
    }

    #[test]
    fn test_read_csv_skips_blank_lines() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_csv(
            &dir,
            "claims.csv",
            "Claim Status,Region\nSETTLED,North\n,\nREJECTED,South\n",
        );

        let records = read_claims_file(&path).expect("read csv");
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn test_read_csv_header_only_is_empty_dataset() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_csv(&dir, "claims.csv", "Claim Status,Region\n");

        let err = read_claims_file(&path).expect_err("should be empty");
        assert!(matches!(err, ClaimsError::EmptyDataset));
    }

    #[test]
    fn test_read_unsupported_extension() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_csv(&dir, "claims.pdf", "not a table");

        let err = read_claims_file(&path).expect_err("should be rejected");
        assert!(matches!(err, ClaimsError::UnsupportedFormat(ext) if ext == "pdf"));
    }

    #[test]
    fn test_read_missing_file() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("absent.csv");

        let err = read_claims_file(&path).expect_err("should fail");
        assert!(matches!(err, ClaimsError::FileRead { .. }));
    }

    #[test]
    fn test_stream_batches_concatenate_and_finish_at_100() {
        let dir = TempDir::new().expect("tempdir");
        let mut contents = String::from("Claim Status,Region\n");
        for i in 0..7 {
            contents.push_str(&format!("SETTLED,Region-{}\n", i));
        }
        let path = write_csv(&dir, "claims.csv", &contents);

        let mut all = Vec::new();
        let mut progress_log = Vec::new();
        let count = stream_claims_file(&path, 3, |batch, progress| {
            all.extend(batch);
            progress_log.push(progress);
        })
        .expect("stream csv");

        assert_eq!(count, 7);
        assert_eq!(all.len(), 7);
        assert_eq!(all[6].region.as_deref(), Some("Region-6"));
        // Intermediate figures stay capped below the final 100.
        assert!(progress_log.iter().rev().skip(1).all(|p| *p <= 99.0));
        assert_eq!(progress_log.last().copied(), Some(100.0));
    }

    #[test]
    fn test_stream_handles_bom_header() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_csv(&dir, "claims.csv", "\u{feff}Claim Status,Region\nSETTLED,North\n");

        let records = read_claims_file(&path).expect("read csv");
        assert_eq!(records[0].claim_status.as_deref(), Some("SETTLED"));
    }
}
