//! The persisted creator report: a fixed-schema CSV, rewritten whole on
//! every crawl.
//!
//! Writing goes through a sibling temp file and an atomic rename so the
//! viewer never observes a half-written table. Reading hands back `None`
//! when the file simply does not exist yet, so callers can show a
//! "run the crawl first" prompt instead of an error.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;
use std::io;
use std::path::Path;
use thiserror::Error;

/// Column order is part of the file format; do not reorder.
pub const REPORT_COLUMNS: [&str; 10] = [
    "channel_title",
    "channel_id",
    "description",
    "subscriber_count",
    "video_count",
    "view_count",
    "avg_views_last_5",
    "upload_per_week",
    "avg_like_view_ratio",
    "credibility_score",
];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("report io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed report (line {line}): {message}")]
    Malformed { line: usize, message: String },
}

/// One output row per successfully detailed channel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreatorRow {
    pub channel_title: String,
    pub channel_id: String,
    pub description: String,
    pub subscriber_count: u64,
    pub video_count: u64,
    pub view_count: u64,
    pub avg_views_last_5: u64,
    pub upload_per_week: f64,
    pub avg_like_view_ratio: f64,
    pub credibility_score: u8,
}

impl CreatorRow {
    fn to_cells(&self) -> [String; 10] {
        [
            self.channel_title.clone(),
            self.channel_id.clone(),
            self.description.clone(),
            self.subscriber_count.to_string(),
            self.video_count.to_string(),
            self.view_count.to_string(),
            self.avg_views_last_5.to_string(),
            format!("{:.2}", self.upload_per_week),
            format!("{:.2}", self.avg_like_view_ratio),
            self.credibility_score.to_string(),
        ]
    }

    fn from_cells(cells: &[String], line: usize) -> Result<Self, ReportError> {
        if cells.len() != REPORT_COLUMNS.len() {
            return Err(ReportError::Malformed {
                line,
                message: format!(
                    "expected {} fields, found {}",
                    REPORT_COLUMNS.len(),
                    cells.len()
                ),
            });
        }
        fn num<T: std::str::FromStr>(
            cell: &str,
            column: &str,
            line: usize,
        ) -> Result<T, ReportError> {
            cell.trim().parse().map_err(|_| ReportError::Malformed {
                line,
                message: format!("invalid {column}: {cell:?}"),
            })
        }
        Ok(Self {
            channel_title: cells[0].clone(),
            channel_id: cells[1].clone(),
            description: cells[2].clone(),
            subscriber_count: num(&cells[3], "subscriber_count", line)?,
            video_count: num(&cells[4], "video_count", line)?,
            view_count: num(&cells[5], "view_count", line)?,
            avg_views_last_5: num(&cells[6], "avg_views_last_5", line)?,
            upload_per_week: num(&cells[7], "upload_per_week", line)?,
            avg_like_view_ratio: num(&cells[8], "avg_like_view_ratio", line)?,
            credibility_score: num(&cells[9], "credibility_score", line)?,
        })
    }
}

/// Serialize `rows` and replace whatever report was at `path` before.
/// The header line is always written, even for zero rows.
pub fn write_report(path: &Path, rows: &[CreatorRow]) -> Result<(), ReportError> {
    let mut out = String::new();
    push_row(&mut out, REPORT_COLUMNS.iter().copied());
    for row in rows {
        let cells = row.to_cells();
        push_row(&mut out, cells.iter().map(String::as_str));
    }

    // Temp file in the same directory, then rename: readers see either the
    // old table or the new one, never a torn write.
    let tmp = path.with_extension("csv.tmp");
    std::fs::write(&tmp, &out)?;
    std::fs::rename(&tmp, path)?;

    tracing::info!(
        target: "report",
        path = %path.display(),
        rows = rows.len(),
        "report.written"
    );
    Ok(())
}

/// Load the report back into typed rows. `Ok(None)` when no report exists.
pub fn read_report(path: &Path) -> Result<Option<Vec<CreatorRow>>, ReportError> {
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(err.into()),
    };

    let records = parse_records(&text);
    let mut records = records.into_iter();
    let header = records.next().ok_or(ReportError::Malformed {
        line: 1,
        message: "missing header".into(),
    })?;
    if header != REPORT_COLUMNS {
        return Err(ReportError::Malformed {
            line: 1,
            message: format!("unrecognized header: {header:?}"),
        });
    }

    let mut rows = Vec::new();
    for (idx, record) in records.enumerate() {
        rows.push(CreatorRow::from_cells(&record, idx + 2)?);
    }
    Ok(Some(rows))
}

fn needs_quoting(cell: &str) -> bool {
    cell.contains(',') || cell.contains('"') || cell.contains('\n') || cell.contains('\r')
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>) {
    let mut first = true;
    for cell in cells {
        if !first {
            out.push(',');
        }
        first = false;
        if needs_quoting(cell) {
            let _ = write!(out, "\"{}\"", cell.replace('"', "\"\""));
        } else {
            out.push_str(cell);
        }
    }
    out.push('\n');
}

/// Quote-aware CSV split, tolerant of CRLF and of newlines inside quoted
/// fields (descriptions routinely contain both).
fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record: Vec<String> = Vec::new();
    let mut cell = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '"' => {
                if in_quotes {
                    if chars.peek() == Some(&'"') {
                        chars.next();
                        cell.push('"');
                    } else {
                        in_quotes = false;
                    }
                } else {
                    in_quotes = true;
                }
            }
            ',' if !in_quotes => {
                record.push(std::mem::take(&mut cell));
            }
            '\r' | '\n' if !in_quotes => {
                if ch == '\r' && chars.peek() == Some(&'\n') {
                    chars.next();
                }
                record.push(std::mem::take(&mut cell));
                let blank = record.len() == 1 && record[0].is_empty();
                if !blank {
                    records.push(std::mem::take(&mut record));
                } else {
                    record.clear();
                }
            }
            _ => cell.push(ch),
        }
    }

    // Trailing record without a final newline.
    if !cell.is_empty() || !record.is_empty() {
        record.push(cell);
        records.push(record);
    }
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_row(id: &str, description: &str) -> CreatorRow {
        CreatorRow {
            channel_title: "Money Matters".into(),
            channel_id: id.into(),
            description: description.into(),
            subscriber_count: 12_000,
            video_count: 240,
            view_count: 3_600_000,
            avg_views_last_5: 15_000,
            upload_per_week: 1.75,
            avg_like_view_ratio: 4.2,
            credibility_score: 3,
        }
    }

    #[test]
    fn round_trips_rows_including_awkward_descriptions() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("creators.csv");

        let rows = vec![
            sample_row("UCa", "plain description"),
            sample_row("UCb", "has, commas, and \"quotes\""),
            sample_row("UCc", "multi\nline\ndescription"),
        ];
        write_report(&path, &rows).unwrap();

        let loaded = read_report(&path).unwrap().expect("file exists");
        assert_eq!(loaded, rows);
    }

    #[test]
    fn empty_report_is_header_only_and_reads_back_empty() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("creators.csv");

        write_report(&path, &[]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, format!("{}\n", REPORT_COLUMNS.join(",")));
        assert_eq!(read_report(&path).unwrap(), Some(Vec::new()));
    }

    #[test]
    fn rewrite_replaces_previous_content() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("creators.csv");

        write_report(&path, &[sample_row("UCa", "old"), sample_row("UCb", "old")]).unwrap();
        write_report(&path, &[sample_row("UCc", "new")]).unwrap();

        let loaded = read_report(&path).unwrap().unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded[0].channel_id, "UCc");
    }

    #[test]
    fn missing_file_reads_as_none() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(read_report(&tmp.path().join("nope.csv")).unwrap(), None);
    }

    #[test]
    fn malformed_numeric_cell_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("creators.csv");
        let mut text = format!("{}\n", REPORT_COLUMNS.join(","));
        text.push_str("t,UCa,d,notanumber,1,2,3,0.00,0.00,1\n");
        std::fs::write(&path, text).unwrap();

        let err = read_report(&path).unwrap_err();
        assert!(matches!(err, ReportError::Malformed { line: 2, .. }));
    }

    #[test]
    fn unrecognized_header_is_rejected() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("creators.csv");
        std::fs::write(&path, "foo,bar\n").unwrap();

        let err = read_report(&path).unwrap_err();
        assert!(matches!(err, ReportError::Malformed { line: 1, .. }));
    }
}
