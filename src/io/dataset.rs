//! CSV read and rewrite.
//!
//! Reading is lenient about shape (rows may be shorter than the header) but strict
//! about encoding: a record that is not valid UTF-8 aborts the read. A leading
//! UTF-8 byte-order mark is stripped.
//!
//! Writing always starts with a UTF-8 byte-order mark, quotes every field, keeps
//! the header order, and ends each record with a single `\r\n`. The new contents
//! go to a temp file in the same directory, take over the target's permissions,
//! and are then renamed over the target.

use std::fs;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, StringRecord, Terminator};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::domain::{Dataset, Header, Row};
use crate::error::AppError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Read the whole CSV at `path` into memory.
pub fn read_dataset(path: &Path) -> Result<Dataset, AppError> {
    let bytes = fs::read(path)
        .map_err(|e| AppError::io(format!("Failed to read CSV '{}': {e}", path.display())))?;
    parse_dataset(&bytes)
}

/// Parse CSV bytes (header row first).
pub fn parse_dataset(bytes: &[u8]) -> Result<Dataset, AppError> {
    let (body, had_bom) = match bytes.strip_prefix(UTF8_BOM) {
        Some(rest) => (rest, true),
        None => (bytes, false),
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body);

    let headers = reader
        .headers()
        .map_err(|e| AppError::structural(format!("Failed to read CSV header: {e}")))?
        .clone();
    let header = build_header(&headers);

    let mut lines = LineCounter::new(body);
    let mut rows = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let record = result.map_err(|e| AppError::structural(format!("CSV parse error: {e}")))?;
        // +2: 1-based, and the header occupies line 1.
        let line = record
            .position()
            .map_or(idx as u64 + 2, |p| lines.line_at(p.byte() as usize));
        rows.push(build_row(line, &record, header.len()));
    }

    debug!(had_bom, rows = rows.len(), "parsed CSV");
    Ok(Dataset { header, rows, had_bom })
}

/// Maps record start offsets to 1-based physical line numbers.
///
/// Counts `\n` bytes only, so LF and CRLF files number their lines the same.
/// Offsets must be queried in non-decreasing order.
struct LineCounter<'a> {
    body: &'a [u8],
    offset: usize,
    line: u64,
}

impl<'a> LineCounter<'a> {
    fn new(body: &'a [u8]) -> Self {
        Self {
            body,
            offset: 0,
            line: 1,
        }
    }

    fn line_at(&mut self, byte: usize) -> u64 {
        // A record never starts on a line terminator; step past any the offset
        // still points at.
        let start = byte.min(self.body.len());
        let start = start
            + self.body[start..]
                .iter()
                .take_while(|&&b| b == b'\r' || b == b'\n')
                .count();

        if start > self.offset {
            let newlines = self.body[self.offset..start].iter().filter(|&&b| b == b'\n').count();
            self.line += newlines as u64;
            self.offset = start;
        }
        self.line
    }
}

fn build_header(headers: &StringRecord) -> Header {
    // A lone empty field (e.g. a first line of `""`) names no columns.
    if headers.len() == 1 && headers.get(0).is_some_and(str::is_empty) {
        return Header::default();
    }
    Header::new(headers.iter().map(str::to_string).collect())
}

fn build_row(line: u64, record: &StringRecord, width: usize) -> Row {
    if record.len() > width {
        warn!(line, extra = record.len() - width, "dropping fields beyond the header");
    }
    let values = record.iter().take(width).map(|v| Some(v.to_string())).collect();
    Row::new(line, values)
}

/// Atomically replace `path` with the given dataset.
pub fn write_dataset(path: &Path, dataset: &Dataset) -> Result<(), AppError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)
        .map_err(|e| AppError::io(format!("Failed to create temp file in '{}': {e}", dir.display())))?;

    encode_dataset(&mut tmp, dataset)?;

    let permissions = fs::metadata(path)
        .map_err(|e| AppError::io(format!("Failed to read metadata of '{}': {e}", path.display())))?
        .permissions();
    fs::set_permissions(tmp.path(), permissions)
        .map_err(|e| AppError::io(format!("Failed to set permissions on temp file: {e}")))?;

    tmp.persist(path)
        .map_err(|e| AppError::io(format!("Failed to replace CSV '{}': {}", path.display(), e.error)))?;
    Ok(())
}

/// Serialize `dataset` as BOM-prefixed, quote-all CSV.
pub fn encode_dataset<W: Write>(mut out: W, dataset: &Dataset) -> Result<(), AppError> {
    out.write_all(UTF8_BOM)
        .map_err(|e| AppError::io(format!("Failed to write CSV: {e}")))?;

    let mut writer = csv::WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .terminator(Terminator::CRLF)
        .from_writer(out);

    writer
        .write_record(dataset.header.columns())
        .map_err(|e| AppError::io(format!("Failed to write CSV header: {e}")))?;
    for row in &dataset.rows {
        writer
            .write_record(row.fields())
            .map_err(|e| AppError::io(format!("Failed to write CSV row (line {}): {e}", row.line)))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::io(format!("Failed to flush CSV: {e}")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(dataset: &Dataset) -> String {
        let mut buf = Vec::new();
        encode_dataset(&mut buf, dataset).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn strips_and_remembers_bom() {
        let ds = parse_dataset(b"\xEF\xBB\xBFid,capacity,enrolled_count\r\nA,10,\r\n").unwrap();
        assert!(ds.had_bom);
        assert_eq!(ds.header.columns()[0], "id");
        assert_eq!(ds.header.position("capacity"), Some(1));
        assert_eq!(ds.rows.len(), 1);
        assert_eq!(ds.rows[0].get(1), Some("10"));
        assert_eq!(ds.rows[0].line, 2);
    }

    #[test]
    fn plain_input_has_no_bom() {
        let ds = parse_dataset(b"capacity,enrolled_count\n5,1\n").unwrap();
        assert!(!ds.had_bom);
        assert_eq!(ds.rows.len(), 1);
    }

    #[test]
    fn line_numbers_match_for_lf_and_crlf() {
        let lf = parse_dataset(b"capacity,enrolled_count\n5,1\n\n7,2\n").unwrap();
        let crlf = parse_dataset(b"capacity,enrolled_count\r\n5,1\r\n\r\n7,2\r\n").unwrap();
        let lf_lines: Vec<u64> = lf.rows.iter().map(|r| r.line).collect();
        let crlf_lines: Vec<u64> = crlf.rows.iter().map(|r| r.line).collect();
        assert_eq!(lf_lines, vec![2, 4]);
        assert_eq!(crlf_lines, lf_lines);
    }

    #[test]
    fn quoted_newlines_advance_line_numbers() {
        let ds = parse_dataset(b"title,capacity\r\n\"a\r\nb\",1\r\nc,2\r\n").unwrap();
        assert_eq!(ds.rows[0].line, 2);
        assert_eq!(ds.rows[1].line, 4);
    }

    #[test]
    fn short_rows_keep_absent_fields_absent() {
        let ds = parse_dataset(b"a,b,c\n1\n1,2,3,4\n").unwrap();
        assert_eq!(ds.rows[0].values, vec![Some("1".to_string())]);
        assert_eq!(ds.rows[1].values.len(), 3);
    }

    #[test]
    fn empty_input_has_empty_header() {
        let ds = parse_dataset(b"").unwrap();
        assert!(ds.header.is_empty());
        assert!(ds.rows.is_empty());
    }

    #[test]
    fn invalid_utf8_is_structural() {
        let err = parse_dataset(b"capacity,enrolled_count\n\xFF\xFE,1\n").unwrap_err();
        assert_eq!(err.kind(), crate::error::ErrorKind::Structural);
    }

    #[test]
    fn output_quotes_every_field_with_crlf() {
        let ds = Dataset {
            header: Header::new(vec!["id".into(), "capacity".into(), "enrolled_count".into()]),
            rows: vec![Row::new(
                2,
                vec![Some("say \"hi\"".into()), Some("10".into()), Some(String::new())],
            )],
            had_bom: false,
        };
        assert_eq!(
            encode(&ds),
            "\u{feff}\"id\",\"capacity\",\"enrolled_count\"\r\n\"say \"\"hi\"\"\",\"10\",\"\"\r\n"
        );
    }

    #[test]
    fn output_always_starts_with_bom() {
        for had_bom in [false, true] {
            let ds = Dataset {
                header: Header::new(vec!["capacity".into()]),
                rows: Vec::new(),
                had_bom,
            };
            let text = encode(&ds);
            assert_eq!(text, "\u{feff}\"capacity\"\r\n", "had_bom={had_bom}");
        }
    }

    #[test]
    fn write_replaces_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.csv");
        fs::write(&path, "capacity,enrolled_count\n3,\n").unwrap();

        let mut ds = read_dataset(&path).unwrap();
        ds.rows[0].set(1, "2".into());
        write_dataset(&path, &ds).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "\u{feff}\"capacity\",\"enrolled_count\"\r\n\"3\",\"2\"\r\n");
        // No stray temp files left behind.
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn write_keeps_target_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("courses.csv");
        fs::write(&path, "capacity,enrolled_count\n3,\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o644)).unwrap();

        let ds = read_dataset(&path).unwrap();
        write_dataset(&path, &ds).unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}
