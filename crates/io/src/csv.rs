// CSV/TSV import/export

use std::collections::HashMap;
use std::path::Path;

use receiptdeck_engine::RowSet;

pub fn import(path: &Path) -> Result<RowSet, String> {
    let content = read_file_as_utf8(path)?;
    let delimiter = sniff_delimiter(&content);
    import_from_string(&content, delimiter)
}

pub fn import_tsv(path: &Path) -> Result<RowSet, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, b'\t')
}

pub fn import_with_delimiter(path: &Path, delimiter: u8) -> Result<RowSet, String> {
    let content = read_file_as_utf8(path)?;
    import_from_string(&content, delimiter)
}

/// Import from an in-memory string (stdin), sniffing the delimiter.
pub fn import_str(content: &str) -> Result<RowSet, String> {
    let delimiter = sniff_delimiter(content);
    import_from_string(content, delimiter)
}

/// Detect the most likely field delimiter by checking consistency across the
/// first few lines.
///
/// For each candidate (tab, semicolon, comma, pipe), count fields per line.
/// The delimiter that produces the most consistent field count (>1 field) wins.
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

        // Must split the header line into >1 field to be viable
        if counts.first().copied().unwrap_or(0) <= 1 {
            continue;
        }

        // Score: (lines matching the header's field count) * field count.
        // Higher field count breaks ties toward the real delimiter.
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
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;

    // Try UTF-8 first; on failure, recover the buffer from the error
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => {
            // Windows-1252 fallback, common for Excel-exported CSVs
            let bytes = e.into_bytes();
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(&bytes);
            Ok(decoded.into_owned())
        }
    }
}

/// Parse delimited text into a header-keyed table.
///
/// The first record is the header; each following record becomes a map from
/// column name to field value. Rows shorter than the header simply lack those
/// keys. Fields beyond the header width are dropped.
pub fn import_from_string(content: &str, delimiter: u8) -> Result<RowSet, String> {
    // Excel prepends a BOM to UTF-8 exports; it must not stick to the first
    // column name.
    let content = content.strip_prefix('\u{feff}').unwrap_or(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(content.as_bytes());
    let mut records = reader.records();

    let header = match records.next() {
        Some(result) => result.map_err(|e| e.to_string())?,
        None => return Err("empty input: expected a header row".to_string()),
    };

    let mut columns: Vec<String> = header.iter().map(|h| h.trim().to_string()).collect();
    // A trailing delimiter leaves empty header cells; drop them.
    while columns.last().is_some_and(|c| c.is_empty()) {
        columns.pop();
    }
    if columns.is_empty() {
        return Err("empty input: expected a header row".to_string());
    }

    let mut rows: Vec<HashMap<String, String>> = Vec::new();
    for result in records {
        let record = result.map_err(|e| e.to_string())?;
        if record.iter().all(|f| f.trim().is_empty()) {
            continue;
        }
        let mut row = HashMap::new();
        for (i, field) in record.iter().enumerate() {
            if i >= columns.len() {
                break;
            }
            row.insert(columns[i].clone(), field.to_string());
        }
        rows.push(row);
    }

    Ok(RowSet { columns, rows })
}

pub fn export(rows: &RowSet, path: &Path) -> Result<(), String> {
    export_with_delimiter(rows, path, b',')
}

pub fn export_tsv(rows: &RowSet, path: &Path) -> Result<(), String> {
    export_with_delimiter(rows, path, b'\t')
}

fn export_with_delimiter(rows: &RowSet, path: &Path, delimiter: u8) -> Result<(), String> {
    let file = std::fs::File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    write_rows(rows, file, delimiter)
}

/// Render the table as a CSV string (stdout output).
pub fn to_string(rows: &RowSet) -> Result<String, String> {
    let mut buf = Vec::new();
    write_rows(rows, &mut buf, b',')?;
    String::from_utf8(buf).map_err(|e| e.to_string())
}

fn write_rows<W: std::io::Write>(rows: &RowSet, writer: W, delimiter: u8) -> Result<(), String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    writer.write_record(&rows.columns).map_err(|e| e.to_string())?;
    for row in &rows.rows {
        // Column order decides field order; absent keys write as blanks
        let record: Vec<&str> = rows
            .columns
            .iter()
            .map(|c| row.get(c).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(&record).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn table(columns: &[&str], data: &[&[&str]]) -> RowSet {
        let columns: Vec<String> = columns.iter().map(|c| c.to_string()).collect();
        let rows = data
            .iter()
            .map(|values| {
                columns
                    .iter()
                    .cloned()
                    .zip(values.iter().map(|v| v.to_string()))
                    .collect()
            })
            .collect();
        RowSet { columns, rows }
    }

    #[test]
    fn test_sniff_comma_delimiter() {
        let content = "name,email,receiptUrl\nAlice,a@corp.test,https://r/1\n";
        assert_eq!(sniff_delimiter(content), b',');
    }

    #[test]
    fn test_sniff_semicolon_delimiter() {
        let content = "name;email;receiptUrl\nAlice;a@corp.test;https://r/1\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_sniff_tab_delimiter() {
        let content = "name\temail\treceiptUrl\nAlice\ta@corp.test\thttps://r/1\n";
        assert_eq!(sniff_delimiter(content), b'\t');
    }

    #[test]
    fn test_sniff_pipe_delimiter() {
        let content = "name|email|receiptUrl\nAlice|a@corp.test|https://r/1\n";
        assert_eq!(sniff_delimiter(content), b'|');
    }

    #[test]
    fn test_sniff_semicolon_with_commas_in_values() {
        // Semicolon-delimited, but commas appear inside quoted fields
        let content =
            "name;address;email\n\"Doe, Jane\";\"12 Main St, Apt 4\";j@corp.test\nBob;\"5 Elm\";b@corp.test\n";
        assert_eq!(sniff_delimiter(content), b';');
    }

    #[test]
    fn test_import_keys_rows_by_header() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "name,email,project\nAlice,a@corp.test,Apollo\nBob,b@corp.test,Hermes\n")
            .unwrap();

        let rows = import(&path).unwrap();
        assert_eq!(rows.columns, vec!["name", "email", "project"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows[0]["name"], "Alice");
        assert_eq!(rows.rows[0]["project"], "Apollo");
        assert_eq!(rows.rows[1]["email"], "b@corp.test");
    }

    #[test]
    fn test_semicolon_import_is_sniffed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "name;email\nAlice;a@corp.test\n").unwrap();

        let rows = import(&path).unwrap();
        assert_eq!(rows.columns, vec!["name", "email"]);
        assert_eq!(rows.rows[0]["name"], "Alice");
    }

    #[test]
    fn test_short_rows_leave_keys_absent() {
        let rows = import_from_string("name,email,project\nAlice,a@corp.test\n", b',').unwrap();
        assert_eq!(rows.rows[0].get("email").map(String::as_str), Some("a@corp.test"));
        assert_eq!(rows.rows[0].get("project"), None);
    }

    #[test]
    fn test_blank_lines_are_skipped() {
        let rows = import_from_string("name,email\nAlice,a@corp.test\n\n\nBob,b@corp.test\n", b',')
            .unwrap();
        assert_eq!(rows.len(), 2);
    }

    #[test]
    fn test_bom_does_not_stick_to_the_first_column() {
        let rows = import_from_string("\u{feff}name,email\nAlice,a@corp.test\n", b',').unwrap();
        assert_eq!(rows.columns[0], "name");
        assert_eq!(rows.rows[0]["name"], "Alice");
    }

    #[test]
    fn test_trailing_blank_header_cells_are_dropped() {
        let rows = import_from_string("name,email,\nAlice,a@corp.test,\n", b',').unwrap();
        assert_eq!(rows.columns, vec!["name", "email"]);
        assert_eq!(rows.rows[0].get(""), None);
    }

    #[test]
    fn test_empty_input_fails() {
        let err = import_from_string("", b',').unwrap_err();
        assert!(err.contains("header"), "unexpected error: {err}");
    }

    #[test]
    fn test_windows_1252_fallback() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("latin.csv");
        // 0xE9 is é in Windows-1252; invalid on its own as UTF-8
        fs::write(&path, b"name,city\nJos\xe9,Par\xeds\n").unwrap();

        let rows = import(&path).unwrap();
        assert_eq!(rows.rows[0]["name"], "José");
        assert_eq!(rows.rows[0]["city"], "París");
    }

    #[test]
    fn test_export_writes_blanks_for_absent_keys() {
        let mut row = HashMap::new();
        row.insert("name".to_string(), "Alice".to_string());
        let rows = RowSet {
            columns: vec!["name".to_string(), "project".to_string()],
            rows: vec![row],
        };

        let out = to_string(&rows).unwrap();
        assert_eq!(out, "name,project\nAlice,\n");
    }

    #[test]
    fn test_tsv_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.tsv");
        let rows = table(
            &["name", "email", "project"],
            &[
                &["Alice", "a@corp.test", "Apollo"],
                &["Doe, Jane", "j@corp.test", "Hermes"],
            ],
        );

        export_tsv(&rows, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains('\t'), "TSV should contain tab characters");

        let back = import_tsv(&path).unwrap();
        assert_eq!(back, rows);
    }

    #[test]
    fn test_quoted_commas_survive_a_csv_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let rows = table(
            &["name", "address"],
            &[&["Doe, Jane", "12 Main St, Apt 4"]],
        );

        export(&rows, &path).unwrap();
        let back = import(&path).unwrap();
        assert_eq!(back, rows);
    }
}
