// JSON export

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use receiptdeck_engine::RowSet;
use serde_json::{Map, Value};

/// Export the table as a JSON array of objects, one object per row, keys in
/// column order. Absent keys export as empty strings so every object has the
/// same shape.
pub fn export(rows: &RowSet, path: &Path) -> Result<(), String> {
    let file = File::create(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, &to_values(rows)).map_err(|e| e.to_string())
}

/// Render the table as a pretty JSON string (stdout output).
pub fn to_string(rows: &RowSet) -> Result<String, String> {
    serde_json::to_string_pretty(&to_values(rows)).map_err(|e| e.to_string())
}

fn to_values(rows: &RowSet) -> Vec<Value> {
    rows.rows
        .iter()
        .map(|row| {
            let mut object = Map::new();
            for column in &rows.columns {
                let value = row.get(column).cloned().unwrap_or_default();
                object.insert(column.clone(), Value::String(value));
            }
            Value::Object(object)
        })
        .collect()
}
