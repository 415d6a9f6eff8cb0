use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Interchange
// ---------------------------------------------------------------------------

/// An imported table: header order plus one field map per row.
///
/// This is the black-box shape exchanged with the parse/serialize layer.
/// `columns` preserves header order; `rows` preserve input order. A row's
/// map may omit a column (short CSV line); readers treat that as blank.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

impl RowSet {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Decision state of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl ReviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Approved => "approved",
            Self::Rejected => "rejected",
        }
    }
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One reviewable unit built from an imported row.
///
/// `status` moves one way per decision event: after classification sets the
/// initial value, only an operator decision or an undo may change it.
#[derive(Debug, Clone, Serialize)]
pub struct Record {
    /// Unique within a queue. Taken verbatim from a non-empty `id` field,
    /// otherwise synthesized from the row's position in the original input.
    pub id: String,
    /// Every imported column verbatim, including ones the engine does not
    /// interpret.
    pub fields: HashMap<String, String>,
    pub status: ReviewStatus,
    /// Operator-supplied justification, set only on a confirmed rejection.
    pub reason: Option<String>,
}

impl Record {
    pub fn field(&self, column: &str) -> Option<&str> {
        self.fields.get(column).map(String::as_str)
    }

    /// Field value trimmed of surrounding whitespace, `None` when absent or
    /// blank. A blank receipt-URL read through this is the "URL missing"
    /// display state, not an error.
    pub fn trimmed_field(&self, column: &str) -> Option<&str> {
        match self.fields.get(column) {
            Some(v) => {
                let t = v.trim();
                if t.is_empty() {
                    None
                } else {
                    Some(t)
                }
            }
            None => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Decision events
// ---------------------------------------------------------------------------

/// One applied decision. Drives the last-action display and, under the
/// undo-capable discipline, single-step undo. Not persisted beyond the
/// current action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecisionEvent {
    pub record_id: String,
    /// Index into the queue's backing sequence.
    pub index: usize,
    pub prior_status: ReviewStatus,
    pub new_status: ReviewStatus,
    pub reason: Option<String>,
    /// Justification the record carried before this decision; restored on undo.
    pub prior_reason: Option<String>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record_with(fields: &[(&str, &str)]) -> Record {
        Record {
            id: "receipt-0".into(),
            fields: fields
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            status: ReviewStatus::Pending,
            reason: None,
        }
    }

    #[test]
    fn status_string_forms() {
        assert_eq!(ReviewStatus::Pending.as_str(), "pending");
        assert_eq!(ReviewStatus::Approved.as_str(), "approved");
        assert_eq!(ReviewStatus::Rejected.as_str(), "rejected");
        assert_eq!(ReviewStatus::Rejected.to_string(), "rejected");
    }

    #[test]
    fn trimmed_field_blank_is_none() {
        let r = record_with(&[("receiptUrl", "   "), ("name", " Ada Lovelace ")]);
        assert_eq!(r.trimmed_field("receiptUrl"), None);
        assert_eq!(r.trimmed_field("name"), Some("Ada Lovelace"));
        assert_eq!(r.trimmed_field("missing"), None);
    }
}
