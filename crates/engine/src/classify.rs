//! Classification: eligibility filter, auto-resolution, partition.
//!
//! Pure functions of the imported field maps. A fixed input classifies to
//! the same queue on every run.

use std::collections::HashSet;

use crate::config::{ClassifyPolicy, TriageConfig};
use crate::error::EngineError;
use crate::model::{Record, ReviewStatus, RowSet};
use crate::queue::ReviewQueue;

/// Trimmed, case-folded form used for every classification comparison.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Turns imported rows into a review queue.
#[derive(Debug, Clone)]
pub struct Classifier {
    config: TriageConfig,
}

impl Classifier {
    pub fn new(config: TriageConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TriageConfig {
        &self.config
    }

    pub fn policy(&self) -> ClassifyPolicy {
        self.config.policy
    }

    /// Classify `rows` into a fresh queue.
    ///
    /// Import is a full state replacement: on success the caller drops any
    /// prior queue; on error the prior queue stays untouched (nothing here
    /// mutates shared state).
    ///
    /// Backing order is needs-review records in original row order, then
    /// auto-resolved records in original row order, with the boundary at
    /// the count of needs-review records.
    pub fn classify(&self, rows: &RowSet) -> Result<ReviewQueue, EngineError> {
        let mut seen_columns: HashSet<&str> = HashSet::new();
        for column in &rows.columns {
            if !seen_columns.insert(column.as_str()) {
                return Err(EngineError::Ingestion(format!(
                    "duplicate column '{column}' in header"
                )));
            }
        }

        let cols = &self.config.columns;
        for required in [
            &cols.name,
            &cols.email,
            &cols.receipt_url,
            &cols.travel_request,
        ] {
            if !rows.columns.iter().any(|c| c == required) {
                return Err(EngineError::MissingColumn {
                    column: required.clone(),
                });
            }
        }

        let mut needs_review: Vec<Record> = Vec::new();
        let mut auto_resolved: Vec<Record> = Vec::new();
        let mut seen_ids: HashSet<String> = HashSet::new();
        let mut discarded = 0usize;

        for (index, row) in rows.rows.iter().enumerate() {
            // Eligibility: travel requested and a usable receipt URL.
            let travel = row
                .get(&cols.travel_request)
                .map(|v| normalize(v))
                .unwrap_or_default();
            if travel != "yes" {
                discarded += 1;
                continue;
            }
            let url = row
                .get(&cols.receipt_url)
                .map(|v| normalize(v))
                .unwrap_or_default();
            if url.is_empty() || url == "none" {
                discarded += 1;
                continue;
            }

            // Auto-resolution: no project submission.
            let unsubmitted = match row.get(&cols.project) {
                Some(v) => {
                    let norm = normalize(v);
                    norm.is_empty() || norm == "no submission"
                }
                None => true,
            };
            if unsubmitted && self.config.policy == ClassifyPolicy::Discard {
                discarded += 1;
                continue;
            }

            // Ids: supplied verbatim, otherwise synthesized from the raw
            // input position so they stay stable across policies.
            let id = match row.get(&cols.id).map(|v| v.trim()) {
                Some(v) if !v.is_empty() => v.to_string(),
                _ => format!("receipt-{index}"),
            };
            if !seen_ids.insert(id.clone()) {
                return Err(EngineError::DuplicateId { id, row: index });
            }

            let record = Record {
                id,
                fields: row.clone(),
                status: if unsubmitted {
                    ReviewStatus::Rejected
                } else {
                    ReviewStatus::Pending
                },
                reason: None,
            };
            if unsubmitted {
                auto_resolved.push(record);
            } else {
                needs_review.push(record);
            }
        }

        let boundary = needs_review.len();
        let mut records = needs_review;
        records.extend(auto_resolved);

        Ok(ReviewQueue::new(
            rows.columns.clone(),
            cols.id.clone(),
            records,
            boundary,
            discarded,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &[&str] = &[
        "name",
        "email",
        "receiptUrl",
        "requests travel (travel form)",
        "project",
        "id",
    ];

    fn rowset(columns: &[&str], rows: &[&[&str]]) -> RowSet {
        RowSet {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: rows
                .iter()
                .map(|values| {
                    columns
                        .iter()
                        .zip(values.iter())
                        .map(|(c, v)| (c.to_string(), v.to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    fn classify(rows: &RowSet) -> ReviewQueue {
        Classifier::new(TriageConfig::default()).classify(rows).unwrap()
    }

    #[test]
    fn ineligible_rows_are_discarded_entirely() {
        let rows = rowset(
            HEADER,
            &[
                &["Ada", "ada@example.com", "https://r/1.pdf", "yes", "Apollo", ""],
                &["Ben", "ben@example.com", "https://r/2.pdf", "no", "Apollo", ""],
                &["Cam", "cam@example.com", "", "yes", "Apollo", ""],
                &["Dee", "dee@example.com", "NONE", "yes", "Apollo", ""],
                &["Eli", "eli@example.com", "https://r/5.pdf", " YES ", "Apollo", ""],
            ],
        );
        let q = classify(&rows);
        assert_eq!(q.total_count(), 2);
        assert_eq!(q.discarded_count(), 3);
        let ids: Vec<_> = q.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["receipt-0", "receipt-4"]);
    }

    #[test]
    fn classification_is_deterministic() {
        let rows = rowset(
            HEADER,
            &[
                &["Ada", "a@x", "https://r/1", "yes", "Apollo", ""],
                &["Ben", "b@x", "https://r/2", "yes", "No Submission", ""],
                &["Cam", "c@x", "https://r/3", "no", "Apollo", ""],
            ],
        );
        let first: Vec<_> = classify(&rows)
            .records()
            .iter()
            .map(|r| (r.id.clone(), r.status))
            .collect();
        let second: Vec<_> = classify(&rows)
            .records()
            .iter()
            .map(|r| (r.id.clone(), r.status))
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn unsubmitted_projects_are_auto_rejected_past_the_boundary() {
        // 5 rows, row 3 has no submission: the operator sees 4 cards.
        let rows = rowset(
            HEADER,
            &[
                &["A", "a@x", "https://r/1", "yes", "Apollo", ""],
                &["B", "b@x", "https://r/2", "yes", "Borealis", ""],
                &["C", "c@x", "https://r/3", "yes", "No Submission", ""],
                &["D", "d@x", "https://r/4", "yes", "Apollo", ""],
                &["E", "e@x", "https://r/5", "yes", "Borealis", ""],
            ],
        );
        let q = classify(&rows);
        assert_eq!(q.total_count(), 5);
        assert_eq!(q.reviewable_count(), 4);
        assert_eq!(q.auto_resolved_count(), 1);

        let ids: Vec<_> = q.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(
            ids,
            ["receipt-0", "receipt-1", "receipt-3", "receipt-4", "receipt-2"]
        );
        let auto = q.record(4).unwrap();
        assert_eq!(auto.status, ReviewStatus::Rejected);
        assert_eq!(auto.reason, None);
        for r in &q.records()[..4] {
            assert_eq!(r.status, ReviewStatus::Pending);
        }
    }

    #[test]
    fn absent_or_blank_project_counts_as_unsubmitted() {
        let header = &["name", "email", "receiptUrl", "requests travel (travel form)"];
        let rows = rowset(
            header,
            &[&["A", "a@x", "https://r/1", "yes"], &["B", "b@x", "https://r/2", "yes"]],
        );
        let q = classify(&rows);
        assert_eq!(q.reviewable_count(), 0);
        assert_eq!(q.auto_resolved_count(), 2);

        let rows = rowset(
            HEADER,
            &[&["A", "a@x", "https://r/1", "yes", "   ", ""]],
        );
        let q = classify(&rows);
        assert_eq!(q.auto_resolved_count(), 1);
    }

    #[test]
    fn discard_policy_drops_unsubmitted_projects() {
        let config = TriageConfig {
            policy: ClassifyPolicy::Discard,
            ..TriageConfig::default()
        };
        let rows = rowset(
            HEADER,
            &[
                &["A", "a@x", "https://r/1", "yes", "Apollo", ""],
                &["B", "b@x", "https://r/2", "yes", "no submission", ""],
            ],
        );
        let q = Classifier::new(config).classify(&rows).unwrap();
        assert_eq!(q.total_count(), 1);
        assert_eq!(q.auto_resolved_count(), 0);
        assert_eq!(q.discarded_count(), 1);
    }

    #[test]
    fn supplied_ids_kept_verbatim_and_blank_ids_synthesized() {
        let rows = rowset(
            HEADER,
            &[
                &["A", "a@x", "https://r/1", "yes", "Apollo", "EXP-77"],
                &["B", "b@x", "https://r/2", "yes", "Apollo", "   "],
            ],
        );
        let q = classify(&rows);
        let ids: Vec<_> = q.records().iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["EXP-77", "receipt-1"]);
    }

    #[test]
    fn synthesized_ids_index_the_raw_input() {
        // The discarded first row still owns index 0, under either policy.
        let rows = rowset(
            HEADER,
            &[
                &["A", "a@x", "none", "yes", "Apollo", ""],
                &["B", "b@x", "https://r/2", "yes", "Apollo", ""],
            ],
        );
        let q = classify(&rows);
        assert_eq!(q.records()[0].id, "receipt-1");
    }

    #[test]
    fn duplicate_ids_fail_the_import() {
        let rows = rowset(
            HEADER,
            &[
                &["A", "a@x", "https://r/1", "yes", "Apollo", "EXP-1"],
                &["B", "b@x", "https://r/2", "yes", "Apollo", "EXP-1"],
            ],
        );
        let err = Classifier::new(TriageConfig::default())
            .classify(&rows)
            .unwrap_err();
        assert!(matches!(err, EngineError::DuplicateId { row: 1, .. }));
    }

    #[test]
    fn duplicate_header_columns_fail_the_import() {
        let header = &[
            "name",
            "email",
            "receiptUrl",
            "requests travel (travel form)",
            "name",
        ];
        let rows = rowset(header, &[&["A", "a@x", "https://r/1", "yes", "A2"]]);
        let err = Classifier::new(TriageConfig::default())
            .classify(&rows)
            .unwrap_err();
        assert!(err.to_string().contains("duplicate column 'name'"));
    }

    #[test]
    fn missing_required_column_fails_the_import() {
        let rows = rowset(
            &["name", "email", "requests travel (travel form)"],
            &[&["A", "a@x", "yes"]],
        );
        let err = Classifier::new(TriageConfig::default())
            .classify(&rows)
            .unwrap_err();
        match err {
            EngineError::MissingColumn { column } => assert_eq!(column, "receiptUrl"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn uninterpreted_columns_ride_along() {
        let header = &[
            "name",
            "email",
            "receiptUrl",
            "requests travel (travel form)",
            "project",
            "cost center",
        ];
        let rows = rowset(
            header,
            &[&["A", "a@x", "https://r/1", "yes", "Apollo", "CC-204"]],
        );
        let q = classify(&rows);
        assert_eq!(q.records()[0].field("cost center"), Some("CC-204"));
    }
}
