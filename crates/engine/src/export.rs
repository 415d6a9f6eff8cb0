//! Export normalization: records flattened back into output rows, plus the
//! run report for the JSON surface.

use std::collections::HashMap;

use serde::Serialize;

use crate::config::ClassifyPolicy;
use crate::model::{ReviewStatus, RowSet};
use crate::queue::{Discipline, ReviewQueue};

pub const VERIFICATION_STATUS_COLUMN: &str = "verification_status";
pub const REASON_COLUMN: &str = "reason";

/// Flatten the queue into output rows, one per record in backing order
/// (needs-review first, then auto-resolved). Original columns stay in
/// place and none is renamed or dropped; `id` is appended when it was
/// synthesized; `verification_status` carries the status string; a
/// `reason` column appears iff any record carries one, blank elsewhere.
/// Stable and reproducible from the same input.
pub fn export(queue: &ReviewQueue) -> RowSet {
    let mut columns: Vec<String> = queue.columns().to_vec();
    let id_col = queue.id_column();
    if !columns.iter().any(|c| c == id_col) {
        columns.push(id_col.to_string());
    }
    // Re-exports overwrite values in place rather than duplicating columns.
    if !columns.iter().any(|c| c == VERIFICATION_STATUS_COLUMN) {
        columns.push(VERIFICATION_STATUS_COLUMN.to_string());
    }
    let any_reason = queue.records().iter().any(|r| r.reason.is_some());
    if any_reason && !columns.iter().any(|c| c == REASON_COLUMN) {
        columns.push(REASON_COLUMN.to_string());
    }

    let rows = queue
        .records()
        .iter()
        .map(|record| {
            let mut row: HashMap<String, String> = record.fields.clone();
            row.insert(id_col.to_string(), record.id.clone());
            row.insert(
                VERIFICATION_STATUS_COLUMN.to_string(),
                record.status.as_str().to_string(),
            );
            if any_reason {
                row.insert(
                    REASON_COLUMN.to_string(),
                    record.reason.clone().unwrap_or_default(),
                );
            }
            row
        })
        .collect();

    RowSet { columns, rows }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct ExportMeta {
    pub engine_version: String,
    pub run_at: String,
    pub policy: ClassifyPolicy,
    pub discipline: Discipline,
}

impl ExportMeta {
    pub fn new(policy: ClassifyPolicy, discipline: Discipline) -> Self {
        Self {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
            policy,
            discipline,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TriageSummary {
    pub input_rows: usize,
    pub records: usize,
    pub reviewable: usize,
    pub auto_resolved: usize,
    pub discarded: usize,
    pub reviewed: usize,
    pub pending: usize,
    pub approved: usize,
    pub rejected: usize,
}

impl TriageSummary {
    pub fn from_queue(queue: &ReviewQueue) -> Self {
        let mut pending = 0;
        let mut approved = 0;
        let mut rejected = 0;
        for record in queue.records() {
            match record.status {
                ReviewStatus::Pending => pending += 1,
                ReviewStatus::Approved => approved += 1,
                ReviewStatus::Rejected => rejected += 1,
            }
        }
        Self {
            input_rows: queue.total_count() + queue.discarded_count(),
            records: queue.total_count(),
            reviewable: queue.reviewable_count(),
            auto_resolved: queue.auto_resolved_count(),
            discarded: queue.discarded_count(),
            reviewed: queue.reviewed_count(),
            pending,
            approved,
            rejected,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RecordSummary {
    pub id: String,
    pub status: ReviewStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Everything the JSON surface reports about a run.
#[derive(Debug, Clone, Serialize)]
pub struct TriageReport {
    pub meta: ExportMeta,
    pub summary: TriageSummary,
    pub records: Vec<RecordSummary>,
}

pub fn report(queue: &ReviewQueue, policy: ClassifyPolicy) -> TriageReport {
    TriageReport {
        meta: ExportMeta::new(policy, queue.discipline()),
        summary: TriageSummary::from_queue(queue),
        records: queue
            .records()
            .iter()
            .map(|r| RecordSummary {
                id: r.id.clone(),
                status: r.status,
                reason: r.reason.clone(),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
