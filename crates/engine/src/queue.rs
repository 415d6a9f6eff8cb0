use serde::Serialize;

use crate::error::EngineError;
use crate::model::{DecisionEvent, Record, ReviewStatus};

// ---------------------------------------------------------------------------
// Discipline
// ---------------------------------------------------------------------------

/// Navigation discipline of a review queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    /// Cursor starts at 0 and only ever advances; done once it reaches the
    /// boundary. No undo.
    Forward,
    /// Cursor starts at the last reviewable index and the queue is consumed
    /// back to front; done below 0. Supports restore.
    Backward,
}

impl Discipline {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "backward",
        }
    }
}

impl std::fmt::Display for Discipline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Queue
// ---------------------------------------------------------------------------

/// Ordered records plus a cursor and the fixed reviewable boundary.
///
/// Backing order: needs-review records first in original row order, then
/// auto-resolved records in original row order. The boundary is set at
/// construction and never moves. Records at or past the boundary are never
/// presented and keep their classifier-assigned status.
///
/// Cursor range: `[0, boundary]` under `Forward`, `[-1, boundary - 1]`
/// under `Backward`; outside-the-reviewable-range values mean done.
#[derive(Debug, Clone)]
pub struct ReviewQueue {
    columns: Vec<String>,
    id_column: String,
    records: Vec<Record>,
    boundary: usize,
    discarded: usize,
    discipline: Discipline,
    cursor: isize,
}

impl ReviewQueue {
    pub(crate) fn new(
        columns: Vec<String>,
        id_column: String,
        records: Vec<Record>,
        boundary: usize,
        discarded: usize,
    ) -> Self {
        Self {
            columns,
            id_column,
            records,
            boundary,
            discarded,
            discipline: Discipline::Forward,
            cursor: 0,
        }
    }

    /// Switch discipline and reset the cursor to its starting position.
    /// Meant to be called before review begins, not mid-session.
    pub fn with_discipline(mut self, discipline: Discipline) -> Self {
        self.discipline = discipline;
        self.cursor = match discipline {
            Discipline::Forward => 0,
            Discipline::Backward => self.boundary as isize - 1,
        };
        self
    }

    // ── Presentation ────────────────────────────────────────────────────

    /// The record at the cursor, `None` once review is done.
    pub fn current(&self) -> Option<&Record> {
        if self.is_done() {
            None
        } else {
            self.records.get(self.cursor as usize)
        }
    }

    pub fn is_done(&self) -> bool {
        match self.discipline {
            Discipline::Forward => self.cursor >= self.boundary as isize,
            Discipline::Backward => self.cursor < 0,
        }
    }

    /// Apply a decision to the record at the cursor and move the cursor per
    /// the discipline. Returns the decision event describing the mutation.
    ///
    /// Once `is_done()` holds this returns `EngineError::OutOfRange` and
    /// mutates nothing; callers treat that as a local no-op. It never
    /// writes past the boundary.
    pub fn apply_decision(
        &mut self,
        status: ReviewStatus,
        reason: Option<String>,
    ) -> Result<DecisionEvent, EngineError> {
        if self.is_done() {
            return Err(EngineError::OutOfRange {
                cursor: self.cursor,
                boundary: self.boundary,
            });
        }
        let index = self.cursor as usize;
        let record = &mut self.records[index];
        let event = DecisionEvent {
            record_id: record.id.clone(),
            index,
            prior_status: record.status,
            new_status: status,
            reason: reason.clone(),
            prior_reason: record.reason.clone(),
        };
        record.status = status;
        record.reason = reason;
        self.cursor += match self.discipline {
            Discipline::Forward => 1,
            Discipline::Backward => -1,
        };
        Ok(event)
    }

    /// Re-present the record at `index` without changing its status.
    ///
    /// Backward discipline only; a no-op (returning `false`) unless
    /// `cursor < index`, so a record already legitimately passed cannot be
    /// resurrected, and never for an index at or past the boundary.
    pub fn restore(&mut self, index: usize) -> bool {
        if self.discipline != Discipline::Backward {
            return false;
        }
        if index >= self.boundary {
            return false;
        }
        if self.cursor >= index as isize {
            return false;
        }
        self.cursor = index as isize;
        true
    }

    // ── Counts ──────────────────────────────────────────────────────────

    /// Reviewable positions consumed so far.
    pub fn reviewed_count(&self) -> usize {
        match self.discipline {
            Discipline::Forward => self.cursor as usize,
            Discipline::Backward => (self.boundary as isize - 1 - self.cursor) as usize,
        }
    }

    /// The reviewable boundary: records needing operator attention.
    pub fn reviewable_count(&self) -> usize {
        self.boundary
    }

    /// Full backing-sequence length, auto-resolved records included.
    pub fn total_count(&self) -> usize {
        self.records.len()
    }

    pub fn auto_resolved_count(&self) -> usize {
        self.records.len() - self.boundary
    }

    /// Rows the eligibility filter (or the discard policy) dropped.
    pub fn discarded_count(&self) -> usize {
        self.discarded
    }

    // ── Access ──────────────────────────────────────────────────────────

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn discipline(&self) -> Discipline {
        self.discipline
    }

    pub fn record(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub(crate) fn record_mut(&mut self, index: usize) -> Option<&mut Record> {
        self.records.get_mut(index)
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.records.iter().position(|r| r.id == id)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Original header order of the imported table.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Configured name of the id column.
    pub fn id_column(&self) -> &str {
        &self.id_column
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
