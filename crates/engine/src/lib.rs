//! `receiptdeck-engine`: review-queue engine for bulk-imported receipts.
//!
//! Pure engine crate: receives pre-parsed field maps, classifies them into
//! an ordered review queue, applies operator decisions through an explicit
//! command interface, and flattens the result back into output rows.
//! No CLI, IO, or HTTP dependencies.

pub mod classify;
pub mod config;
pub mod error;
pub mod export;
pub mod model;
pub mod queue;
pub mod recorder;

pub use classify::Classifier;
pub use config::{ClassifyPolicy, ColumnMap, TriageConfig};
pub use error::EngineError;
pub use export::{export, report, TriageReport, TriageSummary};
pub use model::{DecisionEvent, Record, ReviewStatus, RowSet};
pub use queue::{Discipline, ReviewQueue};
pub use recorder::{Command, Decision, DecisionRecorder, Outcome};
