//! Decision recording: the explicit command interface over a review queue.
//!
//! All operator session state lives in one `DecisionRecorder` (queue,
//! pending rejection, last action) and every transition goes through
//! `apply`. Commands address the current record, or a stable index for
//! restore; there are no per-card handles to keep in sync.

use crate::error::EngineError;
use crate::model::{DecisionEvent, Record, ReviewStatus};
use crate::queue::{Discipline, ReviewQueue};

/// Operator decision direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Decide(Decision),
    /// Second step of a rejection: supply the reason (empty permitted).
    ConfirmRejection(String),
    /// Abandon the pending rejection; the queue stays untouched.
    CancelRejection,
    /// Re-present the record at a backing index without changing status.
    Restore(usize),
    /// Revert the most recent decision, if none has followed it.
    UndoLast,
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A decision was applied and the cursor moved.
    Applied(DecisionEvent),
    /// A rejection is pending; confirm or cancel before anything else.
    AwaitingReason,
    /// The pending rejection was discarded.
    RejectionCancelled,
    /// The record at this index is presented again, status unchanged.
    Restored(usize),
    /// The most recent decision was reverted.
    Undone(DecisionEvent),
    /// The command had no effect.
    Ignored,
}

/// Wraps a queue with the two-step rejection protocol and the last-action
/// display.
#[derive(Debug, Clone)]
pub struct DecisionRecorder {
    queue: ReviewQueue,
    pending_rejection: bool,
    last_action: Option<DecisionEvent>,
}

impl DecisionRecorder {
    pub fn new(queue: ReviewQueue) -> Self {
        Self {
            queue,
            pending_rejection: false,
            last_action: None,
        }
    }

    pub fn queue(&self) -> &ReviewQueue {
        &self.queue
    }

    pub fn into_queue(self) -> ReviewQueue {
        self.queue
    }

    pub fn current(&self) -> Option<&Record> {
        self.queue.current()
    }

    pub fn is_done(&self) -> bool {
        self.queue.is_done()
    }

    pub fn last_action(&self) -> Option<&DecisionEvent> {
        self.last_action.as_ref()
    }

    pub fn rejection_pending(&self) -> bool {
        self.pending_rejection
    }

    /// The single transition function: one command in, one outcome out.
    ///
    /// Errors (`OutOfRange`, `RejectionPending`, `NothingPending`) are
    /// locally recoverable protocol signals; callers report and carry on.
    /// Nothing here panics or aborts a session.
    pub fn apply(&mut self, command: Command) -> Result<Outcome, EngineError> {
        match command {
            Command::Decide(Decision::Approve) => {
                self.ensure_no_pending()?;
                let event = self.queue.apply_decision(ReviewStatus::Approved, None)?;
                self.last_action = Some(event.clone());
                Ok(Outcome::Applied(event))
            }
            Command::Decide(Decision::Reject) => {
                self.ensure_no_pending()?;
                if self.queue.is_done() {
                    return Err(EngineError::OutOfRange {
                        cursor: self.queue.cursor(),
                        boundary: self.queue.reviewable_count(),
                    });
                }
                self.pending_rejection = true;
                Ok(Outcome::AwaitingReason)
            }
            Command::ConfirmRejection(reason) => {
                if !self.pending_rejection {
                    return Err(EngineError::NothingPending);
                }
                let event = self
                    .queue
                    .apply_decision(ReviewStatus::Rejected, Some(reason))?;
                self.pending_rejection = false;
                self.last_action = Some(event.clone());
                Ok(Outcome::Applied(event))
            }
            Command::CancelRejection => {
                if self.pending_rejection {
                    self.pending_rejection = false;
                    Ok(Outcome::RejectionCancelled)
                } else {
                    Ok(Outcome::Ignored)
                }
            }
            Command::Restore(index) => {
                self.ensure_no_pending()?;
                if self.queue.restore(index) {
                    Ok(Outcome::Restored(index))
                } else {
                    Ok(Outcome::Ignored)
                }
            }
            Command::UndoLast => {
                self.ensure_no_pending()?;
                self.undo_last()
            }
        }
    }

    fn ensure_no_pending(&self) -> Result<(), EngineError> {
        if self.pending_rejection {
            Err(EngineError::RejectionPending)
        } else {
            Ok(())
        }
    }

    /// Undo reaches exactly one decision deep: once another decision
    /// commits, the previous event is gone.
    fn undo_last(&mut self) -> Result<Outcome, EngineError> {
        if self.queue.discipline() != Discipline::Backward {
            return Ok(Outcome::Ignored);
        }
        let Some(event) = self.last_action.clone() else {
            return Ok(Outcome::Ignored);
        };
        if !self.queue.restore(event.index) {
            return Ok(Outcome::Ignored);
        }
        if let Some(record) = self.queue.record_mut(event.index) {
            record.status = event.prior_status;
            record.reason = event.prior_reason.clone();
        }
        self.last_action = None;
        Ok(Outcome::Undone(event))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
