use std::fmt;

#[derive(Debug)]
pub enum EngineError {
    /// Raw input not parseable into field maps. Fatal to the import
    /// attempt; no partial queue is created.
    Ingestion(String),
    /// Required column absent from the header.
    MissingColumn { column: String },
    /// Two records would share an id.
    DuplicateId { id: String, row: usize },
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Config validation error (blank column name, etc.).
    ConfigValidation(String),
    /// Decision applied while the queue is already done. Callers recover
    /// this locally as a no-op.
    OutOfRange { cursor: isize, boundary: usize },
    /// A rejection awaits confirmation; queue-mutating commands are blocked
    /// until it is confirmed or cancelled.
    RejectionPending,
    /// Confirmation arrived with no rejection pending.
    NothingPending,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ingestion(msg) => write!(f, "ingestion error: {msg}"),
            Self::MissingColumn { column } => {
                write!(f, "missing required column '{column}'")
            }
            Self::DuplicateId { id, row } => {
                write!(f, "duplicate record id '{id}' at input row {row}")
            }
            Self::ConfigParse(msg) => write!(f, "config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "config validation error: {msg}"),
            Self::OutOfRange { cursor, boundary } => {
                write!(f, "decision out of range: cursor {cursor}, boundary {boundary}")
            }
            Self::RejectionPending => {
                write!(f, "a rejection is pending confirmation")
            }
            Self::NothingPending => {
                write!(f, "no rejection is pending")
            }
        }
    }
}

impl std::error::Error for EngineError {}
