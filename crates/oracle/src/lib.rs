//! Receipt analysis client: advisory verdicts for review cards.
//!
//! Blocking HTTP with a worker thread per request. Verdicts arrive over a
//! channel the review loop polls; errors and stale results are reported or
//! dropped, never fatal.

mod client;

pub use client::{
    spawn_analysis, OracleClient, OracleError, PendingAnalysis, ReceiptAnalysis, ENDPOINT_ENV,
    TOKEN_ENV,
};
