//! Receipt analysis HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). One call per
//! receipt: POST the receipt URL, get an advisory verdict back.

use std::sync::mpsc;
use std::thread;
use std::time::Duration;

/// Environment variable holding the analysis endpoint. Unset means the
/// oracle is disabled and review proceeds without verdicts.
pub const ENDPOINT_ENV: &str = "RDECK_ORACLE_URL";

/// Optional bearer token for the analysis endpoint.
pub const TOKEN_ENV: &str = "RDECK_ORACLE_TOKEN";

/// Receipt analysis client (blocking).
#[derive(Debug, Clone)]
pub struct OracleClient {
    http: reqwest::blocking::Client,
    endpoint: String,
    token: Option<String>,
}

/// Error type for analysis calls.
///
/// Every variant is advisory: the caller reports it next to the card and
/// the review continues. Nothing here may fail an import or a decision.
#[derive(Debug)]
pub enum OracleError {
    /// No endpoint configured
    Disabled,
    /// Network error (includes request timeouts)
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// Response body did not parse as a verdict
    Parse(String),
}

impl std::fmt::Display for OracleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OracleError::Disabled => {
                write!(f, "receipt analysis disabled (set {ENDPOINT_ENV} to enable)")
            }
            OracleError::Network(msg) => write!(f, "network error: {}", msg),
            OracleError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            OracleError::Parse(msg) => write!(f, "parse error: {}", msg),
        }
    }
}

impl std::error::Error for OracleError {}

/// Verdict returned by the analysis service.
///
/// A receipt passes when it shows proof of payment with the amount, the
/// travel dates, a destination, the traveler's legal name, and an economy
/// fare. The verdict is shown alongside the card and never decides for the
/// operator.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptAnalysis {
    pub is_valid: bool,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub vendor: Option<String>,
    #[serde(default)]
    pub total_amount: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
}

impl OracleClient {
    /// Build from the environment. `RDECK_ORACLE_URL` enables the oracle;
    /// `RDECK_ORACLE_TOKEN` optionally adds a bearer token.
    pub fn from_env() -> Result<Self, OracleError> {
        let endpoint = std::env::var(ENDPOINT_ENV)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(OracleError::Disabled)?;
        let token = std::env::var(TOKEN_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty());
        Ok(Self::new(endpoint, token))
    }

    /// Create a client against an explicit endpoint.
    pub fn new(endpoint: String, token: Option<String>) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("rdeck/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, endpoint, token }
    }

    /// Ask the service for a verdict on one receipt URL.
    pub fn analyze(&self, receipt_url: &str) -> Result<ReceiptAnalysis, OracleError> {
        let body = serde_json::json!({ "imageUrl": receipt_url });

        let mut req = self.http.post(&self.endpoint).json(&body);
        if let Some(ref token) = self.token {
            req = req.bearer_auth(token);
        }
        let response = req
            .send()
            .map_err(|e| OracleError::Network(e.to_string()))?;

        let status = response.status().as_u16();
        if !response.status().is_success() {
            let body = response.text().unwrap_or_default();
            return Err(OracleError::Http(status, body));
        }

        response
            .json::<ReceiptAnalysis>()
            .map_err(|e| OracleError::Parse(e.to_string()))
    }
}

// ── Fire-and-forget requests ────────────────────────────────────────

/// An in-flight analysis, tagged with the record it belongs to.
///
/// The worker thread owns the HTTP call; the review loop polls `try_take`
/// between keystrokes and must drop any verdict whose `record_id` no longer
/// matches the card on screen.
pub struct PendingAnalysis {
    record_id: String,
    rx: mpsc::Receiver<Result<ReceiptAnalysis, OracleError>>,
}

impl PendingAnalysis {
    pub fn record_id(&self) -> &str {
        &self.record_id
    }

    /// Non-blocking poll. Yields the verdict at most once.
    pub fn try_take(&self) -> Option<Result<ReceiptAnalysis, OracleError>> {
        self.rx.try_recv().ok()
    }

    /// Block until the worker answers. Returns None if the worker died.
    pub fn wait(&self) -> Option<Result<ReceiptAnalysis, OracleError>> {
        self.rx.recv().ok()
    }
}

/// Start an analysis on a worker thread and return immediately.
///
/// If the receiver is gone by the time the verdict arrives (operator moved
/// on or quit), the send fails and the result evaporates. That is the
/// intended discard path, not an error.
pub fn spawn_analysis(
    client: OracleClient,
    record_id: String,
    receipt_url: String,
) -> PendingAnalysis {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let _ = tx.send(client.analyze(&receipt_url));
    });
    PendingAnalysis { record_id, rx }
}

// ── Tests ───────────────────────────────────────────────────────────
