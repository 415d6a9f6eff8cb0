use serde::{Deserialize, Serialize};

use crate::error::EngineError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Triage configuration: which columns drive classification and what to do
/// with eligible rows that carry no project submission.
///
/// Every field has a default, so an absent or empty config file yields the
/// stock travel-form behavior.
#[derive(Debug, Clone, Deserialize)]
pub struct TriageConfig {
    #[serde(default)]
    pub policy: ClassifyPolicy,
    #[serde(default)]
    pub columns: ColumnMap,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            policy: ClassifyPolicy::default(),
            columns: ColumnMap::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// What the classifier does with eligible rows whose project field is
/// absent, blank, or "no submission".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassifyPolicy {
    /// Keep them as auto-rejected records past the reviewable boundary.
    /// The default: auto-resolve, do not discard, so they stay auditable
    /// in the export.
    AutoResolve,
    /// Drop them from the queue entirely, like ineligible rows.
    Discard,
}

impl Default for ClassifyPolicy {
    fn default() -> Self {
        Self::AutoResolve
    }
}

impl ClassifyPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AutoResolve => "auto_resolve",
            Self::Discard => "discard",
        }
    }
}

impl std::fmt::Display for ClassifyPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Column mapping
// ---------------------------------------------------------------------------

/// Names of the columns the engine interprets. Defaults match the
/// travel-form export. Columns not named here pass through untouched.
///
/// `name`, `email`, `travel_request`, and `receipt_url` are required in the
/// imported header; `project` and `id` are optional per row.
#[derive(Debug, Clone, Deserialize)]
pub struct ColumnMap {
    #[serde(default = "default_name")]
    pub name: String,
    #[serde(default = "default_email")]
    pub email: String,
    #[serde(default = "default_travel_request")]
    pub travel_request: String,
    #[serde(default = "default_receipt_url")]
    pub receipt_url: String,
    #[serde(default = "default_project")]
    pub project: String,
    #[serde(default = "default_id")]
    pub id: String,
}

fn default_name() -> String {
    "name".to_string()
}

fn default_email() -> String {
    "email".to_string()
}

fn default_travel_request() -> String {
    "requests travel (travel form)".to_string()
}

fn default_receipt_url() -> String {
    "receiptUrl".to_string()
}

fn default_project() -> String {
    "project".to_string()
}

fn default_id() -> String {
    "id".to_string()
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            name: default_name(),
            email: default_email(),
            travel_request: default_travel_request(),
            receipt_url: default_receipt_url(),
            project: default_project(),
            id: default_id(),
        }
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl TriageConfig {
    pub fn from_toml(input: &str) -> Result<Self, EngineError> {
        let config: TriageConfig =
            toml::from_str(input).map_err(|e| EngineError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let named = [
            ("name", &self.columns.name),
            ("email", &self.columns.email),
            ("travel_request", &self.columns.travel_request),
            ("receipt_url", &self.columns.receipt_url),
            ("project", &self.columns.project),
            ("id", &self.columns.id),
        ];
        for (name, value) in named {
            if value.trim().is_empty() {
                return Err(EngineError::ConfigValidation(format!(
                    "column '{name}' must not be blank"
                )));
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
policy = "discard"

[columns]
travel_request = "travel?"
receipt_url = "receipt"
project = "project code"
id = "ref"
"#;

    #[test]
    fn empty_input_yields_defaults() {
        let config = TriageConfig::from_toml("").unwrap();
        assert_eq!(config.policy, ClassifyPolicy::AutoResolve);
        assert_eq!(config.columns.name, "name");
        assert_eq!(config.columns.email, "email");
        assert_eq!(config.columns.travel_request, "requests travel (travel form)");
        assert_eq!(config.columns.receipt_url, "receiptUrl");
        assert_eq!(config.columns.project, "project");
        assert_eq!(config.columns.id, "id");
    }

    #[test]
    fn default_policy_is_auto_resolve() {
        // Auto-resolve, do not discard: unsubmitted projects stay in the
        // queue as auto-rejected records so the export remains auditable.
        assert_eq!(ClassifyPolicy::default(), ClassifyPolicy::AutoResolve);
        assert_eq!(TriageConfig::default().policy, ClassifyPolicy::AutoResolve);
    }

    #[test]
    fn parse_full_config() {
        let config = TriageConfig::from_toml(FULL).unwrap();
        assert_eq!(config.policy, ClassifyPolicy::Discard);
        assert_eq!(config.columns.travel_request, "travel?");
        assert_eq!(config.columns.receipt_url, "receipt");
        assert_eq!(config.columns.project, "project code");
        assert_eq!(config.columns.id, "ref");
    }

    #[test]
    fn reject_unknown_policy() {
        let err = TriageConfig::from_toml(r#"policy = "keep""#).unwrap_err();
        assert!(err.to_string().contains("config parse error"));
    }

    #[test]
    fn reject_blank_column() {
        let input = r#"
[columns]
receipt_url = "  "
"#;
        let err = TriageConfig::from_toml(input).unwrap_err();
        assert!(err.to_string().contains("'receipt_url'"));
    }

    #[test]
    fn policy_string_forms() {
        assert_eq!(ClassifyPolicy::AutoResolve.to_string(), "auto_resolve");
        assert_eq!(ClassifyPolicy::Discard.to_string(), "discard");
    }
}
