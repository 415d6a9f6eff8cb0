//! Config discovery.
//!
//! Precedence: `--config <path>`, then the user config file
//! (`~/.config/receiptdeck/config.toml`), then built-in defaults. A file
//! that exists but fails to parse is an error, never a silent fallback.

use std::path::{Path, PathBuf};

use receiptdeck_engine::{ClassifyPolicy, TriageConfig};

use crate::exit_codes::EXIT_CONFIG;
use crate::CliError;

/// Returns the path of the user config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|c| c.join("receiptdeck/config.toml"))
}

/// Resolve the effective config, applying a `--policy` override last.
pub fn load_config(
    explicit: Option<&Path>,
    policy_override: Option<ClassifyPolicy>,
) -> Result<TriageConfig, CliError> {
    let mut config = match explicit {
        Some(path) => load_file(path)?,
        None => match default_config_path().filter(|p| p.exists()) {
            Some(path) => load_file(&path)?,
            None => TriageConfig::default(),
        },
    };
    if let Some(policy) = policy_override {
        config.policy = policy;
    }
    Ok(config)
}

fn load_file(path: &Path) -> Result<TriageConfig, CliError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: format!("cannot read config {}: {}", path.display(), e),
        hint: None,
    })?;
    TriageConfig::from_toml(&contents).map_err(|e| CliError {
        code: EXIT_CONFIG,
        message: e.to_string(),
        hint: Some(format!("in {}", path.display())),
    })
}
