// Queue preview: counts and per-record statuses without a review pass.

use std::path::PathBuf;

use receiptdeck_engine::{report, Classifier, ClassifyPolicy};

use crate::config::load_config;
use crate::{load_rows, CliError};

pub fn cmd_inspect(
    input: String,
    config: Option<PathBuf>,
    policy: Option<ClassifyPolicy>,
    delimiter: Option<char>,
    json: bool,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref(), policy)?;
    let rows = load_rows(&input, delimiter)?;
    let classifier = Classifier::new(config);
    let policy = classifier.policy();
    let queue = classifier.classify(&rows).map_err(CliError::engine)?;
    let report = report(&queue, policy);

    if json {
        let body = serde_json::to_string_pretty(&report)
            .map_err(|e| CliError::export(format!("cannot encode report: {e}")))?;
        println!("{body}");
        return Ok(());
    }

    let s = &report.summary;
    println!("input rows:     {}", s.input_rows);
    println!("records:        {}", s.records);
    println!("reviewable:     {}", s.reviewable);
    println!("auto-resolved:  {}", s.auto_resolved);
    println!("discarded:      {}", s.discarded);
    println!("pending:        {}", s.pending);
    println!("approved:       {}", s.approved);
    println!("rejected:       {}", s.rejected);
    Ok(())
}
