// Non-interactive classification: the full pipeline minus the walk.

use std::path::PathBuf;

use receiptdeck_engine::{export, Classifier, ClassifyPolicy};

use crate::config::load_config;
use crate::{load_rows, write_table, CliError, OutFormat};

#[allow(clippy::too_many_arguments)]
pub fn cmd_classify(
    input: String,
    output: Option<PathBuf>,
    out: OutFormat,
    config: Option<PathBuf>,
    policy: Option<ClassifyPolicy>,
    delimiter: Option<char>,
    quiet: bool,
) -> Result<(), CliError> {
    let config = load_config(config.as_deref(), policy)?;
    let rows = load_rows(&input, delimiter)?;
    let queue = Classifier::new(config)
        .classify(&rows)
        .map_err(CliError::engine)?;

    let table = export(&queue);
    write_table(&table, output.as_deref(), out)?;

    if !quiet {
        eprintln!(
            "classified {} rows: {} reviewable, {} auto-resolved, {} discarded",
            queue.total_count() + queue.discarded_count(),
            queue.reviewable_count(),
            queue.auto_resolved_count(),
            queue.discarded_count(),
        );
    }
    Ok(())
}
