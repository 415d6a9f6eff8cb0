// Interactive review loop.
//
// Cards and prompts go to stderr so the exported table owns stdout. Keys
// arrive on stdin one line at a time, which keeps the loop scriptable: a
// piped file of keystrokes replays a session exactly.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use receiptdeck_engine::{
    export, Classifier, ClassifyPolicy, ColumnMap, Command, Decision, DecisionRecorder,
    Discipline, Outcome, Record, ReviewQueue, ReviewStatus,
};
use receiptdeck_oracle::{
    spawn_analysis, OracleClient, OracleError, PendingAnalysis, ReceiptAnalysis,
};

use crate::config::load_config;
use crate::{load_rows, write_table, CliError, OutFormat};

pub struct ReviewOptions {
    pub input: String,
    pub backward: bool,
    pub output: Option<PathBuf>,
    pub out: OutFormat,
    pub config: Option<PathBuf>,
    pub policy: Option<ClassifyPolicy>,
    pub delimiter: Option<char>,
    pub quiet: bool,
}

pub fn cmd_review(opts: ReviewOptions) -> Result<(), CliError> {
    let config = load_config(opts.config.as_deref(), opts.policy)?;
    let rows = load_rows(&opts.input, opts.delimiter)?;

    let classifier = Classifier::new(config);
    let columns = classifier.config().columns.clone();
    let queue = classifier.classify(&rows).map_err(CliError::engine)?;
    let queue = if opts.backward {
        queue.with_discipline(Discipline::Backward)
    } else {
        queue
    };
    let mut recorder = DecisionRecorder::new(queue);

    let oracle = OracleClient::from_env().ok();
    let mut analysis: Option<PendingAnalysis> = None;

    if !opts.quiet {
        eprintln!(
            "{} receipts to review ({} auto-resolved, {} discarded)",
            recorder.queue().reviewable_count(),
            recorder.queue().auto_resolved_count(),
            recorder.queue().discarded_count(),
        );
        eprintln!("keys: a=approve r=reject u=undo o=analyze s=summary q=quit");
    }

    let stdin = io::stdin();
    let mut keys = stdin.lock().lines();

    loop {
        let current_id = recorder.current().map(|r| r.id.clone());
        if let Some(note) = poll_analysis(&mut analysis, current_id.as_deref()) {
            eprintln!("{note}");
        }
        if recorder.is_done() {
            break;
        }
        let Some(record) = recorder.current() else {
            break;
        };
        print_card(
            record,
            &columns,
            (recorder.queue().cursor() + 1) as usize,
            recorder.queue().reviewable_count(),
        );
        eprint!("> ");
        let _ = io::stderr().flush();

        let line = match keys.next() {
            None => break,
            Some(Err(e)) => {
                eprintln!("stdin: {e}");
                break;
            }
            Some(Ok(line)) => line,
        };

        match line.trim() {
            "a" => match recorder.apply(Command::Decide(Decision::Approve)) {
                Ok(Outcome::Applied(event)) => {
                    if !opts.quiet {
                        eprintln!("approved {}", event.record_id);
                    }
                }
                Ok(_) => {}
                Err(e) => eprintln!("{e}"),
            },
            "r" => match recorder.apply(Command::Decide(Decision::Reject)) {
                Ok(Outcome::AwaitingReason) => {
                    eprint!("reason (:cancel to abort): ");
                    let _ = io::stderr().flush();
                    match keys.next() {
                        None => {
                            // EOF settles the half-open rejection before export
                            if let Err(e) = recorder.apply(Command::CancelRejection) {
                                eprintln!("{e}");
                            }
                            break;
                        }
                        Some(Err(e)) => {
                            eprintln!("stdin: {e}");
                            if let Err(e) = recorder.apply(Command::CancelRejection) {
                                eprintln!("{e}");
                            }
                            break;
                        }
                        Some(Ok(reason)) if reason.trim() == ":cancel" => {
                            if let Err(e) = recorder.apply(Command::CancelRejection) {
                                eprintln!("{e}");
                            } else if !opts.quiet {
                                eprintln!("rejection cancelled");
                            }
                        }
                        Some(Ok(reason)) => {
                            match recorder.apply(Command::ConfirmRejection(reason.trim().to_string()))
                            {
                                Ok(Outcome::Applied(event)) => {
                                    if !opts.quiet {
                                        eprintln!("rejected {}", event.record_id);
                                    }
                                }
                                Ok(_) => {}
                                Err(e) => eprintln!("{e}"),
                            }
                        }
                    }
                }
                Ok(_) => {}
                Err(e) => eprintln!("{e}"),
            },
            "u" => match recorder.apply(Command::UndoLast) {
                Ok(Outcome::Undone(event)) => {
                    if !opts.quiet {
                        eprintln!("undid {} (back to {})", event.record_id, event.prior_status);
                    }
                }
                Ok(Outcome::Ignored) => {
                    if matches!(recorder.queue().discipline(), Discipline::Forward) {
                        eprintln!("undo needs --backward");
                    } else {
                        eprintln!("nothing to undo");
                    }
                }
                Ok(_) => {}
                Err(e) => eprintln!("{e}"),
            },
            "o" => match (&oracle, recorder.current()) {
                (Some(client), Some(record)) => {
                    match record.trimmed_field(&columns.receipt_url) {
                        Some(url) => {
                            analysis = Some(spawn_analysis(
                                client.clone(),
                                record.id.clone(),
                                url.to_string(),
                            ));
                            if !opts.quiet {
                                eprintln!("analysis requested for {}", record.id);
                            }
                        }
                        None => eprintln!("no receipt URL on this card"),
                    }
                }
                (None, _) => eprintln!("{}", OracleError::Disabled),
                (_, None) => {}
            },
            "s" => eprintln!("{}", progress_line(recorder.queue())),
            "q" => break,
            "" => continue,
            other => eprintln!("unknown key {other:?} (a, r, u, o, s, q)"),
        }
    }

    let table = export(recorder.queue());
    write_table(&table, opts.output.as_deref(), opts.out)?;
    if !opts.quiet {
        eprintln!("{}", progress_line(recorder.queue()));
    }
    Ok(())
}

fn print_card(record: &Record, columns: &ColumnMap, position: usize, total: usize) {
    eprintln!("── card {position}/{total} ─────────────────────────────");
    eprintln!("name:     {}", record.field(&columns.name).unwrap_or(""));
    eprintln!("email:    {}", record.field(&columns.email).unwrap_or(""));
    eprintln!("project:  {}", record.field(&columns.project).unwrap_or(""));
    match record.trimmed_field(&columns.receipt_url) {
        Some(url) => eprintln!("receipt:  {url}"),
        None => eprintln!("receipt:  URL missing"),
    }
    eprintln!("id:       {}", record.id);
    if record.status != ReviewStatus::Pending {
        match &record.reason {
            Some(reason) => eprintln!("status:   {} ({reason})", record.status),
            None => eprintln!("status:   {}", record.status),
        }
    }
}

/// Progress over the reviewable block only. Auto-resolved rejections past
/// the boundary are not operator work and stay out of these counts.
fn progress_line(queue: &ReviewQueue) -> String {
    let reviewable = &queue.records()[..queue.reviewable_count()];
    let approved = reviewable
        .iter()
        .filter(|r| r.status == ReviewStatus::Approved)
        .count();
    let rejected = reviewable
        .iter()
        .filter(|r| r.status == ReviewStatus::Rejected)
        .count();
    let pending = reviewable
        .iter()
        .filter(|r| r.status == ReviewStatus::Pending)
        .count();
    format!(
        "reviewed {}/{}, approved {approved}, rejected {rejected}, pending {pending}",
        queue.reviewed_count(),
        queue.reviewable_count(),
    )
}

/// Collect a finished analysis, if any. A verdict that lands after the
/// cursor has moved to a different record is dropped unseen; only a result
/// still tagged with the current record's id produces a note.
fn poll_analysis(
    pending: &mut Option<PendingAnalysis>,
    current_id: Option<&str>,
) -> Option<String> {
    let slot = pending.take()?;
    match slot.try_take() {
        None => {
            *pending = Some(slot);
            None
        }
        Some(result) => {
            if current_id != Some(slot.record_id()) {
                return None;
            }
            Some(match result {
                Ok(verdict) => verdict_note(&verdict),
                Err(e) => format!("analysis failed: {e}"),
            })
        }
    }
}

fn verdict_note(verdict: &ReceiptAnalysis) -> String {
    let summary = if verdict.is_valid {
        "receipt looks valid"
    } else {
        "receipt looks invalid"
    };
    match &verdict.reason {
        Some(reason) => format!("analysis: {summary} ({reason})"),
        None => format!("analysis: {summary}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use receiptdeck_engine::{RowSet, TriageConfig};
    use std::time::Duration;

    fn queue_of(n: usize) -> ReviewQueue {
        let mut rows = Vec::new();
        for i in 0..n {
            rows.push(
                [
                    ("name".to_string(), format!("Person {i}")),
                    ("email".to_string(), format!("p{i}@example.com")),
                    ("receiptUrl".to_string(), format!("https://r.example/{i}.pdf")),
                    (
                        "requests travel (travel form)".to_string(),
                        "yes".to_string(),
                    ),
                    ("project".to_string(), "Atlas".to_string()),
                ]
                .into_iter()
                .collect(),
            );
        }
        let rows = RowSet {
            columns: vec![
                "name".to_string(),
                "email".to_string(),
                "receiptUrl".to_string(),
                "requests travel (travel form)".to_string(),
                "project".to_string(),
            ],
            rows,
        };
        Classifier::new(TriageConfig::default())
            .classify(&rows)
            .unwrap()
    }

    fn analysis_server(body: serde_json::Value) -> MockServer {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/analyze");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(body);
        });
        server
    }

    // Polls until the worker thread has delivered, without hanging forever.
    fn settle(pending: &mut Option<PendingAnalysis>, current: Option<&str>) -> Option<String> {
        for _ in 0..200 {
            match poll_analysis(pending, current) {
                Some(note) => return Some(note),
                None if pending.is_none() => return None,
                None => std::thread::sleep(Duration::from_millis(5)),
            }
        }
        panic!("analysis never settled");
    }

    #[test]
    fn verdict_for_the_current_record_becomes_a_note() {
        let server = analysis_server(serde_json::json!({
            "isValid": false,
            "reason": "no proof of payment"
        }));
        let client = OracleClient::new(format!("{}/analyze", server.base_url()), None);

        let mut pending = Some(spawn_analysis(
            client,
            "receipt-0".to_string(),
            "https://r.example/0.pdf".to_string(),
        ));
        let note = settle(&mut pending, Some("receipt-0")).unwrap();
        assert_eq!(note, "analysis: receipt looks invalid (no proof of payment)");
        assert!(pending.is_none());
    }

    #[test]
    fn verdict_for_a_departed_record_is_dropped() {
        let server = analysis_server(serde_json::json!({ "isValid": true }));
        let client = OracleClient::new(format!("{}/analyze", server.base_url()), None);

        let mut pending = Some(spawn_analysis(
            client,
            "receipt-0".to_string(),
            "https://r.example/0.pdf".to_string(),
        ));
        // The operator has moved on to a different card.
        let note = settle(&mut pending, Some("receipt-7"));
        assert_eq!(note, None);
        assert!(pending.is_none(), "a stale verdict must not linger");
    }

    #[test]
    fn poll_without_a_request_is_silent() {
        let mut pending = None;
        assert_eq!(poll_analysis(&mut pending, Some("receipt-0")), None);
    }

    #[test]
    fn failed_analysis_reports_without_touching_the_queue() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/analyze");
            then.status(503).body("upstream busy");
        });
        let client = OracleClient::new(format!("{}/analyze", server.base_url()), None);

        let mut pending = Some(spawn_analysis(
            client,
            "receipt-0".to_string(),
            "https://r.example/0.pdf".to_string(),
        ));
        let note = settle(&mut pending, Some("receipt-0")).unwrap();
        assert!(note.starts_with("analysis failed:"), "got: {note}");
    }

    #[test]
    fn progress_line_counts_only_the_reviewable_block() {
        let mut queue = queue_of(3);
        queue
            .apply_decision(ReviewStatus::Approved, None)
            .unwrap();
        queue
            .apply_decision(ReviewStatus::Rejected, Some("blurry scan".to_string()))
            .unwrap();
        assert_eq!(
            progress_line(&queue),
            "reviewed 2/3, approved 1, rejected 1, pending 1"
        );
    }
}
