//! Batch command handler.

use scriptorium::{
    BatchRequest, BatchStatus, CancelTarget, EventSubject, ProcessingMode, ProgressEvent,
    Scriptorium, ScriptoriumConfig, Transition, require_providers,
};
use std::path::Path;
use tracing::{info, warn};

/// Read a batch file.
///
/// ```toml
/// mode = "adaptive"
/// max_concurrent = 3
///
/// [[requests]]
/// content_type = "guide"
/// topic = "Dividing hostas"
/// ```
pub fn read_batch(path: &Path) -> Result<BatchRequest, Box<dyn std::error::Error>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
    let batch: BatchRequest = toml::from_str(&content)
        .map_err(|e| format!("Failed to parse {}: {}", path.display(), e))?;
    if let Some(position) = batch
        .requests
        .iter()
        .position(|request| request.topic().trim().is_empty())
    {
        return Err(format!("request {} in {} has a blank topic", position + 1, path.display()).into());
    }
    Ok(batch)
}

fn report(event: &ProgressEvent) {
    match (&event.subject, &event.transition) {
        (EventSubject::Batch(_), Transition::BatchUpdated { terminal, total }) => {
            println!("[{}/{}] jobs finished", terminal, total);
        }
        (EventSubject::Job { job, .. }, transition) => match &event.detail {
            Some(detail) => println!("job {} {}: {}", job, transition, detail),
            None => println!("job {} {}", job, transition),
        },
        _ => {}
    }
}

/// Run a batch, streaming progress to stdout and printing the final view as JSON.
///
/// Ctrl-C cancels the batch; running jobs finish their current provider call.
pub async fn run_batch(
    config: &ScriptoriumConfig,
    file: &Path,
    mode: Option<ProcessingMode>,
    max_concurrent: Option<usize>,
    fail_fast: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    require_providers(config)?;
    let mut batch = read_batch(file)?;
    if let Some(mode) = mode {
        batch = batch.with_mode(mode);
    }
    if let Some(limit) = max_concurrent {
        batch = batch.with_max_concurrent(limit);
    }
    if fail_fast {
        batch = batch.with_fail_fast(true);
    }

    let scriptorium = Scriptorium::from_config(config)?;
    let scheduler = scriptorium.scheduler();

    let mut progress = scheduler.subscribe();
    let id = scheduler.submit_batch(batch)?;
    info!(batch = %id, "Batch submitted");

    let wait = scheduler.wait_for_batch(id);
    tokio::pin!(wait);
    let mut interrupted = false;
    let view = loop {
        tokio::select! {
            view = &mut wait => break view?,
            Some(event) = progress.recv() => {
                if event.batch_id() == Some(id) {
                    report(&event);
                }
            }
            _ = tokio::signal::ctrl_c(), if !interrupted => {
                interrupted = true;
                let ack = scheduler.cancel(CancelTarget::Batch(id))?;
                warn!(
                    cancelled = ack.cancelled.len(),
                    signalled = ack.signalled.len(),
                    "Interrupted, cancelling batch"
                );
            }
        }
    };

    while let Some(event) = progress.try_recv() {
        if event.batch_id() == Some(id) {
            report(&event);
        }
    }

    println!("{}", serde_json::to_string_pretty(&view)?);
    info!(
        status = %view.status,
        completed = view.counts.completed,
        failed = view.counts.failed,
        cancelled = view.counts.cancelled,
        "Batch finished"
    );

    if view.status == BatchStatus::Failed {
        return Err("batch failed".into());
    }
    Ok(())
}
