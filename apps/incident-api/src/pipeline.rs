//! Report and ticket generation
//!
//! Each stage runs in order and the first failure aborts the request:
//! validate, check form capacity, prompt, complete, parse, fill, persist.

use std::path::Path;

use anyhow::Context;
use chrono::NaiveDate;
use incident_core::{
    offenses::{build_ticket, offense_lines, unrecognized_lines},
    parse_reply, ChecklistFlags, Submission,
};
use incident_pdf::ReportContent;
use tracing::{info, warn};
use uuid::Uuid;

use crate::completion::CompletionRequest;
use crate::error::ApiError;
use crate::state::AppState;

/// A generated report in both its forms
#[derive(Debug, Clone)]
pub struct ReportOutcome {
    pub narrative: String,
    pub flags: ChecklistFlags,
    pub pdf: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct TicketOutcome {
    pub ticket: String,
    pub offenses: Vec<String>,
}

pub async fn generate_report(
    state: &AppState,
    submission: Submission,
    date: NaiveDate,
) -> Result<ReportOutcome, ApiError> {
    let submission = submission.validate()?;
    state.populator.check_capacity(&submission)?;

    let reply_format = state.prompts.reply_format;
    let prompt = state.prompts.report(&submission, date);
    info!(
        individuals = submission.individuals().len(),
        format = ?reply_format,
        "Requesting report narrative"
    );
    let reply = state
        .completion
        .complete(CompletionRequest::new(prompt, reply_format.wants_json()))
        .await?;

    let parsed = parse_reply(reply_format, &reply)?;
    if !parsed.checklist_present {
        warn!(
            reply_chars = reply.chars().count(),
            "Reply has no checklist block; using the whole reply as narrative with every flag unset"
        );
    }
    info!(
        flags_set = parsed.flags.count(),
        narrative_chars = parsed.narrative.chars().count(),
        "Parsed completion reply"
    );

    // Parsing and re-serializing the template is CPU work; keep it off the reactor
    let populator = state.populator.clone();
    let flags = parsed.flags;
    let narrative = parsed.narrative.clone();
    let pdf = tokio::task::spawn_blocking(move || {
        populator.populate(&ReportContent {
            submission: &submission,
            date,
            flags,
            narrative: &narrative,
        })
    })
    .await
    .context("form filling task failed")??;

    if let Some(path) = &state.artifact_path {
        persist_artifact(path, &pdf).await?;
        info!(path = %path.display(), bytes = pdf.len(), "Saved filled report");
    }

    Ok(ReportOutcome {
        narrative: parsed.narrative,
        flags: parsed.flags,
        pdf,
    })
}

pub async fn generate_ticket(
    state: &AppState,
    submission: Submission,
    date: NaiveDate,
) -> Result<TicketOutcome, ApiError> {
    let submission = submission.validate()?;

    let prompt = state.prompts.ticket(&submission, &state.catalog);
    info!(catalog = state.catalog.len(), "Requesting offense matches");
    let reply = state
        .completion
        .complete(CompletionRequest::new(prompt, false))
        .await?;

    let offenses = offense_lines(&reply);
    let unknown = unrecognized_lines(&state.catalog, &offenses);
    if !unknown.is_empty() {
        warn!(
            count = unknown.len(),
            total = offenses.len(),
            "Offense reply has lines citing no catalog code"
        );
    }

    let ticket = build_ticket(&submission, date, &offenses);
    info!(offenses = offenses.len(), "Generated ticket");
    Ok(TicketOutcome { ticket, offenses })
}

/// Write through a uniquely named temporary file, then rename over the target
pub async fn persist_artifact(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    let file_name = path
        .file_name()
        .with_context(|| format!("artifact path {} has no file name", path.display()))?
        .to_string_lossy();
    let tmp = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    tokio::fs::write(&tmp, bytes)
        .await
        .with_context(|| format!("failed to write {}", tmp.display()))?;
    if let Err(e) = tokio::fs::rename(&tmp, path).await {
        tokio::fs::remove_file(&tmp).await.ok();
        return Err(e).with_context(|| format!("failed to move report into {}", path.display()));
    }
    Ok(())
}
