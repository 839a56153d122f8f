//! HTTP handlers for the incident API

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{
        header::{ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE},
        HeaderMap,
    },
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Local, NaiveDate};
use incident_core::{ChecklistFlags, Submission};
use serde::Serialize;
use serde_json::{json, Value};

use crate::error::ApiError;
use crate::pipeline;
use crate::state::AppState;

pub const REPORT_FILENAME: &str = "434_Incident_Report.pdf";

#[derive(Serialize)]
pub struct ReportJson {
    pub report: String,
    pub checklist: ChecklistFlags,
}

#[derive(Serialize)]
pub struct TicketJson {
    pub ticket: String,
    pub offenses: Vec<String>,
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// JSON only when the client asks for it and does not also accept PDF
fn wants_json(headers: &HeaderMap) -> bool {
    let accept = headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .collect::<Vec<_>>()
        .join(",");
    accept.contains("application/json") && !accept.contains("application/pdf")
}

/// Health check endpoint
pub async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "incident-api",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Generate the incident report as a filled PDF (or its JSON parts)
pub async fn generate_report(
    State(state): State<AppState>,
    headers: HeaderMap,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Response, ApiError> {
    let Json(submission) = payload?;
    tracing::info!("Received request for /generate-report");

    let outcome = pipeline::generate_report(&state, submission, today()).await?;

    if wants_json(&headers) {
        return Ok(Json(ReportJson {
            report: outcome.narrative,
            checklist: outcome.flags,
        })
        .into_response());
    }

    Ok((
        [
            (CONTENT_TYPE, "application/pdf".to_string()),
            (
                CONTENT_DISPOSITION,
                format!("inline; filename=\"{}\"", REPORT_FILENAME),
            ),
        ],
        outcome.pdf,
    )
        .into_response())
}

/// Generate a disciplinary ticket with matched offenses
pub async fn generate_ticket(
    State(state): State<AppState>,
    payload: Result<Json<Submission>, JsonRejection>,
) -> Result<Json<TicketJson>, ApiError> {
    let Json(submission) = payload?;
    tracing::info!("Received request for /generate-ticket");

    let outcome = pipeline::generate_ticket(&state, submission, today()).await?;
    Ok(Json(TicketJson {
        ticket: outcome.ticket,
        offenses: outcome.offenses,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn accept(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_content_negotiation() {
        assert!(!wants_json(&HeaderMap::new()));
        assert!(wants_json(&accept("application/json")));
        assert!(!wants_json(&accept("application/pdf")));
        assert!(!wants_json(&accept("application/pdf, application/json;q=0.5")));
        assert!(!wants_json(&accept("*/*")));
    }
}
