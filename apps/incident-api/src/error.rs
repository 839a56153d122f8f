//! Error types for the incident API

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use incident_core::{ChecklistError, SubmissionError};
use incident_pdf::PdfFormError;
use serde_json::json;
use thiserror::Error;

use crate::completion::CompletionError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Completion service error: {0}")]
    Completion(#[from] CompletionError),

    #[error("Unusable completion reply: {0}")]
    Reply(#[from] ChecklistError),

    #[error("Report form error: {0}")]
    Form(PdfFormError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<SubmissionError> for ApiError {
    fn from(err: SubmissionError) -> Self {
        ApiError::InvalidRequest(err.to_string())
    }
}

impl From<PdfFormError> for ApiError {
    fn from(err: PdfFormError) -> Self {
        match err {
            PdfFormError::TooManyIndividuals { .. } => ApiError::InvalidRequest(err.to_string()),
            other => ApiError::Form(other),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::InvalidRequest(msg) => {
                tracing::info!("Rejected request: {}", msg);
                (StatusCode::BAD_REQUEST, msg.clone())
            }
            ApiError::Completion(e) => {
                tracing::error!("Completion service error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to reach the completion service. Check API key, quota, or server logs."
                        .to_string(),
                )
            }
            ApiError::Reply(e) => {
                tracing::error!("Unusable completion reply: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "The completion service returned an unusable reply".to_string(),
                )
            }
            ApiError::Form(e) => {
                tracing::error!("Report form error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to fill the report form".to_string(),
                )
            }
            ApiError::Internal(e) => {
                tracing::error!("Internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message,
            "status": status.as_u16(),
        }));

        (status, body).into_response()
    }
}
