use std::path::PathBuf;

use thiserror::Error;

use crate::form::FieldKind;

#[derive(Error, Debug)]
pub enum PdfFormError {
    #[error("Template not found: {}", .0.display())]
    TemplateMissing(PathBuf),

    #[error("Failed to read template: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse PDF: {0}")]
    ParseError(String),

    #[error("Template has no interactive form")]
    NoAcroForm,

    #[error("Field not found in template: {0}")]
    FieldNotFound(String),

    #[error("Field '{name}' is not a {expected} field (found {found})")]
    WrongFieldKind {
        name: String,
        expected: FieldKind,
        found: FieldKind,
    },

    #[error("{given} individuals exceed the {slots} slots on the form")]
    TooManyIndividuals { given: usize, slots: usize },

    #[error("Invalid form layout: {0}")]
    InvalidLayout(String),

    #[error("PDF operation failed: {0}")]
    OperationError(String),
}

impl From<lopdf::Error> for PdfFormError {
    fn from(err: lopdf::Error) -> Self {
        PdfFormError::OperationError(err.to_string())
    }
}
