use thiserror::Error;

/// Rejections raised while validating a submission at the boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SubmissionError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("At least one individual is required")]
    NoIndividuals,

    #[error("Individual {0} is missing a name or ID")]
    IncompleteIndividual(usize),

    #[error("Invalid incident time '{0}', expected HH:MM")]
    InvalidTime(String),
}

/// Problems with the shape of a completion reply
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChecklistError {
    #[error("Checklist marker 'weapon:' not found in reply")]
    MarkerNotFound,

    #[error("Checklist key '{0}' missing from reply")]
    MissingFlag(&'static str),

    #[error("Checklist key '{key}' has malformed value '{value}'")]
    MalformedFlag { key: &'static str, value: String },

    #[error("Reply is not a usable JSON object: {0}")]
    MalformedReply(String),
}

/// Offense catalog loading errors
#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to parse offense catalog: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Offense catalog is empty")]
    Empty,

    #[error("Duplicate offense code: {0}")]
    DuplicateCode(String),

    #[error("Offense entry {0} has a blank code or label")]
    BlankEntry(usize),
}
