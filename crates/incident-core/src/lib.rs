//! Incident report core
//!
//! Everything between the officer's form submission and the PDF writer:
//! - `submission`: the submitted record and its one-time validation
//! - `datetime`: report date and 12-hour time formatting
//! - `prompt`: report and ticket prompts sent to the completion service
//! - `checklist`: splitting a model reply into narrative + checklist flags
//! - `narrative`: whitespace cleanup, word wrapping and truncation
//! - `offenses`: the offense catalog and ticket assembly

pub mod checklist;
pub mod datetime;
pub mod error;
pub mod narrative;
pub mod offenses;
pub mod prompt;
pub mod submission;

pub use checklist::{parse_reply, ChecklistFlags, ChecklistItem, ParsedReply, ReplyFormat};
pub use datetime::{format_report_date, IncidentTime};
pub use error::{CatalogError, ChecklistError, SubmissionError};
pub use narrative::NarrativeLayout;
pub use offenses::{OffenseCatalog, OffenseEntry};
pub use prompt::{Prompt, PromptBuilder, PromptProfile};
pub use submission::{Individual, Submission, ValidSubmission, YesNo};
