//! Shared application state

use std::path::PathBuf;
use std::sync::Arc;

use incident_core::{OffenseCatalog, PromptBuilder};
use incident_pdf::FormPopulator;

use crate::completion::CompletionService;

/// Read-only state shared by every request
#[derive(Clone)]
pub struct AppState {
    pub completion: Arc<dyn CompletionService>,
    pub prompts: PromptBuilder,
    pub populator: Arc<FormPopulator>,
    pub catalog: Arc<OffenseCatalog>,
    /// Where the latest filled report is written; nothing is kept when unset
    pub artifact_path: Option<Arc<PathBuf>>,
}
