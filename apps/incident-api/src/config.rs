//! Command-line and environment configuration
//!
//! Every flag can also be set from the environment (or a `.env` file).
//! Startup fails before the listener binds if the template, layout or
//! offense catalog cannot be loaded or do not agree with each other.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use incident_core::{NarrativeLayout, OffenseCatalog, PromptBuilder, PromptProfile, ReplyFormat};
use incident_pdf::{FormLayout, FormPopulator, FormTemplate};
use tracing::info;

use crate::completion::OpenAiCompletion;
use crate::state::AppState;

/// Command-line arguments for the incident API server
#[derive(Parser, Debug, Clone)]
#[command(name = "incident-api", version)]
#[command(about = "Drafts 434 incident reports and disciplinary tickets")]
pub struct Args {
    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: String,

    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value = "5000")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Root of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = "https://api.openai.com/v1")]
    pub openai_base_url: String,

    #[arg(long, env = "OPENAI_MODEL", default_value = "gpt-3.5-turbo-0125")]
    pub openai_model: String,

    /// Completion request timeout in seconds, 0 for none
    #[arg(long, env = "COMPLETION_TIMEOUT_SECS", default_value = "0")]
    pub completion_timeout_secs: u64,

    /// Blank report form with fillable fields
    #[arg(long, env = "REPORT_TEMPLATE", default_value = "templates/434_template.pdf")]
    pub report_template: PathBuf,

    /// TOML field layout; the stock 434 layout when unset
    #[arg(long, env = "REPORT_LAYOUT")]
    pub report_layout: Option<PathBuf>,

    /// TOML offense catalog; the built-in catalog when unset
    #[arg(long, env = "OFFENSE_CATALOG")]
    pub offense_catalog: Option<PathBuf>,

    /// Where to keep a copy of the latest filled report
    #[arg(long, env = "REPORT_OUTPUT")]
    pub report_output: Option<PathBuf>,

    /// Narrative rules: standard or expanded
    #[arg(long, env = "PROMPT_PROFILE", default_value = "standard", value_parser = parse_profile)]
    pub prompt_profile: PromptProfile,

    /// Checklist encoding: structured, strict or tolerant
    #[arg(long, env = "REPLY_FORMAT", default_value = "structured", value_parser = parse_reply_format)]
    pub reply_format: ReplyFormat,

    #[arg(long, env = "NARRATIVE_WORDS_PER_LINE", default_value = "14")]
    pub narrative_words_per_line: usize,

    #[arg(long, env = "NARRATIVE_MAX_CHARS", default_value = "2400")]
    pub narrative_max_chars: usize,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

fn parse_profile(s: &str) -> Result<PromptProfile, String> {
    match s.to_ascii_lowercase().as_str() {
        "standard" => Ok(PromptProfile::Standard),
        "expanded" => Ok(PromptProfile::Expanded),
        other => Err(format!(
            "unknown prompt profile '{}', expected standard or expanded",
            other
        )),
    }
}

fn parse_reply_format(s: &str) -> Result<ReplyFormat, String> {
    match s.to_ascii_lowercase().as_str() {
        "structured" => Ok(ReplyFormat::Structured),
        "strict" => Ok(ReplyFormat::Strict),
        "tolerant" => Ok(ReplyFormat::Tolerant),
        other => Err(format!(
            "unknown reply format '{}', expected structured, strict or tolerant",
            other
        )),
    }
}

pub fn load_layout(path: Option<&Path>) -> Result<FormLayout> {
    let Some(path) = path else {
        return Ok(FormLayout::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read form layout {}", path.display()))?;
    FormLayout::from_toml_str(&text)
        .with_context(|| format!("invalid form layout {}", path.display()))
}

pub fn load_catalog(path: Option<&Path>) -> Result<OffenseCatalog> {
    let Some(path) = path else {
        return Ok(OffenseCatalog::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read offense catalog {}", path.display()))?;
    OffenseCatalog::from_toml_str(&text)
        .with_context(|| format!("invalid offense catalog {}", path.display()))
}

impl Args {
    pub fn narrative_layout(&self) -> Result<NarrativeLayout> {
        ensure!(
            self.narrative_words_per_line >= 1,
            "NARRATIVE_WORDS_PER_LINE must be at least 1"
        );
        ensure!(
            self.narrative_max_chars >= 1,
            "NARRATIVE_MAX_CHARS must be at least 1"
        );
        Ok(NarrativeLayout::new(
            self.narrative_words_per_line,
            self.narrative_max_chars,
        ))
    }

    pub fn completion_timeout(&self) -> Option<Duration> {
        (self.completion_timeout_secs > 0).then(|| Duration::from_secs(self.completion_timeout_secs))
    }
}

/// Load and cross-check everything the handlers need
pub fn build_state(args: &Args) -> Result<AppState> {
    ensure!(
        !args.openai_api_key.trim().is_empty(),
        "OPENAI_API_KEY must not be empty"
    );
    let narrative = args.narrative_layout()?;

    let layout = load_layout(args.report_layout.as_deref())?;
    let template = FormTemplate::load(&args.report_template).context("failed to load report template")?;
    let populator = FormPopulator::new(template, layout, narrative)
        .context("report template does not match the form layout")?;
    let catalog = load_catalog(args.offense_catalog.as_deref())?;

    let completion = OpenAiCompletion::new(
        &args.openai_base_url,
        args.openai_api_key.trim(),
        &args.openai_model,
        args.completion_timeout(),
    )
    .context("failed to build completion client")?;

    info!(
        template = %args.report_template.display(),
        slots = populator.slot_count(),
        offenses = catalog.len(),
        model = completion.model(),
        profile = ?args.prompt_profile,
        reply_format = ?args.reply_format,
        "Configuration loaded"
    );

    Ok(AppState {
        completion: Arc::new(completion),
        prompts: PromptBuilder::new(args.prompt_profile, args.reply_format),
        populator: Arc::new(populator),
        catalog: Arc::new(catalog),
        artifact_path: args.report_output.clone().map(Arc::new),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use incident_pdf::fixture::blank_form;
    use uuid::Uuid;

    fn scratch_file(name: &str, contents: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("incident-api-{}-{}", Uuid::new_v4(), name));
        std::fs::write(&path, contents).unwrap();
        path
    }

    /// Variables that would otherwise leak from the developer's shell
    const ENV_FALLBACKS: &[&str] = &[
        "OPENAI_API_KEY",
        "PORT",
        "HOST",
        "OPENAI_BASE_URL",
        "OPENAI_MODEL",
        "COMPLETION_TIMEOUT_SECS",
        "REPORT_TEMPLATE",
        "REPORT_LAYOUT",
        "OFFENSE_CATALOG",
        "REPORT_OUTPUT",
        "PROMPT_PROFILE",
        "REPLY_FORMAT",
        "NARRATIVE_WORDS_PER_LINE",
        "NARRATIVE_MAX_CHARS",
    ];

    fn args(extra: &[&str]) -> Args {
        for name in ENV_FALLBACKS {
            std::env::remove_var(name);
        }
        let mut argv = vec!["incident-api", "--openai-api-key", "sk-test"];
        argv.extend_from_slice(extra);
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_value_parsers() {
        assert_eq!(parse_profile("Expanded"), Ok(PromptProfile::Expanded));
        assert_eq!(parse_reply_format("tolerant"), Ok(ReplyFormat::Tolerant));
        assert!(parse_reply_format("loose").is_err());
        assert!(parse_profile("").is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let args = args(&[
            "--reply-format",
            "strict",
            "--prompt-profile",
            "expanded",
            "--completion-timeout-secs",
            "30",
        ]);
        assert_eq!(args.reply_format, ReplyFormat::Strict);
        assert_eq!(args.prompt_profile, PromptProfile::Expanded);
        assert_eq!(args.completion_timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn test_unset_flags_take_defaults() {
        let args = args(&[]);
        assert_eq!(args.reply_format, ReplyFormat::Structured);
        assert_eq!(args.prompt_profile, PromptProfile::Standard);
        assert_eq!(args.completion_timeout(), None);
        assert_eq!(args.narrative_words_per_line, 14);
        assert_eq!(args.narrative_max_chars, 2400);
        assert!(args.report_output.is_none());
        assert!(args.report_layout.is_none());
    }

    #[test]
    fn test_zero_word_budget_rejected() {
        let args = args(&["--narrative-words-per-line", "0"]);
        assert!(args.narrative_layout().is_err());
    }

    #[test]
    fn test_missing_template_fails_startup() {
        let args = args(&["--report-template", "/nonexistent/434.pdf"]);
        let err = build_state(&args).err().unwrap();
        assert!(format!("{:#}", err).contains("Template not found"));
    }

    #[test]
    fn test_layout_mismatch_fails_startup() {
        let template = scratch_file("template.pdf", &blank_form(&FormLayout::default()));
        let layout = scratch_file("layout.toml", b"narrative_field = \"Statement\"\n");
        let args = args(&[
            "--report-template",
            template.to_str().unwrap(),
            "--report-layout",
            layout.to_str().unwrap(),
        ]);
        let err = build_state(&args).err().unwrap();
        assert!(format!("{:#}", err).contains("Statement"));
        std::fs::remove_file(template).ok();
        std::fs::remove_file(layout).ok();
    }

    #[test]
    fn test_build_state_with_matching_template() {
        let template = scratch_file("template.pdf", &blank_form(&FormLayout::default()));
        let catalog = scratch_file(
            "catalog.toml",
            b"[[offense]]\ncode = \"214\"\nlabel = \"Fighting\"\n",
        );
        let args = args(&[
            "--report-template",
            template.to_str().unwrap(),
            "--offense-catalog",
            catalog.to_str().unwrap(),
        ]);
        let state = build_state(&args).unwrap();
        assert_eq!(state.populator.slot_count(), 3);
        assert_eq!(state.catalog.len(), 1);
        assert!(state.artifact_path.is_none());
        std::fs::remove_file(template).ok();
        std::fs::remove_file(catalog).ok();
    }

    #[test]
    fn test_bad_catalog_reports_path() {
        let catalog = scratch_file("catalog.toml", b"[[offense]]\ncode = \"214\"\n");
        let err = load_catalog(Some(&catalog)).unwrap_err();
        assert!(err.to_string().contains("invalid offense catalog"));
        std::fs::remove_file(catalog).ok();
    }

    #[test]
    fn test_defaults_without_files() {
        assert_eq!(load_layout(None).unwrap(), FormLayout::default());
        assert_eq!(load_catalog(None).unwrap().len(), 30);
    }
}
