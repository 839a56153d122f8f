//! Disciplinary offense catalog and ticket assembly

use std::collections::HashSet;

use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::datetime::format_report_date;
use crate::error::CatalogError;
use crate::prompt::{individual_lines, CHAIN_OF_COMMAND_SUFFIX};
use crate::submission::ValidSubmission;

lazy_static! {
    static ref OFFENSE_CODE: Regex = Regex::new(r"\b(\d{3})\b").unwrap();
}

/// One disciplinary offense
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OffenseEntry {
    pub code: String,
    pub label: String,
}

impl OffenseEntry {
    pub fn new(code: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            label: label.into(),
        }
    }

    /// "214 - Fighting"
    pub fn display(&self) -> String {
        format!("{} - {}", self.code, self.label)
    }
}

/// Immutable list of offenses the model may choose from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OffenseCatalog {
    entries: Vec<OffenseEntry>,
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(rename = "offense")]
    offenses: Vec<OffenseEntry>,
}

const BUILTIN_OFFENSES: &[(&str, &str)] = &[
    ("312", "Possession of Money"),
    ("313", "Disobeying a Direct Order"),
    ("402", "Health, Smoking, or Safety Violations"),
    ("404", "Violation of Rules"),
    ("405", "Failure to Report"),
    ("406", "Trading or Trafficking"),
    ("501", "Violating State or Federal Laws"),
    (
        "601",
        "Aiding and Abetting, Attempt, Solicitation, or Conspiracy",
    ),
    ("203", "Drugs and Drug Paraphernalia"),
    ("204", "Forgery"),
    (
        "205",
        "Security Threat Group or Unauthorized Organizational Activity",
    ),
    ("206", "Intimidation or Threats"),
    ("208", "Dangerous Communications"),
    ("209", "Dangerous Written Material"),
    ("210", "Impairment of Surveillance"),
    (
        "211",
        "Possession or Solicitation of Unauthorized Personal Information",
    ),
    ("212", "Frivolous Lawsuit"),
    ("213", "Failure to Reveal Assets"),
    ("214", "Fighting"),
    (
        "215",
        "Disobeying a Direct Order Essential to Safety and Security",
    ),
    ("302", "Gambling"),
    ("303", "Giving False Information to an Employee"),
    ("305", "Theft"),
    ("304", "Insolence"),
    ("306", "Transfer of Funds"),
    ("307", "Unauthorized Movement"),
    ("308", "Contraband or Unauthorized Property"),
    ("309", "Petitions, Postings, and Business Ventures"),
    ("310", "Abuse of Privileges"),
    ("311", "Failure to Submit to Medical or Forensic Tests"),
];

impl Default for OffenseCatalog {
    fn default() -> Self {
        Self {
            entries: BUILTIN_OFFENSES
                .iter()
                .map(|(code, label)| OffenseEntry::new(*code, *label))
                .collect(),
        }
    }
}

impl OffenseCatalog {
    pub fn new(entries: Vec<OffenseEntry>) -> Result<Self, CatalogError> {
        if entries.is_empty() {
            return Err(CatalogError::Empty);
        }
        let mut seen = HashSet::new();
        for (index, entry) in entries.iter().enumerate() {
            if entry.code.trim().is_empty() || entry.label.trim().is_empty() {
                return Err(CatalogError::BlankEntry(index + 1));
            }
            if !seen.insert(entry.code.as_str()) {
                return Err(CatalogError::DuplicateCode(entry.code.clone()));
            }
        }
        Ok(Self { entries })
    }

    /// Parse `[[offense]]` tables with `code` and `label`
    pub fn from_toml_str(s: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(s)?;
        Self::new(file.offenses)
    }

    pub fn entries(&self) -> &[OffenseEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains_code(&self, code: &str) -> bool {
        self.entries.iter().any(|e| e.code == code)
    }

    /// "code - label" strings, one per entry, in catalog order
    pub fn display_lines(&self) -> Vec<String> {
        self.entries.iter().map(OffenseEntry::display).collect()
    }
}

/// Non-blank lines of the model's offense reply, passed through verbatim
pub fn offense_lines(reply: &str) -> Vec<String> {
    reply
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.trim_end_matches('\r').to_string())
        .collect()
}

/// Lines that cite no code from the catalog
pub fn unrecognized_lines<'a>(catalog: &OffenseCatalog, lines: &'a [String]) -> Vec<&'a str> {
    lines
        .iter()
        .filter(|line| {
            !OFFENSE_CODE
                .captures_iter(line)
                .any(|c| catalog.contains_code(&c[1]))
        })
        .map(String::as_str)
        .collect()
}

/// Assemble the ticket text returned by `/generate-ticket`
pub fn build_ticket(submission: &ValidSubmission, date: NaiveDate, offenses: &[String]) -> String {
    let mut ticket = format!(
        "On {}, I C/O {}, Badge #{}, was assigned to {}.\n\
         At approximately {}, while conducting my assigned duties, I observed the following violation:\n\n\
         Incident Summary: {}\n",
        format_report_date(date),
        submission.officer_name(),
        submission.badge_number(),
        submission.assigned_area(),
        submission.incident_time(),
        submission.incident_details(),
    );
    for line in individual_lines(submission) {
        ticket.push_str(&line);
        ticket.push('\n');
    }
    ticket.push_str("\nThe following offenses were identified based on the described incident:\n");

    if !offenses.is_empty() {
        ticket.push_str("\nOffense Codes:\n");
        ticket.push_str(&offenses.join("\n"));
        ticket.push('\n');
    }

    if submission.healthcare() {
        ticket.push_str("The individual was taken to the Healthcare unit for evaluation.\n");
    }
    if submission.mental_health() {
        ticket.push_str("The individual was evaluated by mental health staff.\n");
    }
    if submission.restrictive_housing() {
        ticket.push_str("The individual was taken to N2 restrictive housing.\n");
    }

    ticket.push_str(&format!(
        "\nProper chain of command was notified, and {} {}",
        submission.individual_labels(),
        CHAIN_OF_COMMAND_SUFFIX
    ));
    ticket
}
