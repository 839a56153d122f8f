//! Prompt construction for the completion service
//!
//! User input is interpolated verbatim; the prompts are natural language and
//! nothing downstream re-parses them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::checklist::{ChecklistItem, ReplyFormat};
use crate::datetime::format_report_date;
use crate::offenses::OffenseCatalog;
use crate::submission::ValidSubmission;

pub(crate) const CHAIN_OF_COMMAND_SUFFIX: &str =
    "was identified by state-issued ID and Offender 360.";

const HEALTHCARE_SENTENCE: &str = "The individual was taken to the Healthcare unit where they were evaluated by healthcare and mental health staff.";
const MENTAL_HEALTH_SENTENCE: &str = "The individual was evaluated by mental health staff.";
const RESTRICTIVE_HOUSING_SENTENCE: &str = "The individual was taken to N2 restrictive housing.";

const REPORT_RULES: &str = "\
You are an expert at writing professional correctional officer incident reports.
Follow these strict rules when generating the report:

1. Every report must start with the following:
   \"On (Day of the Week), (Month) (Day), (Year), I (Rank) (Full Name) was assigned to (Assignment).\"

2. Describe the officer's observations in a neutral and factual manner.
   - \"While conducting my assigned duties, I observed (incident) involving (full inmate name & ID).\"

3. If an inmate was injured or required medical attention:
   - \"The individual was then taken to the Healthcare unit where they were evaluated by proper healthcare staff and mental health staff.\"

4. All reports must end with:
   - \"Proper chain of command was notified, and (full name of inmate(s) with ID) was identified by state-issued ID and Offender 360.\"

5. Ensure proper grammar, spelling, and punctuation throughout the report.

6. Avoid repeating information already stated (e.g., Healthcare evaluation should only be stated once).";

const EXPANDED_RULES: &str = "

7. Write a detailed narrative of several paragraphs describing the events in chronological order.
   Include what the officer saw and heard, the actions taken by each individual, the officer's response,
   and who was notified. Do not invent facts that are not in the summary.";

const TICKET_RULES: &str = "\
You are an expert at writing professional correctional officer disciplinary tickets.
Your task is to:
- Identify the correct offense codes ONLY from the provided list.
- If an offense applies, assign it to the inmate.
- If multiple offenses apply, list them all.
- Ensure the ticket remains factual and aligned with standard correctional facility reporting.
- Do NOT create new offenses. Use only those from the provided list.
- Write one offense per line, starting with its code.";

/// Narrative rule set used for the report system instruction
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptProfile {
    #[default]
    Standard,
    Expanded,
}

/// A system instruction plus the user message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// "Inmate N: name (ID: id)" lines, numbered from 1
pub fn individual_lines(submission: &ValidSubmission) -> Vec<String> {
    submission
        .individuals()
        .iter()
        .enumerate()
        .map(|(i, individual)| format!("Inmate {}: {}", i + 1, individual.label()))
        .collect()
}

/// The incident description sent as the report request
pub fn incident_description(submission: &ValidSubmission, date: NaiveDate) -> String {
    let mut text = format!(
        "On {}, I C/O {}, Badge #{}, was assigned to {}.\n\
         At approximately {}, while conducting my assigned duties, I observed the following incident:\n\n\
         Incident Summary: {}\n",
        format_report_date(date),
        submission.officer_name(),
        submission.badge_number(),
        submission.assigned_area(),
        submission.incident_time(),
        submission.incident_details(),
    );

    for line in individual_lines(submission) {
        text.push_str(&line);
        text.push('\n');
    }

    let conditions = [
        (submission.healthcare(), HEALTHCARE_SENTENCE),
        (submission.mental_health(), MENTAL_HEALTH_SENTENCE),
        (submission.restrictive_housing(), RESTRICTIVE_HOUSING_SENTENCE),
    ];
    for (applies, sentence) in conditions {
        if applies {
            text.push_str(sentence);
            text.push('\n');
        }
    }

    text.push_str(&format!(
        "\nProper chain of command was notified, and {} {}",
        submission.individual_labels(),
        CHAIN_OF_COMMAND_SUFFIX
    ));
    text
}

fn checklist_instructions(format: ReplyFormat) -> String {
    let questions: String = ChecklistItem::ALL
        .iter()
        .map(|item| format!("- {}: {}\n", item.key(), item.question()))
        .collect();

    match format {
        ReplyFormat::Structured => format!(
            "Respond with a single JSON object and nothing else, shaped as\n\
             {{\"narrative\": \"<the full report text>\", \"checklist\": {{\"<key>\": true or false, ...}}}}\n\
             The checklist object must contain exactly these keys, each answered with a JSON boolean:\n{}",
            questions
        ),
        ReplyFormat::Strict | ReplyFormat::Tolerant => {
            let template: String = ChecklistItem::ALL
                .iter()
                .map(|item| format!("{}: true|false\n", item.key()))
                .collect();
            format!(
                "After the report, on new lines, answer this checklist:\n{}\
                 Write the checklist exactly in this format, one line per key, in this order, \
                 using lowercase true or false and nothing else on the line:\n{}\
                 Do not use the word \"weapon:\" anywhere in the report text itself.",
                questions, template
            )
        }
    }
}

/// Builds report and ticket prompts for one configuration
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptBuilder {
    pub profile: PromptProfile,
    pub reply_format: ReplyFormat,
}

impl PromptBuilder {
    pub fn new(profile: PromptProfile, reply_format: ReplyFormat) -> Self {
        Self {
            profile,
            reply_format,
        }
    }

    /// System instruction for report generation
    pub fn report_instructions(&self) -> String {
        let mut system = REPORT_RULES.to_string();
        if self.profile == PromptProfile::Expanded {
            system.push_str(EXPANDED_RULES);
        }
        system.push_str("\n\n");
        system.push_str(&checklist_instructions(self.reply_format));
        system
    }

    pub fn report(&self, submission: &ValidSubmission, date: NaiveDate) -> Prompt {
        Prompt {
            system: self.report_instructions(),
            user: format!(
                "Generate a professional 434 incident report based on these details:\n\n{}",
                incident_description(submission, date)
            ),
        }
    }

    /// Offense matching request; only the incident details and the catalog
    /// are sent
    pub fn ticket(&self, submission: &ValidSubmission, catalog: &OffenseCatalog) -> Prompt {
        Prompt {
            system: TICKET_RULES.to_string(),
            user: format!(
                "Given this incident summary:\n\"{}\"\nMatch the correct offenses from this list:\n{}\n\n\
                 Provide the offense codes and a brief justification for each.",
                submission.incident_details(),
                catalog.display_lines().join("\n")
            ),
        }
    }
}
