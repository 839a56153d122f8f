//! Checklist extraction from completion replies
//!
//! The report prompt asks the model for a narrative followed by eight yes/no
//! checklist answers. Three reply formats are understood:
//!
//! - `Structured`: a JSON object `{"narrative": "...", "checklist": {...}}`
//! - `Strict`: narrative text, then `key: true|false` lines; every key must
//!   be present with a boolean value
//! - `Tolerant`: same text layout, but a flag is only true when the literal
//!   `key: true` appears, and anything else reads as false

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ChecklistError;

/// Literal that starts the checklist block in text replies
pub const CHECKLIST_MARKER: &str = "weapon:";

/// The eight questions on the report checklist
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChecklistItem {
    Weapon,
    PropertyDamage,
    Arrests,
    Media,
    RestraintForce,
    ChemicalAgent,
    OutsideLawEnforcement,
    InjuryHospitalization,
}

impl ChecklistItem {
    /// In the order the model is asked to answer them
    pub const ALL: [ChecklistItem; 8] = [
        ChecklistItem::Weapon,
        ChecklistItem::PropertyDamage,
        ChecklistItem::Arrests,
        ChecklistItem::Media,
        ChecklistItem::RestraintForce,
        ChecklistItem::ChemicalAgent,
        ChecklistItem::OutsideLawEnforcement,
        ChecklistItem::InjuryHospitalization,
    ];

    /// Key used in model output
    pub fn key(self) -> &'static str {
        match self {
            ChecklistItem::Weapon => "weapon",
            ChecklistItem::PropertyDamage => "property_damage",
            ChecklistItem::Arrests => "arrests",
            ChecklistItem::Media => "media",
            ChecklistItem::RestraintForce => "restraint_force",
            ChecklistItem::ChemicalAgent => "chemical_agent",
            ChecklistItem::OutsideLawEnforcement => "outside_law_enforcement",
            ChecklistItem::InjuryHospitalization => "injury_hospitalization",
        }
    }

    /// Question wording used in the prompt
    pub fn question(self) -> &'static str {
        match self {
            ChecklistItem::Weapon => "Was a weapon involved?",
            ChecklistItem::PropertyDamage => "Was there damage to property?",
            ChecklistItem::Arrests => "Were any arrests made?",
            ChecklistItem::Media => "Was there media involvement?",
            ChecklistItem::RestraintForce => "Were restraints or force used?",
            ChecklistItem::ChemicalAgent => "Was a chemical agent used?",
            ChecklistItem::OutsideLawEnforcement => "Was outside law enforcement involved?",
            ChecklistItem::InjuryHospitalization => {
                "Was anyone injured or taken to a hospital?"
            }
        }
    }
}

/// Answers to the eight checklist questions, all false by default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecklistFlags([bool; 8]);

impl ChecklistFlags {
    pub fn get(&self, item: ChecklistItem) -> bool {
        self.0[item as usize]
    }

    pub fn set(&mut self, item: ChecklistItem, value: bool) {
        self.0[item as usize] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (ChecklistItem, bool)> + '_ {
        ChecklistItem::ALL.iter().map(|item| (*item, self.get(*item)))
    }

    /// Number of flags that are set
    pub fn count(&self) -> usize {
        self.0.iter().filter(|v| **v).count()
    }
}

impl Serialize for ChecklistFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeMap;
        let mut map = serializer.serialize_map(Some(ChecklistItem::ALL.len()))?;
        for (item, value) in self.iter() {
            map.serialize_entry(item.key(), &value)?;
        }
        map.end()
    }
}

/// How the completion service is asked to encode the checklist
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplyFormat {
    #[default]
    Structured,
    Strict,
    Tolerant,
}

impl ReplyFormat {
    /// Whether the completion service should be put in JSON mode
    pub fn wants_json(self) -> bool {
        self == ReplyFormat::Structured
    }
}

/// Narrative and checklist recovered from one reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReply {
    pub narrative: String,
    pub flags: ChecklistFlags,
    /// False only in tolerant mode when the reply had no checklist block
    pub checklist_present: bool,
}

/// A text reply cut at the checklist marker
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitReply<'a> {
    pub narrative: &'a str,
    /// Starts with `weapon:`
    pub checklist: &'a str,
}

/// Split on the first `weapon:`; everything before it is narrative
pub fn split_reply(text: &str) -> Result<SplitReply<'_>, ChecklistError> {
    let index = text
        .find(CHECKLIST_MARKER)
        .ok_or(ChecklistError::MarkerNotFound)?;
    Ok(SplitReply {
        narrative: text[..index].trim(),
        checklist: &text[index..],
    })
}

/// Substring scan: a flag is true iff `<key>: true` occurs in the block
pub fn scan_tolerant(block: &str) -> ChecklistFlags {
    let mut flags = ChecklistFlags::default();
    for item in ChecklistItem::ALL {
        let needle = format!("{}: true", item.key());
        flags.set(item, block.contains(&needle));
    }
    flags
}

/// Line parse: every key must appear as `key: true` or `key: false`
pub fn parse_strict(block: &str) -> Result<ChecklistFlags, ChecklistError> {
    let mut answers: [Option<bool>; 8] = [None; 8];

    for line in block.lines() {
        let Some((key, value)) = line.trim().split_once(':') else {
            continue;
        };
        let Some(item) = ChecklistItem::ALL
            .iter()
            .find(|item| item.key() == key.trim())
        else {
            continue;
        };
        let value = value.trim();
        answers[*item as usize] = Some(match value {
            "true" => true,
            "false" => false,
            other => {
                return Err(ChecklistError::MalformedFlag {
                    key: item.key(),
                    value: other.to_string(),
                })
            }
        });
    }

    let mut flags = ChecklistFlags::default();
    for item in ChecklistItem::ALL {
        let value = answers[item as usize].ok_or(ChecklistError::MissingFlag(item.key()))?;
        flags.set(item, value);
    }
    Ok(flags)
}

/// Strip a surrounding ```json fence if the model added one
fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let after_open = after_open
        .find('\n')
        .map(|pos| &after_open[pos + 1..])
        .unwrap_or(after_open);
    match after_open.rfind("```") {
        Some(close) => after_open[..close].trim(),
        None => after_open.trim(),
    }
}

/// Balanced `{...}` opening at byte `start`, ignoring braces inside strings
fn balanced_object_at(text: &str, start: usize) -> Option<&str> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escape_next = false;

    for (i, ch) in text[start..].char_indices() {
        if escape_next {
            escape_next = false;
            continue;
        }
        match ch {
            '\\' if in_string => escape_next = true,
            '"' => in_string = !in_string,
            '{' if !in_string => depth += 1,
            '}' if !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..=start + i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// First object in the text carrying both `narrative` and `checklist`.
///
/// Each `{` is tried in turn so braces in surrounding prose are skipped.
fn find_reply_object(text: &str) -> Result<Value, ChecklistError> {
    let mut first_error = None;
    for (start, _) in text.match_indices('{') {
        let Some(candidate) = balanced_object_at(text, start) else {
            continue;
        };
        match serde_json::from_str::<Value>(candidate) {
            Ok(value) if value.get("narrative").is_some() && value.get("checklist").is_some() => {
                return Ok(value)
            }
            Ok(_) => {}
            Err(e) => {
                first_error.get_or_insert_with(|| e.to_string());
            }
        }
    }
    Err(ChecklistError::MalformedReply(
        first_error.unwrap_or_else(|| "no JSON object found".into()),
    ))
}

/// Parse a JSON-mode reply
pub fn parse_structured(text: &str) -> Result<ParsedReply, ChecklistError> {
    let value = find_reply_object(strip_code_fence(text))?;

    let narrative = value
        .get("narrative")
        .and_then(Value::as_str)
        .ok_or_else(|| ChecklistError::MalformedReply("missing string 'narrative'".into()))?;
    let checklist = value
        .get("checklist")
        .and_then(Value::as_object)
        .ok_or_else(|| ChecklistError::MalformedReply("missing object 'checklist'".into()))?;

    let mut flags = ChecklistFlags::default();
    for item in ChecklistItem::ALL {
        match checklist.get(item.key()) {
            Some(Value::Bool(b)) => flags.set(item, *b),
            Some(other) => {
                return Err(ChecklistError::MalformedFlag {
                    key: item.key(),
                    value: other.to_string(),
                })
            }
            None => return Err(ChecklistError::MissingFlag(item.key())),
        }
    }

    Ok(ParsedReply {
        narrative: narrative.trim().to_string(),
        flags,
        checklist_present: true,
    })
}

/// Recover narrative and flags from a completion reply
pub fn parse_reply(format: ReplyFormat, text: &str) -> Result<ParsedReply, ChecklistError> {
    match format {
        ReplyFormat::Structured => parse_structured(text),
        ReplyFormat::Strict => {
            let split = split_reply(text)?;
            Ok(ParsedReply {
                narrative: split.narrative.to_string(),
                flags: parse_strict(split.checklist)?,
                checklist_present: true,
            })
        }
        ReplyFormat::Tolerant => match split_reply(text) {
            Ok(split) => Ok(ParsedReply {
                narrative: split.narrative.to_string(),
                flags: scan_tolerant(split.checklist),
                checklist_present: true,
            }),
            Err(ChecklistError::MarkerNotFound) => Ok(ParsedReply {
                narrative: text.trim().to_string(),
                flags: ChecklistFlags::default(),
                checklist_present: false,
            }),
            Err(other) => Err(other),
        },
    }
}
