//! The officer's form submission
//!
//! `Submission` mirrors the JSON body posted by the browser and accepts
//! anything (missing keys become empty values). `ValidSubmission` is what the
//! rest of the system works with; the only way to get one is
//! [`Submission::validate`].

use serde::{Deserialize, Serialize};

use crate::datetime::IncidentTime;
use crate::error::SubmissionError;

/// A yes/no answer from the form
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    #[default]
    No,
}

impl YesNo {
    pub fn is_yes(self) -> bool {
        self == YesNo::Yes
    }
}

/// A person involved in the incident
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Individual {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: String,
}

impl Individual {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// "Name (ID: 123)"
    pub fn label(&self) -> String {
        format!("{} (ID: {})", self.name, self.id)
    }
}

/// Raw submission as posted by the report form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    #[serde(default)]
    pub officer_name: String,
    #[serde(default)]
    pub badge_number: String,
    #[serde(default)]
    pub assigned_area: String,
    #[serde(default)]
    pub incident_time: String,
    #[serde(default)]
    pub incident_details: String,
    #[serde(default)]
    pub healthcare: YesNo,
    #[serde(default)]
    pub mental_health: YesNo,
    #[serde(default)]
    pub restrictive_housing: YesNo,
    #[serde(default)]
    pub inmates: Vec<Individual>,
}

impl Submission {
    /// Check required fields once and freeze the record
    pub fn validate(self) -> Result<ValidSubmission, SubmissionError> {
        let required = [
            ("officerName", &self.officer_name),
            ("badgeNumber", &self.badge_number),
            ("assignedArea", &self.assigned_area),
            ("incidentTime", &self.incident_time),
            ("incidentDetails", &self.incident_details),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SubmissionError::MissingField(name));
            }
        }

        if self.inmates.is_empty() {
            return Err(SubmissionError::NoIndividuals);
        }
        if let Some(index) = self
            .inmates
            .iter()
            .position(|i| i.name.trim().is_empty() || i.id.trim().is_empty())
        {
            return Err(SubmissionError::IncompleteIndividual(index + 1));
        }

        let time = IncidentTime::parse(&self.incident_time)?;

        Ok(ValidSubmission {
            inner: self,
            time,
        })
    }
}

/// A submission that passed [`Submission::validate`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidSubmission {
    inner: Submission,
    time: IncidentTime,
}

impl ValidSubmission {
    pub fn officer_name(&self) -> &str {
        &self.inner.officer_name
    }

    pub fn badge_number(&self) -> &str {
        &self.inner.badge_number
    }

    pub fn assigned_area(&self) -> &str {
        &self.inner.assigned_area
    }

    pub fn incident_details(&self) -> &str {
        &self.inner.incident_details
    }

    pub fn incident_time(&self) -> IncidentTime {
        self.time
    }

    pub fn healthcare(&self) -> bool {
        self.inner.healthcare.is_yes()
    }

    pub fn mental_health(&self) -> bool {
        self.inner.mental_health.is_yes()
    }

    pub fn restrictive_housing(&self) -> bool {
        self.inner.restrictive_housing.is_yes()
    }

    /// Never empty
    pub fn individuals(&self) -> &[Individual] {
        &self.inner.inmates
    }

    /// "A (ID: 1), B (ID: 2)"
    pub fn individual_labels(&self) -> String {
        self.inner
            .inmates
            .iter()
            .map(Individual::label)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample() -> Submission {
        Submission {
            officer_name: "Jordan Reyes".into(),
            badge_number: "4471".into(),
            assigned_area: "Housing Unit B".into(),
            incident_time: "14:30".into(),
            incident_details: "Two inmates were fighting in the dayroom.".into(),
            healthcare: YesNo::Yes,
            mental_health: YesNo::No,
            restrictive_housing: YesNo::No,
            inmates: vec![
                Individual::new("John Doe", "A1001"),
                Individual::new("Sam Roe", "A1002"),
            ],
        }
    }

    #[test]
    fn test_valid_submission_passes() {
        let valid = sample().validate().unwrap();
        assert_eq!(valid.officer_name(), "Jordan Reyes");
        assert_eq!(valid.incident_time().to_12_hour(), "2:30 PM");
        assert!(valid.healthcare());
        assert!(!valid.restrictive_housing());
        assert_eq!(
            valid.individual_labels(),
            "John Doe (ID: A1001), Sam Roe (ID: A1002)"
        );
    }

    #[test]
    fn test_blank_fields_rejected() {
        let mut sub = sample();
        sub.badge_number = "   ".into();
        assert_eq!(
            sub.validate(),
            Err(SubmissionError::MissingField("badgeNumber"))
        );
    }

    #[test]
    fn test_empty_individuals_rejected() {
        let mut sub = sample();
        sub.inmates.clear();
        assert_eq!(sub.validate(), Err(SubmissionError::NoIndividuals));
    }

    #[test]
    fn test_placeholder_individual_rejected() {
        let mut sub = sample();
        sub.inmates.push(Individual::default());
        assert_eq!(
            sub.validate(),
            Err(SubmissionError::IncompleteIndividual(3))
        );
    }

    #[test]
    fn test_deserializes_form_payload() {
        let json = r#"{
            "officerName": "Jordan Reyes",
            "badgeNumber": "4471",
            "assignedArea": "Yard",
            "incidentTime": "08:15",
            "incidentDetails": "Refused to return to cell.",
            "healthcare": "no",
            "mentalHealth": "yes",
            "inmates": [{"name": "John Doe", "id": "A1001"}]
        }"#;
        let sub: Submission = serde_json::from_str(json).unwrap();
        assert_eq!(sub.mental_health, YesNo::Yes);
        assert_eq!(sub.restrictive_housing, YesNo::No);
        assert!(sub.validate().is_ok());
    }

    #[test]
    fn test_missing_keys_deserialize_as_blank() {
        let sub: Submission = serde_json::from_str("{}").unwrap();
        assert_eq!(
            sub.validate(),
            Err(SubmissionError::MissingField("officerName"))
        );
    }
}
