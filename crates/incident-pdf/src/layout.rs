//! Field-name layout of the incident report template
//!
//! The layout maps report data onto the template's field names. It is
//! loaded from TOML or taken from [`FormLayout::default`], which matches
//! the stock "434" form.

use std::collections::BTreeSet;

use incident_core::ChecklistItem;
use serde::{Deserialize, Serialize};

use crate::error::PdfFormError;
use crate::form::FieldKind;

/// Text fields for one involved individual
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndividualSlot {
    pub name_field: String,
    pub id_field: String,
}

/// Checkbox bound to a checklist answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckboxBinding {
    pub item: ChecklistItem,
    pub field: String,
}

/// Text field that always receives the same value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedField {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OfficerFields {
    pub name: Option<String>,
    pub badge: Option<String>,
    pub area: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormLayout {
    pub narrative_field: String,
    /// Forced font size for the narrative; template default when unset
    pub narrative_font_size: Option<f32>,
    pub date_field: String,
    pub time_field: String,
    pub officer: OfficerFields,
    /// Ordered slots; the first individual goes in the first slot
    pub individuals: Vec<IndividualSlot>,
    pub checkboxes: Vec<CheckboxBinding>,
    pub fixed: Vec<FixedField>,
}

fn checkbox_field_name(item: ChecklistItem) -> &'static str {
    match item {
        ChecklistItem::Weapon => "Weapon",
        ChecklistItem::PropertyDamage => "Property Damage",
        ChecklistItem::Arrests => "Arrests",
        ChecklistItem::Media => "Media",
        ChecklistItem::RestraintForce => "Restraint Force",
        ChecklistItem::ChemicalAgent => "Chemical Agent",
        ChecklistItem::OutsideLawEnforcement => "Outside Law Enforcement",
        ChecklistItem::InjuryHospitalization => "Injury Hospitalization",
    }
}

impl Default for FormLayout {
    fn default() -> Self {
        Self {
            narrative_field: "Narrative".to_string(),
            narrative_font_size: Some(9.0),
            date_field: "Date".to_string(),
            time_field: "Time".to_string(),
            officer: OfficerFields::default(),
            individuals: (1..=3)
                .map(|n| IndividualSlot {
                    name_field: format!("Inmate Name {}", n),
                    id_field: format!("Inmate Number {}", n),
                })
                .collect(),
            checkboxes: ChecklistItem::ALL
                .iter()
                .map(|item| CheckboxBinding {
                    item: *item,
                    field: checkbox_field_name(*item).to_string(),
                })
                .collect(),
            fixed: Vec::new(),
        }
    }
}

impl FormLayout {
    pub fn from_toml_str(s: &str) -> Result<Self, PdfFormError> {
        let layout: FormLayout =
            toml::from_str(s).map_err(|e| PdfFormError::InvalidLayout(e.to_string()))?;
        layout.validate()?;
        Ok(layout)
    }

    /// Structural checks that need no template
    pub fn validate(&self) -> Result<(), PdfFormError> {
        if self.individuals.is_empty() {
            return Err(PdfFormError::InvalidLayout(
                "at least one individual slot is required".into(),
            ));
        }
        if let Some(size) = self.narrative_font_size {
            if !(size.is_finite() && size > 0.0) {
                return Err(PdfFormError::InvalidLayout(format!(
                    "narrative font size must be positive, got {}",
                    size
                )));
            }
        }

        let bound: BTreeSet<ChecklistItem> = self.checkboxes.iter().map(|b| b.item).collect();
        if bound.len() != self.checkboxes.len() {
            return Err(PdfFormError::InvalidLayout(
                "a checklist item is bound to more than one checkbox".into(),
            ));
        }
        if let Some(missing) = ChecklistItem::ALL.iter().find(|item| !bound.contains(item)) {
            return Err(PdfFormError::InvalidLayout(format!(
                "checklist item '{}' has no checkbox",
                missing.key()
            )));
        }

        let mut seen = BTreeSet::new();
        for (name, _) in self.expected_fields() {
            if name.trim().is_empty() {
                return Err(PdfFormError::InvalidLayout("empty field name".into()));
            }
            if !seen.insert(name.clone()) {
                return Err(PdfFormError::InvalidLayout(format!(
                    "field '{}' is used more than once",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Every field the layout writes, with the kind it must have
    pub fn expected_fields(&self) -> Vec<(String, FieldKind)> {
        let mut fields = vec![
            (self.narrative_field.clone(), FieldKind::Text),
            (self.date_field.clone(), FieldKind::Text),
            (self.time_field.clone(), FieldKind::Text),
        ];
        for name in [&self.officer.name, &self.officer.badge, &self.officer.area]
            .into_iter()
            .flatten()
        {
            fields.push((name.clone(), FieldKind::Text));
        }
        for slot in &self.individuals {
            fields.push((slot.name_field.clone(), FieldKind::Text));
            fields.push((slot.id_field.clone(), FieldKind::Text));
        }
        for binding in &self.checkboxes {
            fields.push((binding.field.clone(), FieldKind::Checkbox));
        }
        for fixed in &self.fixed {
            fields.push((fixed.name.clone(), FieldKind::Text));
        }
        fields
    }

    pub fn slot_count(&self) -> usize {
        self.individuals.len()
    }
}
