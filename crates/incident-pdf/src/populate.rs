//! Fill the report template from a submission and a parsed reply

use chrono::NaiveDate;
use incident_core::{format_report_date, ChecklistFlags, NarrativeLayout, ValidSubmission};
use tracing::debug;

use crate::error::PdfFormError;
use crate::form::FormDocument;
use crate::layout::FormLayout;
use crate::template::FormTemplate;

/// Everything written onto one report
#[derive(Debug, Clone, Copy)]
pub struct ReportContent<'a> {
    pub submission: &'a ValidSubmission,
    pub date: NaiveDate,
    pub flags: ChecklistFlags,
    pub narrative: &'a str,
}

/// A template checked against its layout, ready to fill
#[derive(Debug, Clone)]
pub struct FormPopulator {
    template: FormTemplate,
    layout: FormLayout,
    narrative: NarrativeLayout,
}

impl FormPopulator {
    pub fn new(
        template: FormTemplate,
        layout: FormLayout,
        narrative: NarrativeLayout,
    ) -> Result<Self, PdfFormError> {
        template.check_layout(&layout)?;
        Ok(Self {
            template,
            layout,
            narrative,
        })
    }

    pub fn slot_count(&self) -> usize {
        self.layout.slot_count()
    }

    /// Reject submissions that name more individuals than the form holds
    pub fn check_capacity(&self, submission: &ValidSubmission) -> Result<(), PdfFormError> {
        let given = submission.individuals().len();
        let slots = self.slot_count();
        if given > slots {
            return Err(PdfFormError::TooManyIndividuals { given, slots });
        }
        Ok(())
    }

    /// Fill a fresh copy of the template and serialize it
    pub fn populate(&self, content: &ReportContent<'_>) -> Result<Vec<u8>, PdfFormError> {
        self.check_capacity(content.submission)?;
        let mut form = self.template.open()?;

        self.write_checkboxes(&mut form, content.flags)?;
        self.write_text_fields(&mut form, content)?;

        let narrative = self.narrative.format(content.narrative);
        form.set_text(
            &self.layout.narrative_field,
            &narrative,
            self.layout.narrative_font_size,
        )?;

        debug!(
            checked = content.flags.count(),
            individuals = content.submission.individuals().len(),
            narrative_chars = narrative.chars().count(),
            "Populated report form"
        );
        form.save()
    }

    fn write_checkboxes(
        &self,
        form: &mut FormDocument,
        flags: ChecklistFlags,
    ) -> Result<(), PdfFormError> {
        for binding in &self.layout.checkboxes {
            form.set_checkbox(&binding.field, flags.get(binding.item))?;
        }
        Ok(())
    }

    fn write_text_fields(
        &self,
        form: &mut FormDocument,
        content: &ReportContent<'_>,
    ) -> Result<(), PdfFormError> {
        let layout = &self.layout;
        let submission = content.submission;

        for fixed in &layout.fixed {
            form.set_text(&fixed.name, &fixed.value, None)?;
        }

        let officer = [
            (&layout.officer.name, submission.officer_name()),
            (&layout.officer.badge, submission.badge_number()),
            (&layout.officer.area, submission.assigned_area()),
        ];
        for (field, value) in officer {
            if let Some(field) = field {
                form.set_text(field, value, None)?;
            }
        }

        form.set_text(&layout.date_field, &format_report_date(content.date), None)?;
        form.set_text(
            &layout.time_field,
            &submission.incident_time().to_12_hour(),
            None,
        )?;

        let individuals = submission.individuals();
        for (index, slot) in layout.individuals.iter().enumerate() {
            let (name, id) = individuals
                .get(index)
                .map(|i| (i.name.as_str(), i.id.as_str()))
                .unwrap_or(("", ""));
            form.set_text(&slot.name_field, name, None)?;
            form.set_text(&slot.id_field, id, None)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::blank_form;
    use crate::layout::FixedField;
    use incident_core::{ChecklistItem, Individual, Submission, YesNo};
    use pretty_assertions::assert_eq;

    fn submission(inmates: Vec<Individual>) -> ValidSubmission {
        Submission {
            officer_name: "Jordan Reyes".into(),
            badge_number: "4471".into(),
            assigned_area: "Housing Unit B".into(),
            incident_time: "14:30".into(),
            incident_details: "Two inmates were fighting in the dayroom.".into(),
            healthcare: YesNo::Yes,
            inmates,
            ..Default::default()
        }
        .validate()
        .unwrap()
    }

    fn populator(layout: FormLayout, narrative: NarrativeLayout) -> FormPopulator {
        let template = FormTemplate::from_bytes(blank_form(&layout)).unwrap();
        FormPopulator::new(template, layout, narrative).unwrap()
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 4).unwrap()
    }

    #[test]
    fn test_populate_writes_every_field() {
        let mut layout = FormLayout::default();
        layout.officer.name = Some("Officer Name".into());
        layout.fixed.push(FixedField {
            name: "Facility".into(),
            value: "North Unit".into(),
        });
        let populator = populator(layout, NarrativeLayout::default());

        let sub = submission(vec![
            Individual::new("John Doe", "A1001"),
            Individual::new("Sam Roe", "A1002"),
        ]);
        let mut flags = ChecklistFlags::default();
        flags.set(ChecklistItem::Weapon, true);
        flags.set(ChecklistItem::Media, true);

        let bytes = populator
            .populate(&ReportContent {
                submission: &sub,
                date: date(),
                flags,
                narrative: "On Tuesday I was\nassigned to Housing Unit B.",
            })
            .unwrap();
        let form = FormDocument::load_mem(&bytes).unwrap();

        assert_eq!(form.text_value("Date").as_deref(), Some("Tuesday, March 4th, 2025"));
        assert_eq!(form.text_value("Time").as_deref(), Some("2:30 PM"));
        assert_eq!(form.text_value("Officer Name").as_deref(), Some("Jordan Reyes"));
        assert_eq!(form.text_value("Facility").as_deref(), Some("North Unit"));
        assert_eq!(form.text_value("Inmate Name 1").as_deref(), Some("John Doe"));
        assert_eq!(form.text_value("Inmate Number 2").as_deref(), Some("A1002"));
        assert_eq!(form.text_value("Inmate Name 3").as_deref(), Some(""));
        assert_eq!(
            form.text_value("Narrative").as_deref(),
            Some("On Tuesday I was assigned to Housing Unit B.")
        );
        assert_eq!(form.font_size("Narrative"), Some(9.0));

        assert_eq!(form.is_checked("Weapon"), Some(true));
        assert_eq!(form.is_checked("Media"), Some(true));
        assert_eq!(form.is_checked("Arrests"), Some(false));
    }

    #[test]
    fn test_injury_checkbox_follows_flag_not_healthcare_answer() {
        let populator = populator(FormLayout::default(), NarrativeLayout::default());
        // healthcare is "yes" on this submission, the model said no injury
        let sub = submission(vec![Individual::new("John Doe", "A1001")]);
        let bytes = populator
            .populate(&ReportContent {
                submission: &sub,
                date: date(),
                flags: ChecklistFlags::default(),
                narrative: "Narrative.",
            })
            .unwrap();
        let form = FormDocument::load_mem(&bytes).unwrap();
        assert_eq!(form.is_checked("Injury Hospitalization"), Some(false));
    }

    #[test]
    fn test_narrative_is_wrapped_and_truncated() {
        let populator = populator(FormLayout::default(), NarrativeLayout::new(2, 11));
        let sub = submission(vec![Individual::new("John Doe", "A1001")]);
        let bytes = populator
            .populate(&ReportContent {
                submission: &sub,
                date: date(),
                flags: ChecklistFlags::default(),
                narrative: "one   two\n\nthree four five",
            })
            .unwrap();
        let form = FormDocument::load_mem(&bytes).unwrap();
        assert_eq!(form.text_value("Narrative").as_deref(), Some("one two\nthr"));
    }

    #[test]
    fn test_too_many_individuals_rejected() {
        let populator = populator(FormLayout::default(), NarrativeLayout::default());
        let sub = submission(
            (1..=4)
                .map(|n| Individual::new(format!("Person {}", n), format!("A{}", n)))
                .collect(),
        );
        assert!(matches!(
            populator.check_capacity(&sub),
            Err(PdfFormError::TooManyIndividuals { given: 4, slots: 3 })
        ));
        assert!(populator
            .populate(&ReportContent {
                submission: &sub,
                date: date(),
                flags: ChecklistFlags::default(),
                narrative: "",
            })
            .is_err());
    }

    #[test]
    fn test_new_rejects_template_without_layout_fields() {
        let mut layout = FormLayout::default();
        let template = FormTemplate::from_bytes(blank_form(&layout)).unwrap();
        layout.narrative_field = "Statement".into();
        assert!(matches!(
            FormPopulator::new(template, layout, NarrativeLayout::default()),
            Err(PdfFormError::FieldNotFound(name)) if name == "Statement"
        ));
    }
}
