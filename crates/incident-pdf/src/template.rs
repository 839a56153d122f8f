//! The blank report template, loaded once at startup

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::error::PdfFormError;
use crate::form::{FieldKind, FormDocument};
use crate::layout::FormLayout;

/// Template bytes plus the field index taken when it was loaded
///
/// Each request opens its own [`FormDocument`] from the bytes, so one
/// template is shared read-only by concurrent requests.
#[derive(Debug, Clone)]
pub struct FormTemplate {
    bytes: Vec<u8>,
    fields: BTreeMap<String, FieldKind>,
}

impl FormTemplate {
    pub fn load(path: &Path) -> Result<Self, PdfFormError> {
        if !path.is_file() {
            return Err(PdfFormError::TemplateMissing(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let template = Self::from_bytes(bytes)?;
        info!(
            path = %path.display(),
            fields = template.fields.len(),
            "Loaded report template"
        );
        Ok(template)
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Result<Self, PdfFormError> {
        let fields = FormDocument::load_mem(&bytes)?.field_kinds();
        Ok(Self { bytes, fields })
    }

    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).copied()
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// A fresh editable copy of the template
    pub fn open(&self) -> Result<FormDocument, PdfFormError> {
        FormDocument::load_mem(&self.bytes)
    }

    /// Every field the layout writes must exist with the right kind
    pub fn check_layout(&self, layout: &FormLayout) -> Result<(), PdfFormError> {
        layout.validate()?;
        for (name, expected) in layout.expected_fields() {
            match self.field_kind(&name) {
                None => {
                    warn!(
                        field = %name,
                        available = ?self.field_names().collect::<Vec<_>>(),
                        "Layout field missing from template"
                    );
                    return Err(PdfFormError::FieldNotFound(name));
                }
                Some(found) if found != expected => {
                    return Err(PdfFormError::WrongFieldKind {
                        name,
                        expected,
                        found,
                    })
                }
                Some(_) => debug!(field = %name, kind = %expected, "Layout field present"),
            }
        }
        Ok(())
    }
}
