//! Incident report PDF filling
//!
//! - `layout`: which template fields receive which report data
//! - `template`: the blank template and its field index
//! - `form`: AcroForm field lookup and value writes on one document
//! - `populate`: writes a whole report onto a fresh copy of the template

pub mod error;
pub mod form;
pub mod layout;
pub mod populate;
pub mod template;

#[cfg(any(test, feature = "test-support"))]
pub mod fixture;

pub use error::PdfFormError;
pub use form::{FieldKind, FormDocument};
pub use layout::{CheckboxBinding, FixedField, FormLayout, IndividualSlot, OfficerFields};
pub use populate::{FormPopulator, ReportContent};
pub use template::FormTemplate;
