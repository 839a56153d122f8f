//! Interactive form (AcroForm) access on a loaded PDF
//!
//! Fields are indexed by fully-qualified name ("Parent.Child") when the
//! document is opened. Writes go through [`FormDocument::set_text`] and
//! [`FormDocument::set_checkbox`]; unknown names are errors.

use std::collections::BTreeMap;
use std::fmt;

use lopdf::{Dictionary, Document, Object, ObjectId, StringFormat};

use crate::error::PdfFormError;

const MAX_FIELD_DEPTH: usize = 32;
const FF_RADIO: i64 = 1 << 15;
const FF_PUSHBUTTON: i64 = 1 << 16;

/// What a named field accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Checkbox,
    /// Radio groups, push buttons, choice and signature fields
    Other,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Text => write!(f, "text"),
            FieldKind::Checkbox => write!(f, "checkbox"),
            FieldKind::Other => write!(f, "non-fillable"),
        }
    }
}

#[derive(Debug, Clone)]
struct FieldEntry {
    id: ObjectId,
    kind: FieldKind,
    /// Widget annotations; the field itself when they are merged
    widgets: Vec<ObjectId>,
}

#[derive(Clone, Copy, Default)]
struct Inherited<'a> {
    ft: Option<&'a [u8]>,
    ff: i64,
}

/// Decode a PDF text string (UTF-16BE with BOM, else PDFDocEncoding)
pub(crate) fn decode_text(bytes: &[u8]) -> String {
    if let Some(rest) = bytes.strip_prefix(&[0xFE, 0xFF]) {
        let units: Vec<u16> = rest
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        bytes.iter().map(|b| *b as char).collect()
    }
}

/// Encode a value as a PDF text string
pub(crate) fn encode_text(value: &str) -> Object {
    if value.is_ascii() {
        Object::String(value.as_bytes().to_vec(), StringFormat::Literal)
    } else {
        let mut bytes = vec![0xFE, 0xFF];
        for unit in value.encode_utf16() {
            bytes.extend_from_slice(&unit.to_be_bytes());
        }
        Object::String(bytes, StringFormat::Hexadecimal)
    }
}

/// Replace the size operand of `Tf` in a default appearance string
pub(crate) fn with_font_size(da: Option<&str>, size: f32) -> String {
    if let Some(da) = da {
        let mut tokens: Vec<String> = da.split_whitespace().map(str::to_string).collect();
        if let Some(pos) = tokens.iter().position(|t| t == "Tf") {
            if pos >= 2 {
                tokens[pos - 1] = size.to_string();
                return tokens.join(" ");
            }
        }
    }
    format!("/Helv {} Tf 0 g", size)
}

fn font_size_of(da: &str) -> Option<f32> {
    let tokens: Vec<&str> = da.split_whitespace().collect();
    let pos = tokens.iter().position(|t| *t == "Tf")?;
    tokens.get(pos.checked_sub(1)?)?.parse().ok()
}

fn resolve<'a>(doc: &'a Document, obj: &'a Object) -> Result<&'a Object, PdfFormError> {
    match obj {
        Object::Reference(id) => Ok(doc.get_object(*id)?),
        other => Ok(other),
    }
}

fn string_value(dict: &Dictionary, key: &[u8]) -> Option<String> {
    match dict.get(key) {
        Ok(Object::String(bytes, _)) => Some(decode_text(bytes)),
        _ => None,
    }
}

fn acroform_dict(doc: &Document) -> Result<&Dictionary, PdfFormError> {
    let root = doc.trailer.get(b"Root").and_then(Object::as_reference)?;
    let catalog = doc.get_object(root).and_then(Object::as_dict)?;
    let acroform = catalog
        .get(b"AcroForm")
        .map_err(|_| PdfFormError::NoAcroForm)?;
    resolve(doc, acroform)?
        .as_dict()
        .map_err(|_| PdfFormError::NoAcroForm)
}

fn kind_of(ft: Option<&[u8]>, ff: i64) -> FieldKind {
    match ft {
        Some(b"Tx") => FieldKind::Text,
        Some(b"Btn") if ff & (FF_RADIO | FF_PUSHBUTTON) == 0 => FieldKind::Checkbox,
        _ => FieldKind::Other,
    }
}

fn walk_field<'a>(
    doc: &'a Document,
    id: ObjectId,
    prefix: Option<&str>,
    inherited: Inherited<'a>,
    depth: usize,
    out: &mut BTreeMap<String, FieldEntry>,
) -> Result<(), PdfFormError> {
    if depth > MAX_FIELD_DEPTH {
        return Err(PdfFormError::ParseError("form field tree too deep".into()));
    }
    let dict = doc.get_object(id).and_then(Object::as_dict)?;

    let name = match (prefix, string_value(dict, b"T")) {
        (Some(parent), Some(partial)) => format!("{}.{}", parent, partial),
        (None, Some(partial)) => partial,
        (Some(parent), None) => parent.to_string(),
        // A bare widget in /Fields carries no name to address it by
        (None, None) => return Ok(()),
    };

    let inherited = Inherited {
        ft: match dict.get(b"FT") {
            Ok(Object::Name(ft)) => Some(ft.as_slice()),
            _ => inherited.ft,
        },
        ff: match dict.get(b"Ff") {
            Ok(Object::Integer(ff)) => *ff,
            _ => inherited.ff,
        },
    };

    let kids: Vec<ObjectId> = match dict.get(b"Kids") {
        Ok(obj) => resolve(doc, obj)?
            .as_array()?
            .iter()
            .filter_map(|kid| kid.as_reference().ok())
            .collect(),
        Err(_) => Vec::new(),
    };

    let mut widgets = Vec::new();
    let mut has_child_fields = false;
    for kid in kids {
        let kid_dict = doc.get_object(kid).and_then(Object::as_dict)?;
        if kid_dict.has(b"T") {
            has_child_fields = true;
            walk_field(doc, kid, Some(&name), inherited, depth + 1, out)?;
        } else {
            widgets.push(kid);
        }
    }

    if !has_child_fields {
        if widgets.is_empty() {
            widgets.push(id);
        }
        out.insert(
            name,
            FieldEntry {
                id,
                kind: kind_of(inherited.ft, inherited.ff),
                widgets,
            },
        );
    }
    Ok(())
}

fn index_fields(doc: &Document) -> Result<BTreeMap<String, FieldEntry>, PdfFormError> {
    let acroform = acroform_dict(doc)?;
    let roots: Vec<ObjectId> = match acroform.get(b"Fields") {
        Ok(obj) => resolve(doc, obj)?
            .as_array()?
            .iter()
            .filter_map(|f| f.as_reference().ok())
            .collect(),
        Err(_) => Vec::new(),
    };

    let mut out = BTreeMap::new();
    for root in roots {
        walk_field(doc, root, None, Inherited::default(), 0, &mut out)?;
    }
    Ok(out)
}

/// A parsed PDF with its form fields indexed by name
pub struct FormDocument {
    doc: Document,
    fields: BTreeMap<String, FieldEntry>,
    needs_appearances: bool,
}

impl FormDocument {
    pub fn load_mem(bytes: &[u8]) -> Result<Self, PdfFormError> {
        let doc =
            Document::load_mem(bytes).map_err(|e| PdfFormError::ParseError(e.to_string()))?;
        let fields = index_fields(&doc)?;
        Ok(Self {
            doc,
            fields,
            needs_appearances: false,
        })
    }

    pub fn field_kinds(&self) -> BTreeMap<String, FieldKind> {
        self.fields
            .iter()
            .map(|(name, entry)| (name.clone(), entry.kind))
            .collect()
    }

    pub fn field_kind(&self, name: &str) -> Option<FieldKind> {
        self.fields.get(name).map(|entry| entry.kind)
    }

    fn entry(&self, name: &str, expected: FieldKind) -> Result<FieldEntry, PdfFormError> {
        let entry = self
            .fields
            .get(name)
            .ok_or_else(|| PdfFormError::FieldNotFound(name.to_string()))?;
        if entry.kind != expected {
            return Err(PdfFormError::WrongFieldKind {
                name: name.to_string(),
                expected,
                found: entry.kind,
            });
        }
        Ok(entry.clone())
    }

    fn form_default_appearance(&self) -> Option<String> {
        acroform_dict(&self.doc)
            .ok()
            .and_then(|form| string_value(form, b"DA"))
    }

    /// Write a text value, optionally forcing the font size
    pub fn set_text(
        &mut self,
        name: &str,
        value: &str,
        font_size: Option<f32>,
    ) -> Result<(), PdfFormError> {
        let entry = self.entry(name, FieldKind::Text)?;
        let form_da = self.form_default_appearance();

        let field = self
            .doc
            .get_object_mut(entry.id)
            .and_then(Object::as_dict_mut)?;
        field.set("V", encode_text(value));

        let new_da = match font_size {
            Some(size) => {
                let current = string_value(field, b"DA").or(form_da);
                Some(with_font_size(current.as_deref(), size))
            }
            None => None,
        };
        if let Some(da) = &new_da {
            field.set(
                "DA",
                Object::String(da.as_bytes().to_vec(), StringFormat::Literal),
            );
        }

        // Stale appearance streams would still show the template's value
        for widget in &entry.widgets {
            let dict = self
                .doc
                .get_object_mut(*widget)
                .and_then(Object::as_dict_mut)?;
            dict.remove(b"AP");
            if let Some(da) = &new_da {
                if dict.has(b"DA") {
                    dict.set(
                        "DA",
                        Object::String(da.as_bytes().to_vec(), StringFormat::Literal),
                    );
                }
            }
        }
        self.needs_appearances = true;
        Ok(())
    }

    /// Name of the "on" appearance state, `Yes` when the widget has none
    fn on_state(&self, entry: &FieldEntry) -> Vec<u8> {
        entry
            .widgets
            .iter()
            .find_map(|widget| {
                let dict = self.doc.get_object(*widget).and_then(Object::as_dict).ok()?;
                let ap = resolve(&self.doc, dict.get(b"AP").ok()?)
                    .ok()?
                    .as_dict()
                    .ok()?;
                let normal = resolve(&self.doc, ap.get(b"N").ok()?)
                    .ok()?
                    .as_dict()
                    .ok()?;
                normal
                    .iter()
                    .map(|(key, _)| key)
                    .find(|key| key.as_slice() != b"Off")
                    .cloned()
            })
            .unwrap_or_else(|| b"Yes".to_vec())
    }

    pub fn set_checkbox(&mut self, name: &str, checked: bool) -> Result<(), PdfFormError> {
        let entry = self.entry(name, FieldKind::Checkbox)?;
        let state = if checked {
            self.on_state(&entry)
        } else {
            b"Off".to_vec()
        };

        let field = self
            .doc
            .get_object_mut(entry.id)
            .and_then(Object::as_dict_mut)?;
        field.set("V", Object::Name(state.clone()));

        for widget in &entry.widgets {
            let dict = self
                .doc
                .get_object_mut(*widget)
                .and_then(Object::as_dict_mut)?;
            dict.set("AS", Object::Name(state.clone()));
        }
        Ok(())
    }

    fn field_dict(&self, name: &str) -> Option<&Dictionary> {
        let entry = self.fields.get(name)?;
        self.doc.get_object(entry.id).and_then(Object::as_dict).ok()
    }

    /// Current value of a text field
    pub fn text_value(&self, name: &str) -> Option<String> {
        string_value(self.field_dict(name)?, b"V")
    }

    /// Font size from the field's default appearance
    pub fn font_size(&self, name: &str) -> Option<f32> {
        font_size_of(&string_value(self.field_dict(name)?, b"DA")?)
    }

    /// Whether a checkbox is on; `None` for unknown fields
    pub fn is_checked(&self, name: &str) -> Option<bool> {
        match self.field_dict(name)?.get(b"V") {
            Ok(Object::Name(state)) => Some(state.as_slice() != b"Off"),
            _ => Some(false),
        }
    }

    fn mark_need_appearances(&mut self) -> Result<(), PdfFormError> {
        let root = self
            .doc
            .trailer
            .get(b"Root")
            .and_then(Object::as_reference)?;
        let acroform_id = match self
            .doc
            .get_object(root)
            .and_then(Object::as_dict)?
            .get(b"AcroForm")
        {
            Ok(Object::Reference(id)) => Some(*id),
            _ => None,
        };
        let acroform = match acroform_id {
            Some(id) => self.doc.get_object_mut(id).and_then(Object::as_dict_mut)?,
            None => self
                .doc
                .get_object_mut(root)
                .and_then(Object::as_dict_mut)?
                .get_mut(b"AcroForm")
                .and_then(Object::as_dict_mut)?,
        };
        acroform.set("NeedAppearances", Object::Boolean(true));
        Ok(())
    }

    /// Serialize the document with all writes applied
    pub fn save(mut self) -> Result<Vec<u8>, PdfFormError> {
        if self.needs_appearances {
            self.mark_need_appearances()?;
        }
        let mut output = Vec::new();
        self.doc
            .save_to(&mut output)
            .map_err(|e| PdfFormError::OperationError(e.to_string()))?;
        Ok(output)
    }
}
