//! Generated blank forms for tests
//!
//! Builds a one-page PDF whose AcroForm holds exactly the requested fields,
//! so tests do not depend on the real template file.

use lopdf::{dictionary, Document, Object, Stream, StringFormat};

use crate::form::FieldKind;
use crate::layout::FormLayout;

/// A blank form with every field the layout writes
pub fn blank_form(layout: &FormLayout) -> Vec<u8> {
    blank_form_with_fields(&layout.expected_fields())
}

pub fn blank_form_with_fields(fields: &[(String, FieldKind)]) -> Vec<u8> {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();
    let page_id = doc.new_object_id();

    let mut field_refs = Vec::with_capacity(fields.len());
    for (index, (name, kind)) in fields.iter().enumerate() {
        let y = 750 - (index as i64 % 30) * 24;
        let mut widget = dictionary! {
            "Type" => "Annot",
            "Subtype" => "Widget",
            "T" => Object::String(name.as_bytes().to_vec(), StringFormat::Literal),
            "Rect" => vec![50.into(), y.into(), 300.into(), (y + 18).into()],
            "P" => page_id,
            "F" => 4,
        };
        match kind {
            FieldKind::Text => {
                widget.set("FT", "Tx");
                widget.set(
                    "DA",
                    Object::String(b"/Helv 12 Tf 0 g".to_vec(), StringFormat::Literal),
                );
            }
            FieldKind::Checkbox => {
                let on = doc.add_object(Stream::new(dictionary! {}, b"0 g 0 0 10 10 re f".to_vec()));
                let off = doc.add_object(Stream::new(dictionary! {}, Vec::new()));
                widget.set("FT", "Btn");
                widget.set("V", "Off");
                widget.set("AS", "Off");
                widget.set("AP", dictionary! { "N" => dictionary! { "Yes" => on, "Off" => off } });
            }
            FieldKind::Other => {
                widget.set("FT", "Btn");
                widget.set("Ff", 1 << 16);
            }
        }
        field_refs.push(Object::Reference(doc.add_object(widget)));
    }

    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Annots" => field_refs.clone(),
        }),
    );
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![Object::Reference(page_id)],
            "Count" => 1,
        }),
    );
    let acroform_id = doc.add_object(dictionary! {
        "Fields" => field_refs,
        "DA" => Object::String(b"/Helv 0 Tf 0 g".to_vec(), StringFormat::Literal),
    });
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
        "AcroForm" => acroform_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).expect("in-memory PDF write");
    buffer
}
