//! Quotations with author, date and source.

use serde_yaml::{Mapping, Value};

use super::{str_field, tex, FieldSpec, FieldType, MasterIcon, MasterSpec};

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("text", "The quoted text.")
        .types(&[FieldType::String])
        .required()
        .markup()
        .inline_markup(),
    FieldSpec::new("author", "The author of the quote.").types(&[FieldType::String]),
    FieldSpec::new("date", "When the quote was written or spoken.")
        .types(&[FieldType::String, FieldType::Number]),
    FieldSpec::new("source", "Where the quote was found.")
        .types(&[FieldType::String])
        .markup(),
    FieldSpec::new("prolog", "Text shown before the quote.")
        .types(&[FieldType::String])
        .markup()
        .inline_markup(),
    FieldSpec::new("epilog", "Text shown after the quote.")
        .types(&[FieldType::String])
        .markup()
        .inline_markup(),
];

pub struct QuoteMaster;

impl MasterSpec for QuoteMaster {
    fn name(&self) -> &'static str {
        "quote"
    }

    fn display_name(&self) -> &'static str {
        "Zitat"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("quote", "brown").symbol("💬")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn short_form_field(&self) -> Option<&'static str> {
        Some("text")
    }

    fn derive_title_from_fields(&self, fields: &Mapping) -> Option<String> {
        str_field(fields, "author").map(|author| format!("Zitat von „{}“", author))
    }

    fn derive_plain_text_from_fields(&self, fields: &Mapping) -> Option<String> {
        let mut output = str_field(fields, "text")?.to_string();
        if let Some(author) = str_field(fields, "author") {
            output = format!("{} | {}", output, author);
        }
        Some(output)
    }

    fn generate_markup(&self, fields: &Mapping) -> Option<String> {
        let mut markup = tex::environment("quote", &tex::from_html(str_field(fields, "text")?));
        let mut attribution = Vec::new();
        if let Some(author) = str_field(fields, "author") {
            attribution.push(tex::escape(author));
        }
        match fields.get("date") {
            Some(Value::String(date)) => attribution.push(tex::escape(date)),
            Some(Value::Number(date)) => attribution.push(date.to_string()),
            _ => {}
        }
        if !attribution.is_empty() {
            markup.push_str(&format!("\n\n{}", tex::cmd("textit", &attribution.join(", "))));
        }
        Some(markup)
    }
}
