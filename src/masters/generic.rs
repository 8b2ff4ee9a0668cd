//! The generic master: text split into one chunk per step.

use serde_yaml::{Mapping, Value};

use super::{bool_field, int_field, tex, DefaultValue, FieldSpec, FieldType, MasterIcon, MasterSpec};
use crate::core::text::{html_to_plain_text, shorten_text, split_by_hr, split_html_into_chunks};
use crate::domain::StepCollector;
use crate::error::Result;

/// Characters shown on one step before the text is split.
pub const CHARACTERS_ON_SLIDE: i64 = 400;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("markup", "Markup in HTML or Markdown, a string or a list of strings.")
        .types(&[FieldType::String, FieldType::Sequence])
        .required()
        .markup()
        .inline_markup(),
    FieldSpec::new("charactersOnSlide", "How many characters a step shows.")
        .types(&[FieldType::Integer])
        .default_value(DefaultValue::Integer(CHARACTERS_ON_SLIDE))
        .validate(is_positive),
    FieldSpec::new("onOne", "Show all markup on one step.")
        .types(&[FieldType::Boolean])
        .default_value(DefaultValue::Bool(false)),
];

fn is_positive(value: &Value) -> bool {
    value.as_i64().is_some_and(|n| n > 0)
}

/// The markup chunks of normalized fields.
fn chunks(fields: &Mapping) -> Vec<&str> {
    match fields.get("markup") {
        Some(Value::Sequence(items)) => items.iter().filter_map(Value::as_str).collect(),
        Some(Value::String(text)) => vec![text.as_str()],
        _ => Vec::new(),
    }
}

pub struct GenericMaster;

impl MasterSpec for GenericMaster {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn display_name(&self) -> &'static str {
        "Folie"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("file-presentation-box", "gray").hidden()
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn short_form_field(&self) -> Option<&'static str> {
        Some("markup")
    }

    fn normalize_fields_input(&self, raw: Value) -> Result<Value> {
        let mut fields = match raw {
            Value::Sequence(_) => {
                let mut fields = Mapping::new();
                fields.insert(Value::from("markup"), raw);
                fields
            }
            Value::Mapping(fields) => fields,
            other => return Ok(other),
        };

        if let Some(Value::String(text)) = fields.get("markup") {
            let markup = Value::Sequence(vec![Value::from(text.as_str())]);
            fields.insert(Value::from("markup"), markup);
        }
        Ok(Value::Mapping(fields))
    }

    fn collect_fields_on_instantiation(&self, mut fields: Mapping) -> Result<Mapping> {
        let max_chars = int_field(&fields, "charactersOnSlide").unwrap_or(CHARACTERS_ON_SLIDE);
        let max_chars = usize::try_from(max_chars).unwrap_or(usize::MAX);

        let mut markup = Vec::new();
        for html in chunks(&fields) {
            for part in split_by_hr(html) {
                for chunk in split_html_into_chunks(&part, max_chars) {
                    if !chunk.trim().is_empty() {
                        markup.push(chunk.trim().to_string());
                    }
                }
            }
        }

        if bool_field(&fields, "onOne") {
            markup = vec![markup.join("\n")];
        }

        fields.insert(
            Value::from("markup"),
            Value::Sequence(markup.into_iter().map(Value::from).collect()),
        );
        Ok(fields)
    }

    fn collect_steps_on_instantiation(&self, fields: &Mapping, steps: &mut StepCollector) {
        let chunks = chunks(fields);
        if chunks.len() < 2 {
            return;
        }
        for chunk in chunks {
            steps.add(shorten_text(chunk, 40));
        }
    }

    fn derive_plain_text_from_fields(&self, fields: &Mapping) -> Option<String> {
        let texts: Vec<String> = chunks(fields)
            .into_iter()
            .map(html_to_plain_text)
            .filter(|text| !text.is_empty())
            .collect();
        (!texts.is_empty()).then(|| texts.join(" | "))
    }

    fn generate_markup(&self, fields: &Mapping) -> Option<String> {
        let paragraphs: Vec<String> = chunks(fields).into_iter().map(tex::from_html).collect();
        Some(paragraphs.join("\n\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MarkdownConverter;
    use crate::masters::registry;

    fn initialize(yaml: &str) -> Mapping {
        let raw: Value = serde_yaml::from_str(yaml).unwrap();
        registry()
            .get("generic")
            .unwrap()
            .initialize_fields(Some(raw), &MarkdownConverter::new())
            .unwrap()
            .fields
    }

    #[test]
    fn test_short_form_becomes_list() {
        let fields = initialize("Hello");
        assert_eq!(chunks(&fields), vec!["Hello"]);
        assert_eq!(fields.get("charactersOnSlide"), Some(&Value::from(400)));
    }

    #[test]
    fn test_list_input() {
        let fields = initialize("[one, two]");
        assert_eq!(chunks(&fields), vec!["one", "two"]);

        let mut steps = StepCollector::new();
        GenericMaster.collect_steps_on_instantiation(&fields, &mut steps);
        assert_eq!(steps.len(), 2);
        assert_eq!(steps.steps()[0].title, "one");
    }

    #[test]
    fn test_split_by_horizontal_rule() {
        let fields = initialize("{ markup: \"First\\n\\n---\\n\\nSecond\" }");
        assert_eq!(chunks(&fields), vec!["<p>First</p>", "<p>Second</p>"]);
    }

    #[test]
    fn test_on_one() {
        let fields = initialize("{ markup: [one, two], onOne: true }");
        assert_eq!(chunks(&fields), vec!["one\ntwo"]);
    }

    #[test]
    fn test_characters_on_slide_must_be_positive() {
        let raw: Value = serde_yaml::from_str("{ markup: a, charactersOnSlide: 0 }").unwrap();
        let result = registry()
            .get("generic")
            .unwrap()
            .initialize_fields(Some(raw), &MarkdownConverter::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_plain_text() {
        let fields = initialize("['**a**', b]");
        assert_eq!(
            GenericMaster.derive_plain_text_from_fields(&fields),
            Some("a | b".to_string())
        );
    }
}
