//! Wikipedia articles.
//!
//! Short forms: `wikipedia: Ludwig_van_Beethoven` or
//! `wikipedia: en:Ludwig_van_Beethoven`.

use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use super::{int_field, str_field, tex, DefaultValue, FieldSpec, FieldType, MasterIcon, MasterSpec};
use crate::error::Result;

pub const DEFAULT_LANGUAGE: &str = "de";

static LANGUAGE_PREFIX_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-z]+):(.+)$").unwrap());

static LANGUAGE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z]{2,3}$").unwrap());

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("title", "The title of the article, e.g. `Ludwig_van_Beethoven`.")
        .types(&[FieldType::String])
        .required(),
    FieldSpec::new("language", "The language code of the article, e.g. `de` or `en`.")
        .types(&[FieldType::String])
        .default_value(DefaultValue::Str(DEFAULT_LANGUAGE))
        .validate(is_language),
    FieldSpec::new("oldid", "Use an old revision of the article.").types(&[FieldType::Integer]),
];

fn is_language(value: &Value) -> bool {
    value.as_str().is_some_and(|code| LANGUAGE_REGEX.is_match(code))
}

/// `de:Ludwig_van_Beethoven` or `de:Ludwig_van_Beethoven:123`
pub fn format_wikipedia_id(title: &str, language: &str, oldid: Option<i64>) -> String {
    match oldid {
        Some(oldid) => format!("{}:{}:{}", language, title, oldid),
        None => format!("{}:{}", language, title),
    }
}

pub fn format_url(title: &str, language: &str, oldid: Option<i64>) -> String {
    let title = title.replace(' ', "_");
    let oldid = oldid.map(|id| format!("&oldid={}", id)).unwrap_or_default();
    format!(
        "https://{}.wikipedia.org/w/index.php?title={}&redirect=no{}",
        language, title, oldid
    )
}

pub struct WikipediaMaster;

impl MasterSpec for WikipediaMaster {
    fn name(&self) -> &'static str {
        "wikipedia"
    }

    fn display_name(&self) -> &'static str {
        "Wikipedia"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("wikipedia", "black").symbol("⚪")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn normalize_fields_input(&self, raw: Value) -> Result<Value> {
        let Value::String(spec) = raw else {
            return Ok(raw);
        };

        let mut fields = Mapping::new();
        match LANGUAGE_PREFIX_REGEX.captures(&spec) {
            Some(caps) => {
                fields.insert(Value::from("title"), Value::from(&caps[2]));
                fields.insert(Value::from("language"), Value::from(&caps[1]));
            }
            None => {
                fields.insert(Value::from("title"), Value::from(spec.as_str()));
            }
        }
        Ok(Value::Mapping(fields))
    }

    fn collect_fields_on_instantiation(&self, mut fields: Mapping) -> Result<Mapping> {
        let title = str_field(&fields, "title").unwrap_or_default().to_string();
        let language = str_field(&fields, "language")
            .unwrap_or(DEFAULT_LANGUAGE)
            .to_string();
        let oldid = int_field(&fields, "oldid");

        fields.insert(
            Value::from("wikipediaId"),
            Value::from(format_wikipedia_id(&title, &language, oldid)),
        );
        fields.insert(
            Value::from("url"),
            Value::from(format_url(&title, &language, oldid)),
        );
        Ok(fields)
    }

    fn derive_title_from_fields(&self, fields: &Mapping) -> Option<String> {
        str_field(fields, "title").map(|title| title.replace('_', " "))
    }

    fn derive_plain_text_from_fields(&self, fields: &Mapping) -> Option<String> {
        self.derive_title_from_fields(fields)
    }

    fn generate_markup(&self, fields: &Mapping) -> Option<String> {
        str_field(fields, "url").map(|url| tex::cmd("url", url))
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
            .get("wikipedia")
            .unwrap()
            .initialize_fields(Some(raw), &MarkdownConverter::new())
            .unwrap()
            .fields
    }

    #[test]
    fn test_short_form_with_language() {
        let fields = initialize("en:Ludwig_van_Beethoven");
        assert_eq!(str_field(&fields, "title"), Some("Ludwig_van_Beethoven"));
        assert_eq!(str_field(&fields, "language"), Some("en"));
        assert_eq!(
            str_field(&fields, "url"),
            Some("https://en.wikipedia.org/w/index.php?title=Ludwig_van_Beethoven&redirect=no")
        );
    }

    #[test]
    fn test_default_language_and_oldid() {
        let fields = initialize("{ title: Wolfgang Amadeus Mozart, oldid: 42 }");
        assert_eq!(str_field(&fields, "language"), Some("de"));
        assert_eq!(
            str_field(&fields, "wikipediaId"),
            Some("de:Wolfgang Amadeus Mozart:42")
        );
        assert!(str_field(&fields, "url").unwrap().ends_with("&oldid=42"));
        assert_eq!(
            WikipediaMaster.derive_title_from_fields(&fields),
            Some("Wolfgang Amadeus Mozart".to_string())
        );
    }

    #[test]
    fn test_invalid_language() {
        let raw: Value = serde_yaml::from_str("{ title: Mozart, language: German }").unwrap();
        let result = registry()
            .get("wikipedia")
            .unwrap()
            .initialize_fields(Some(raw), &MarkdownConverter::new());
        assert!(result.is_err());
    }
}
