//! Count from one to a number, one step per number.

use serde_yaml::{Mapping, Value};

use super::{int_field, str_field, DefaultValue, FieldSpec, FieldType, MasterIcon, MasterSpec};
use crate::domain::StepCollector;
use crate::error::Result;

pub const MAX_COUNT: i64 = 100;

const FORMATS: &[&str] = &["arabic", "lower", "upper", "roman"];

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("to", "Count up to this number (at most 100).")
        .types(&[FieldType::Integer])
        .required()
        .validate(is_count),
    FieldSpec::new("format", "arabic, lower (a, b, c), upper (A, B, C) or roman.")
        .types(&[FieldType::String])
        .default_value(DefaultValue::Str("arabic"))
        .validate(is_format),
];

fn is_count(value: &Value) -> bool {
    value.as_i64().is_some_and(|n| (1..=MAX_COUNT).contains(&n))
}

fn is_format(value: &Value) -> bool {
    value.as_str().is_some_and(|format| FORMATS.contains(&format))
}

/// Roman numerals for 1 to 100.
fn to_roman(mut number: i64) -> String {
    const NUMERALS: &[(i64, &str)] = &[
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut output = String::new();
    for &(value, numeral) in NUMERALS {
        while number >= value {
            output.push_str(numeral);
            number -= value;
        }
    }
    output
}

/// `a` ... `z`, `aa`, `ab`, ...
fn to_letters(number: i64, base: u8) -> String {
    let mut number = number;
    let mut output = Vec::new();
    while number > 0 {
        number -= 1;
        output.push((base + (number % 26) as u8) as char);
        number /= 26;
    }
    output.iter().rev().collect()
}

pub fn format_number(number: i64, format: &str) -> String {
    match format {
        "lower" => to_letters(number, b'a'),
        "upper" => to_letters(number, b'A'),
        "roman" => to_roman(number),
        _ => number.to_string(),
    }
}

fn counter_elements(fields: &Mapping) -> Vec<String> {
    fields
        .get("counterElements")
        .and_then(Value::as_sequence)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

pub struct CounterMaster;

impl MasterSpec for CounterMaster {
    fn name(&self) -> &'static str {
        "counter"
    }

    fn display_name(&self) -> &'static str {
        "Zähler"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("counter", "black").symbol("🔢")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn short_form_field(&self) -> Option<&'static str> {
        Some("to")
    }

    fn collect_fields_on_instantiation(&self, mut fields: Mapping) -> Result<Mapping> {
        let to = int_field(&fields, "to").unwrap_or(1);
        let format = str_field(&fields, "format").unwrap_or("arabic").to_string();
        let elements: Vec<Value> = (1..=to)
            .map(|number| Value::from(format_number(number, &format)))
            .collect();
        fields.insert(Value::from("counterElements"), Value::Sequence(elements));
        Ok(fields)
    }

    fn collect_steps_on_instantiation(&self, fields: &Mapping, steps: &mut StepCollector) {
        for element in counter_elements(fields) {
            steps.add(format!("Zähle „{}“", element));
        }
    }

    fn derive_title_from_fields(&self, fields: &Mapping) -> Option<String> {
        let elements = counter_elements(fields);
        let last = elements.last()?;
        Some(format!("Zähle bis „{}“", last))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MarkdownConverter;
    use crate::masters::registry;

    #[test]
    fn test_formats() {
        assert_eq!(format_number(4, "arabic"), "4");
        assert_eq!(format_number(3, "lower"), "c");
        assert_eq!(format_number(28, "upper"), "AB");
        assert_eq!(format_number(94, "roman"), "XCIV");
        assert_eq!(format_number(100, "roman"), "C");
    }

    #[test]
    fn test_steps() {
        let master = registry().get("counter").unwrap();
        let raw: Value = serde_yaml::from_str("{ to: 3, format: roman }").unwrap();
        let fields = master
            .initialize_fields(Some(raw), &MarkdownConverter::new())
            .unwrap()
            .fields;

        let mut steps = StepCollector::new();
        master.collect_steps_on_instantiation(&fields, &mut steps);
        let titles: Vec<_> = steps.steps().iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, vec!["Zähle „I“", "Zähle „II“", "Zähle „III“"]);
    }

    #[test]
    fn test_limits() {
        let master = registry().get("counter").unwrap();
        for yaml in ["0", "101", "{ to: 3, format: greek }"] {
            let raw: Value = serde_yaml::from_str(yaml).unwrap();
            assert!(
                master
                    .initialize_fields(Some(raw), &MarkdownConverter::new())
                    .is_err(),
                "{} should be rejected",
                yaml
            );
        }
    }
}
