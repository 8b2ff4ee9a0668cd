//! A list of audio samples played one after another.
//!
//! ```yaml
//! - sampleList:
//!     - ref:Fuer-Elise#theme Das Thema
//!     - ref:Yesterday
//! ```
//!
//! An entry without a fragment that points to an asset with several
//! samples is expanded into one entry per sample once the asset is
//! resolved.

use std::collections::BTreeSet;

use serde_yaml::{Mapping, Value};

use super::{bool_field, tex, DefaultValue, FieldSpec, FieldType, MasterIcon, MasterSpec};
use crate::adapters::Resolver;
use crate::domain::uri::split_by_fragment;
use crate::domain::{FuzzyUriList, StepCollector, WrappedUri};
use crate::error::Result;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("samples", "Media URIs with optional titles, a string or a list.")
        .types(&[FieldType::Sequence])
        .required(),
    FieldSpec::new("heading", "A heading above the list.")
        .types(&[FieldType::String])
        .markup()
        .inline_markup(),
    FieldSpec::new("notNumbered", "Hide the numbers of the entries.")
        .types(&[FieldType::Boolean])
        .default_value(DefaultValue::Bool(false)),
];

fn samples(fields: &Mapping) -> Result<FuzzyUriList> {
    match fields.get("samples") {
        Some(raw) => FuzzyUriList::parse(raw),
        None => Ok(FuzzyUriList::default()),
    }
}

/// Expand or complete one entry with the data of its resolved asset.
fn expand_entry(entry: &WrappedUri, resolver: &dyn Resolver) -> Vec<WrappedUri> {
    let Some(asset) = resolver.asset(&entry.uri) else {
        return vec![entry.clone()];
    };

    let (base, fragment) = split_by_fragment(&entry.uri);
    match fragment {
        None if asset.samples.len() > 1 => asset
            .samples
            .iter()
            .map(|sample| {
                let title = sample.title.clone().or_else(|| asset.title.clone());
                WrappedUri::new(format!("{}#{}", base, sample.reference), title)
            })
            .collect(),
        _ => {
            let title = entry
                .title
                .clone()
                .or_else(|| {
                    fragment
                        .and_then(|fragment| asset.sample(fragment))
                        .and_then(|sample| sample.title.clone())
                })
                .or_else(|| asset.title.clone());
            vec![WrappedUri::new(entry.uri.clone(), title)]
        }
    }
}

pub struct SampleListMaster;

impl MasterSpec for SampleListMaster {
    fn name(&self) -> &'static str {
        "sampleList"
    }

    fn display_name(&self) -> &'static str {
        "Audio-Ausschnitte"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("music", "red").symbol("🎶")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn short_form_field(&self) -> Option<&'static str> {
        Some("samples")
    }

    fn normalize_fields_input(&self, raw: Value) -> Result<Value> {
        let mut fields = match raw {
            Value::Sequence(_) => {
                let mut fields = Mapping::new();
                fields.insert(Value::from("samples"), raw);
                fields
            }
            Value::Mapping(fields) => fields,
            other => return Ok(other),
        };

        if let Some(raw) = fields.get("samples").filter(|raw| !raw.is_null()) {
            let samples = FuzzyUriList::parse(raw)?.to_value();
            fields.insert(Value::from("samples"), samples);
        }
        Ok(Value::Mapping(fields))
    }

    fn collect_media_uris(&self, fields: &Mapping) -> Result<BTreeSet<String>> {
        Ok(samples(fields)?.uris())
    }

    fn collect_fields_after_resolution(
        &self,
        mut fields: Mapping,
        resolver: &dyn Resolver,
    ) -> Result<Mapping> {
        let entries: Vec<WrappedUri> = samples(&fields)?
            .iter()
            .flat_map(|entry| expand_entry(entry, resolver))
            .collect();
        fields.insert(
            Value::from("samples"),
            FuzzyUriList::from_entries(entries).to_value(),
        );
        Ok(fields)
    }

    fn collect_steps_after_resolution(&self, fields: &Mapping, steps: &mut StepCollector) {
        let Ok(samples) = samples(fields) else {
            return;
        };
        for entry in &samples {
            steps.add(entry.title_or_uri());
        }
    }

    fn derive_plain_text_from_fields(&self, fields: &Mapping) -> Option<String> {
        let samples = samples(fields).ok()?;
        let titles: Vec<&str> = samples.iter().map(WrappedUri::title_or_uri).collect();
        (!titles.is_empty()).then(|| titles.join(" | "))
    }

    fn generate_markup(&self, fields: &Mapping) -> Option<String> {
        let samples = samples(fields).ok()?;
        let environment = if bool_field(fields, "notNumbered") {
            "itemize"
        } else {
            "enumerate"
        };
        let items: Vec<String> = samples
            .iter()
            .map(|entry| format!("\\item {}", tex::escape(entry.title_or_uri())))
            .collect();
        Some(tex::environment(environment, &items.join("\n")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::CatalogResolver;
    use crate::core::MarkdownConverter;
    use crate::domain::Asset;
    use crate::masters::registry;

    fn initialize(yaml: &str) -> Mapping {
        let raw: Value = serde_yaml::from_str(yaml).unwrap();
        registry()
            .get("sampleList")
            .unwrap()
            .initialize_fields(Some(raw), &MarkdownConverter::new())
            .unwrap()
            .fields
    }

    #[test]
    fn test_short_form() {
        let fields = initialize("ref:Yesterday Ein Lied");
        let samples = samples(&fields).unwrap();
        assert_eq!(samples.len(), 1);
        assert_eq!(samples.entries()[0].title.as_deref(), Some("Ein Lied"));
    }

    #[test]
    fn test_media_uris_without_fragments() {
        let fields = initialize("['ref:a#one', 'ref:a#two', 'ref:b']");
        let uris = SampleListMaster.collect_media_uris(&fields).unwrap();
        assert_eq!(
            uris,
            BTreeSet::from(["ref:a".to_string(), "ref:b".to_string()])
        );
    }

    #[tokio::test]
    async fn test_expand_samples_after_resolution() {
        let fields = initialize("['ref:a', 'ref:b#intro Anfang']");
        let a = Asset::new("a", Some("Werk A"))
            .with_sample("first", Some("Erster Satz"))
            .with_sample("second", None);
        let b = Asset::new("b", Some("Werk B")).with_sample("intro", Some("Intro"));
        let resolver = CatalogResolver::from_assets(vec![a, b]);
        resolver
            .resolve(&SampleListMaster.collect_media_uris(&fields).unwrap(), true)
            .await
            .unwrap();

        let fields = SampleListMaster
            .collect_fields_after_resolution(fields, &resolver)
            .unwrap();
        let entries = samples(&fields).unwrap();
        let entries: Vec<_> = entries
            .iter()
            .map(|e| (e.uri.as_str(), e.title.as_deref()))
            .collect();
        assert_eq!(
            entries,
            vec![
                ("ref:a#first", Some("Erster Satz")),
                ("ref:a#second", Some("Werk A")),
                ("ref:b#intro", Some("Anfang")),
            ]
        );

        let mut steps = StepCollector::new();
        SampleListMaster.collect_steps_after_resolution(&fields, &mut steps);
        assert_eq!(steps.len(), 3);
        assert_eq!(steps.steps()[2].title, "Anfang");
    }
}
