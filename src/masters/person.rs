use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use super::{set_if_absent, str_field, FieldSpec, FieldType, MasterIcon, MasterSpec};
use crate::adapters::Resolver;
use crate::error::Result;

static PERSON_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

const FIELDS: &[FieldSpec] = &[FieldSpec::new(
    "personId",
    "The ID of the person without prefix, e.g. `Beethoven_Ludwig-van`.",
)
.types(&[FieldType::String])
.required()
.validate(is_person_id)];

/// Copied from the asset metadata after resolution.
const META_FIELDS: &[&str] = &["name", "shortBiography", "birth", "death", "wikipedia"];

fn is_person_id(value: &Value) -> bool {
    value.as_str().is_some_and(|id| PERSON_ID_REGEX.is_match(id))
}

/// `ref:PR_<personId>`
pub fn person_uri(person_id: &str) -> String {
    format!("ref:PR_{}", person_id)
}

/// Portrait and biography of a person
pub struct PersonMaster;

impl MasterSpec for PersonMaster {
    fn name(&self) -> &'static str {
        "person"
    }

    fn display_name(&self) -> &'static str {
        "Porträt"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("clipboard-account", "orange").symbol("🧑")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn short_form_field(&self) -> Option<&'static str> {
        Some("personId")
    }

    fn collect_media_uris(&self, fields: &Mapping) -> Result<BTreeSet<String>> {
        Ok(str_field(fields, "personId")
            .map(person_uri)
            .into_iter()
            .collect())
    }

    fn collect_fields_after_resolution(
        &self,
        mut fields: Mapping,
        resolver: &dyn Resolver,
    ) -> Result<Mapping> {
        let Some(asset) = str_field(&fields, "personId").and_then(|id| resolver.asset(&person_uri(id)))
        else {
            return Ok(fields);
        };
        for key in META_FIELDS {
            if let Some(value) = asset.meta.get(*key) {
                set_if_absent(&mut fields, key, value.clone());
            }
        }
        if let Some(title) = &asset.title {
            set_if_absent(&mut fields, "name", title.as_str());
        }
        Ok(fields)
    }

    fn derive_title_from_fields(&self, fields: &Mapping) -> Option<String> {
        str_field(fields, "name")
            .or_else(|| str_field(fields, "personId"))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::CatalogResolver;
    use crate::domain::Asset;

    #[tokio::test]
    async fn test_biography_from_asset() {
        let mut fields = Mapping::new();
        fields.insert(Value::from("personId"), Value::from("Beethoven_Ludwig-van"));

        let uris = PersonMaster.collect_media_uris(&fields).unwrap();
        assert!(uris.contains("ref:PR_Beethoven_Ludwig-van"));

        let asset = Asset::new("PR_Beethoven_Ludwig-van", Some("Ludwig van Beethoven"))
            .with_meta("birth", "1770-12-17")
            .with_meta("shortBiography", "Komponist");
        let resolver = CatalogResolver::from_assets(vec![asset]);
        resolver.resolve(&uris, true).await.unwrap();

        let fields = PersonMaster
            .collect_fields_after_resolution(fields, &resolver)
            .unwrap();
        assert_eq!(str_field(&fields, "name"), Some("Ludwig van Beethoven"));
        assert_eq!(str_field(&fields, "birth"), Some("1770-12-17"));
        assert_eq!(
            PersonMaster.derive_title_from_fields(&fields),
            Some("Ludwig van Beethoven".to_string())
        );
    }

    #[test]
    fn test_person_id() {
        assert!(is_person_id(&Value::from("Beethoven_Ludwig-van")));
        assert!(!is_person_id(&Value::from("Beethoven Ludwig")));
    }
}
