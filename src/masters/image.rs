use std::collections::BTreeSet;

use serde_yaml::Mapping;

use super::{bool_field, set_if_absent, str_field, uri_set, DefaultValue, FieldSpec, FieldType, MasterIcon, MasterSpec};
use crate::adapters::Resolver;
use crate::error::Result;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("src", "The media URI of the image.")
        .types(&[FieldType::String])
        .required()
        .asset_uri(),
    FieldSpec::new("title", "A caption for the image.")
        .types(&[FieldType::String])
        .markup()
        .inline_markup(),
    FieldSpec::new("description", "A longer description.")
        .types(&[FieldType::String])
        .markup()
        .inline_markup(),
    FieldSpec::new("noMetaDataShow", "Hide title and description.")
        .types(&[FieldType::Boolean])
        .default_value(DefaultValue::Bool(false)),
];

/// A single image
pub struct ImageMaster;

impl MasterSpec for ImageMaster {
    fn name(&self) -> &'static str {
        "image"
    }

    fn display_name(&self) -> &'static str {
        "Bild"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("image", "green").symbol("🖼")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn short_form_field(&self) -> Option<&'static str> {
        Some("src")
    }

    fn collect_media_uris(&self, fields: &Mapping) -> Result<BTreeSet<String>> {
        Ok(uri_set(fields, &["src"]))
    }

    fn collect_fields_after_resolution(
        &self,
        mut fields: Mapping,
        resolver: &dyn Resolver,
    ) -> Result<Mapping> {
        if bool_field(&fields, "noMetaDataShow") {
            return Ok(fields);
        }
        let Some(asset) = str_field(&fields, "src").and_then(|src| resolver.asset(src)) else {
            return Ok(fields);
        };
        if let Some(title) = &asset.title {
            set_if_absent(&mut fields, "title", title.as_str());
        }
        if let Some(description) = asset.meta_str("description") {
            set_if_absent(&mut fields, "description", description);
        }
        Ok(fields)
    }

    fn derive_title_from_fields(&self, fields: &Mapping) -> Option<String> {
        str_field(fields, "title").map(str::to_string)
    }
}
