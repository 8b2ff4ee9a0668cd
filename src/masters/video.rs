use std::collections::BTreeSet;

use serde_yaml::Mapping;

use super::{set_if_absent, str_field, uri_set, DefaultValue, FieldSpec, FieldType, MasterIcon, MasterSpec};
use crate::adapters::Resolver;
use crate::error::Result;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("src", "The media URI of the video.")
        .types(&[FieldType::String])
        .required()
        .asset_uri(),
    FieldSpec::new("title", "The title of the video.")
        .types(&[FieldType::String])
        .markup(),
    FieldSpec::new("showMeta", "Show title and description below the video.")
        .types(&[FieldType::Boolean])
        .default_value(DefaultValue::Bool(false)),
];

/// A single video file
pub struct VideoMaster;

impl MasterSpec for VideoMaster {
    fn name(&self) -> &'static str {
        "video"
    }

    fn display_name(&self) -> &'static str {
        "Video"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("video-vintage", "purple").symbol("🎥")
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
        let title = str_field(&fields, "src")
            .and_then(|src| resolver.asset(src))
            .and_then(|asset| asset.title);
        if let Some(title) = title {
            set_if_absent(&mut fields, "title", title);
        }
        Ok(fields)
    }

    fn derive_title_from_fields(&self, fields: &Mapping) -> Option<String> {
        str_field(fields, "title").map(str::to_string)
    }
}
