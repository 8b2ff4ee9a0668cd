//! Audio files with optional cover image.

use std::collections::BTreeSet;

use serde_yaml::{Mapping, Value};

use super::{set_if_absent, str_field, uri_set, DefaultValue, FieldSpec, FieldType, MasterIcon, MasterSpec};
use crate::adapters::Resolver;
use crate::error::Result;

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("src", "The media URI of the audio file, e.g. `ref:Yesterday`.")
        .types(&[FieldType::String])
        .required()
        .asset_uri(),
    FieldSpec::new("title", "The title of the audio file.")
        .types(&[FieldType::String])
        .markup(),
    FieldSpec::new("composer", "The composer of the piece.")
        .types(&[FieldType::String])
        .markup(),
    FieldSpec::new("artist", "The performing artist.")
        .types(&[FieldType::String])
        .markup(),
    FieldSpec::new("partOf", "The work or album the piece belongs to.")
        .types(&[FieldType::String])
        .markup(),
    FieldSpec::new("description", "A longer description.")
        .types(&[FieldType::String])
        .markup()
        .inline_markup(),
    FieldSpec::new("cover", "The media URI of a cover image.")
        .types(&[FieldType::String])
        .asset_uri(),
    FieldSpec::new("autoplay", "Start playback when the slide is shown.")
        .types(&[FieldType::Boolean])
        .default_value(DefaultValue::Bool(false)),
    FieldSpec::new("playthrough", "Keep playing when the slide is left.")
        .types(&[FieldType::Boolean])
        .default_value(DefaultValue::Bool(false)),
];

/// Metadata keys copied from the asset when the slide does not set them.
const META_FIELDS: &[&str] = &["composer", "artist", "partOf", "description"];

pub struct AudioMaster;

impl MasterSpec for AudioMaster {
    fn name(&self) -> &'static str {
        "audio"
    }

    fn display_name(&self) -> &'static str {
        "Hörbeispiel"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("music", "brown").symbol("🎵")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn short_form_field(&self) -> Option<&'static str> {
        Some("src")
    }

    fn collect_media_uris(&self, fields: &Mapping) -> Result<BTreeSet<String>> {
        Ok(uri_set(fields, &["src", "cover"]))
    }

    fn collect_fields_after_resolution(
        &self,
        mut fields: Mapping,
        resolver: &dyn Resolver,
    ) -> Result<Mapping> {
        let Some(asset) = str_field(&fields, "src").and_then(|src| resolver.asset(src)) else {
            return Ok(fields);
        };

        if let Some(title) = &asset.title {
            set_if_absent(&mut fields, "title", title.as_str());
        }
        for key in META_FIELDS {
            if let Some(value) = asset.meta_str(key) {
                set_if_absent(&mut fields, key, value);
            }
        }
        if let Some(cover) = asset.meta_str("cover") {
            set_if_absent(&mut fields, "cover", cover);
        }
        Ok(fields)
    }

    fn derive_title_from_fields(&self, fields: &Mapping) -> Option<String> {
        str_field(fields, "title").map(str::to_string)
    }

    fn derive_plain_text_from_fields(&self, fields: &Mapping) -> Option<String> {
        let texts: Vec<&str> = ["title", "composer", "artist", "partOf", "description"]
            .iter()
            .filter_map(|key| fields.get(*key).and_then(Value::as_str))
            .collect();
        (!texts.is_empty()).then(|| texts.join(" | "))
    }
}
