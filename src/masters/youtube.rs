//! YouTube videos.
//!
//! A video may have an offline copy in the archive, referenced as
//! `ref:YT_<youtubeId>`. The copy is optional: a missing one never stops
//! the presentation from loading.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::{Mapping, Value};

use super::{set_if_absent, str_field, tex, FieldSpec, FieldType, MasterIcon, MasterSpec};
use crate::adapters::Resolver;
use crate::error::Result;

static YOUTUBE_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}$").unwrap());

const FIELDS: &[FieldSpec] = &[
    FieldSpec::new("youtubeId", "The eleven character ID of the video, e.g. `xtKavZG1KiM`.")
        .types(&[FieldType::String])
        .required()
        .validate(is_youtube_id),
    FieldSpec::new("heading", "A heading shown above the video.")
        .types(&[FieldType::String])
        .markup()
        .inline_markup(),
    FieldSpec::new("info", "Further information below the video.")
        .types(&[FieldType::String])
        .markup()
        .inline_markup(),
];

fn is_youtube_id(value: &Value) -> bool {
    value.as_str().is_some_and(|id| YOUTUBE_ID_REGEX.is_match(id))
}

/// `ref:YT_<id>`
pub fn offline_uri(youtube_id: &str) -> String {
    format!("ref:YT_{}", youtube_id)
}

pub struct YoutubeMaster;

impl MasterSpec for YoutubeMaster {
    fn name(&self) -> &'static str {
        "youtube"
    }

    fn display_name(&self) -> &'static str {
        "YouTube"
    }

    fn icon(&self) -> MasterIcon {
        MasterIcon::new("youtube", "red").symbol("📺")
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FIELDS
    }

    fn short_form_field(&self) -> Option<&'static str> {
        Some("youtubeId")
    }

    fn collect_optional_media_uris(&self, fields: &Mapping) -> Result<BTreeSet<String>> {
        Ok(str_field(fields, "youtubeId")
            .map(offline_uri)
            .into_iter()
            .collect())
    }

    fn collect_fields_after_resolution(
        &self,
        mut fields: Mapping,
        resolver: &dyn Resolver,
    ) -> Result<Mapping> {
        let title = str_field(&fields, "youtubeId")
            .and_then(|id| resolver.asset(&offline_uri(id)))
            .and_then(|asset| asset.title);
        if let Some(title) = title {
            set_if_absent(&mut fields, "heading", title);
        }
        Ok(fields)
    }

    fn derive_title_from_fields(&self, fields: &Mapping) -> Option<String> {
        str_field(fields, "heading").map(str::to_string)
    }

    fn generate_markup(&self, fields: &Mapping) -> Option<String> {
        let id = str_field(fields, "youtubeId")?;
        Some(tex::cmd(
            "url",
            &format!("https://www.youtube.com/watch?v={}", id),
        ))
    }
}
