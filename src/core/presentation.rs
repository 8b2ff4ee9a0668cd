//! Presentations: meta information plus a tree of slides.
//!
//! Parsing is synchronous and touches nothing but the document. Media
//! resolution is a separate, asynchronous step that runs at most once:
//!
//! ```ignore
//! let mut presentation = Presentation::parse(&yaml)?;
//! presentation.resolve_media_assets(&resolver).await?;
//! ```

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use anyhow::bail;
use serde::Serialize;
use serde_yaml::value::TaggedValue;
use serde_yaml::{Number, Value};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use super::collection::SlideCollection;
use super::data_cutter::DataCutter;
use super::markup::{MarkdownConverter, MarkupConverter};
use super::slide::Slide;
use super::text::DEFAULT_TITLE_MAX_LENGTH;
use crate::adapters::Resolver;
use crate::error::{Result, StructuralError};

/// Prefix expanded to `ref:<presentation ref>_`
pub const REF_ABBREVIATION: &str = "ref:./";

static DEFAULT_CONVERTER: MarkdownConverter = MarkdownConverter;

/// Knobs for parsing
#[derive(Clone, Copy)]
pub struct ParseOptions<'a> {
    pub converter: &'a dyn MarkupConverter,

    /// Maximum length of derived slide titles
    pub title_max_length: usize,

    /// Source file of the document
    pub path: Option<&'a Path>,
}

impl Default for ParseOptions<'static> {
    fn default() -> Self {
        Self {
            converter: &DEFAULT_CONVERTER,
            title_max_length: DEFAULT_TITLE_MAX_LENGTH,
            path: None,
        }
    }
}

/// Meta information about a presentation
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationMeta {
    /// Unique human readable reference, e.g. `Beethoven_Fuer-Elise`
    #[serde(rename = "ref")]
    pub reference: String,

    pub uuid: String,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,

    pub subject: String,

    pub grade: Number,

    pub curriculum: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub curriculum_url: Option<String>,

    /// Source file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl PresentationMeta {
    fn parse(raw: &Value) -> Result<Self> {
        let mut data = DataCutter::new("meta", raw)?;
        let meta = Self {
            reference: data.cut_string_not_null("ref")?,
            uuid: data.cut_string_not_null("uuid")?,
            title: data.cut_string_not_null("title")?,
            subtitle: data.cut_string("subtitle")?,
            subject: data.cut_string_not_null("subject")?,
            grade: data.cut_number_not_null("grade")?,
            curriculum: data.cut_string_not_null("curriculum")?,
            curriculum_url: data.cut_string("curriculumUrl")?,
            path: None,
        };
        data.check_empty()?;

        if Uuid::parse_str(&meta.uuid).is_err() {
            warn!(uuid = %meta.uuid, presentation = %meta.reference, "Meta uuid is not a valid UUID");
        }
        Ok(meta)
    }
}

/// A parsed presentation
#[derive(Debug, Clone, Serialize)]
pub struct Presentation {
    pub meta: PresentationMeta,

    pub slides: SlideCollection,

    #[serde(skip)]
    title_max_length: usize,

    #[serde(skip)]
    resolved: bool,
}

impl Presentation {
    /// Parse a YAML document with the default options.
    pub fn parse(yaml: &str) -> Result<Self> {
        Self::parse_with(yaml, ParseOptions::default())
    }

    pub fn parse_with(yaml: &str, options: ParseOptions<'_>) -> Result<Self> {
        let raw: Value = serde_yaml::from_str(yaml)?;
        Self::from_value(&raw, options)
    }

    /// Parse an already deserialized document. The value is not modified.
    pub fn from_value(raw: &Value, options: ParseOptions<'_>) -> Result<Self> {
        let raw = expand_ref_abbreviations(raw)?;
        let mut data = DataCutter::new("presentation", &raw)?;

        let mut meta = PresentationMeta::parse(&data.cut_not_null("meta")?)?;
        meta.path = options.path.map(Path::to_path_buf);

        let slides = SlideCollection::parse(
            data.cut("slides").as_ref(),
            options.converter,
            options.title_max_length,
        )?;
        data.check_empty()?;

        debug!(
            presentation = %meta.reference,
            count = slides.len(),
            "Parsed presentation"
        );

        Ok(Self {
            meta,
            slides,
            title_max_length: options.title_max_length,
            resolved: false,
        })
    }

    /// Union of the required media URIs of all slides.
    pub fn media_uris(&self) -> BTreeSet<String> {
        self.slides
            .iter()
            .flat_map(|slide| slide.media_uris.iter().cloned())
            .collect()
    }

    /// Union of the optional media URIs, without the required ones.
    pub fn optional_media_uris(&self) -> BTreeSet<String> {
        let required = self.media_uris();
        self.slides
            .iter()
            .flat_map(|slide| slide.optional_media_uris.iter())
            .filter(|uri| !required.contains(*uri))
            .cloned()
            .collect()
    }

    /// Resolve all media and run the second phase of every slide.
    ///
    /// A failure on the required set is returned unchanged. A failure on the
    /// optional set is logged and otherwise ignored. Can only run once.
    #[instrument(skip_all, fields(presentation = %self.meta.reference, resolver = resolver.name()))]
    pub async fn resolve_media_assets(&mut self, resolver: &dyn Resolver) -> anyhow::Result<()> {
        if self.resolved {
            bail!(
                "The media assets of the presentation “{}” have already been resolved",
                self.meta.reference
            );
        }
        self.resolved = true;

        let required = self.media_uris();
        if !required.is_empty() {
            info!(count = required.len(), "Resolving required media URIs");
            resolver.resolve(&required, true).await?;
        }

        let optional = self.optional_media_uris();
        if !optional.is_empty() {
            info!(count = optional.len(), "Resolving optional media URIs");
            if let Err(err) = resolver.resolve(&optional, false).await {
                warn!(count = optional.len(), error = %err, "Optional media URIs could not be resolved");
            }
        }

        let title_max_length = self.title_max_length;
        for slide in self.slides.flat_mut() {
            slide.resolve(resolver, title_max_length)?;
        }

        debug!(count = self.slides.len(), "Resolved slides");
        Ok(())
    }

    /// Whether `resolve_media_assets` has run.
    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    pub fn slide_by_no(&self, no: usize) -> Option<&Slide> {
        self.slides.get(no)
    }

    pub fn slide_by_ref(&self, reference: &str) -> Option<&Slide> {
        self.slides.with_ref(reference)
    }

    pub fn first_slide(&self) -> Option<&Slide> {
        self.slides.flat().first()
    }

    /// Directory of the source file.
    pub fn parent_dir(&self) -> Option<&Path> {
        self.meta.path.as_deref().and_then(Path::parent)
    }

    /// TeX markup of all slides that produce some, separated by blank lines.
    pub fn generate_tex_markup(&self) -> String {
        self.slides
            .iter()
            .filter_map(Slide::generate_markup)
            .filter(|markup| !markup.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Replace `ref:./` with `ref:<meta.ref>_` in every string of a document.
pub fn expand_ref_abbreviations(raw: &Value) -> Result<Value> {
    if !contains_abbreviation(raw) {
        return Ok(raw.clone());
    }

    let reference = raw
        .get("meta")
        .and_then(|meta| meta.get("ref"))
        .and_then(Value::as_str)
        .ok_or(StructuralError::RefAbbreviationWithoutRef)?;
    let replacement = format!("ref:{}_", reference);
    Ok(replace_in_strings(raw, &replacement))
}

fn contains_abbreviation(value: &Value) -> bool {
    match value {
        Value::String(text) => text.contains(REF_ABBREVIATION),
        Value::Sequence(items) => items.iter().any(contains_abbreviation),
        Value::Mapping(map) => map.values().any(contains_abbreviation),
        Value::Tagged(tagged) => contains_abbreviation(&tagged.value),
        _ => false,
    }
}

fn replace_in_strings(value: &Value, replacement: &str) -> Value {
    match value {
        Value::String(text) => Value::String(text.replace(REF_ABBREVIATION, replacement)),
        Value::Sequence(items) => Value::Sequence(
            items
                .iter()
                .map(|item| replace_in_strings(item, replacement))
                .collect(),
        ),
        Value::Mapping(map) => Value::Mapping(
            map.iter()
                .map(|(key, item)| (key.clone(), replace_in_strings(item, replacement)))
                .collect(),
        ),
        Value::Tagged(tagged) => Value::Tagged(Box::new(TaggedValue {
            tag: tagged.tag.clone(),
            value: replace_in_strings(&tagged.value, replacement),
        })),
        other => other.clone(),
    }
}
