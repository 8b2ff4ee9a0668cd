//! One slide of a presentation.
//!
//! A raw slide record holds some meta keys, optionally nested `slides`,
//! optionally a `state` and exactly one master key:
//!
//! ```yaml
//! - title: Für Elise
//!   audio:
//!     src: ref:Fuer-Elise
//!   audioOverlay: ref:Applause
//! ```

use std::collections::BTreeSet;

use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use super::data_cutter::DataCutter;
use super::markup::MarkupConverter;
use super::text::shorten_text;
use crate::adapters::Resolver;
use crate::domain::{FuzzyUriList, StepCollector};
use crate::error::{format_raw, Result, StructuralError};
use crate::masters::{registry, Master};

/// Keys of a slide record that never select a master.
pub const RESERVED_KEYS: &[&str] = &[
    "ref",
    "title",
    "description",
    "source",
    "audioOverlay",
    "slides",
    "state",
];

/// Author supplied information about a slide
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SlideMeta {
    #[serde(rename = "ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

impl SlideMeta {
    fn cut(data: &mut DataCutter) -> Result<Self> {
        Ok(Self {
            reference: data.cut_string("ref")?,
            title: data.cut_string("title")?,
            description: data.cut_string("description")?,
            source: data.cut_string("source")?,
        })
    }
}

/// A parsed slide
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Slide {
    /// 1-based position in document order
    pub no: usize,

    /// Nesting depth, 1 for top level slides
    pub level: usize,

    pub meta: SlideMeta,

    pub master: &'static Master,

    /// Normalized fields of the master
    pub fields: Mapping,

    /// URIs that must be resolvable, fragments removed
    pub media_uris: BTreeSet<String>,

    /// URIs that may fail to resolve
    pub optional_media_uris: BTreeSet<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_overlay: Option<FuzzyUriList>,

    pub steps: StepCollector,

    /// Derived title, plain text and shortened
    pub title: String,

    /// All text of the slide on one line
    pub plain_text: String,

    /// Positions of the direct children in the flat list
    #[serde(skip)]
    pub(crate) children: Vec<usize>,
}

/// A slide together with its raw nested `slides`
#[derive(Debug)]
pub(crate) struct ParsedSlide {
    pub slide: Slide,
    pub children: Option<Value>,
}

impl Slide {
    /// Parse one raw slide record.
    ///
    /// Returns `None` for slides marked `state: absent`. The number is
    /// assigned by the collection.
    pub(crate) fn parse(
        raw: &Value,
        level: usize,
        converter: &dyn MarkupConverter,
        title_max_length: usize,
    ) -> Result<Option<ParsedSlide>> {
        // `- camera`
        if let Value::String(name) = raw {
            let master = registry().get(name).ok_or_else(|| StructuralError::NoMaster {
                raw: format_raw(raw),
            })?;
            let slide = Self::build(
                master,
                None,
                SlideMeta::default(),
                None,
                level,
                converter,
                title_max_length,
            )?;
            return Ok(Some(ParsedSlide {
                slide,
                children: None,
            }));
        }

        let mut data = DataCutter::new("slide", raw)?;

        if let Some(state) = data.cut("state") {
            match state.as_str() {
                Some("absent") => {
                    debug!(raw = %format_raw(raw), "Skipping absent slide");
                    return Ok(None);
                }
                _ => {
                    return Err(StructuralError::UnknownState {
                        state: state.as_str().map(str::to_string).unwrap_or_else(|| format_raw(&state)),
                        raw: format_raw(raw),
                    }
                    .into())
                }
            }
        }

        let master = Self::find_master(&data)?;
        let children = data.cut("slides");
        let meta = SlideMeta::cut(&mut data)?;
        let audio_overlay = data
            .cut("audioOverlay")
            .map(|raw| FuzzyUriList::parse(&raw))
            .transpose()?;
        let payload = data.cut(master.name());
        data.check_empty()?;

        let slide = Self::build(
            master,
            payload,
            meta,
            audio_overlay,
            level,
            converter,
            title_max_length,
        )?;
        Ok(Some(ParsedSlide { slide, children }))
    }

    /// The one registered master among the keys of a record.
    fn find_master(data: &DataCutter) -> Result<&'static Master> {
        let registry = registry();
        let names: Vec<String> = data
            .keys()
            .into_iter()
            .filter(|key| !RESERVED_KEYS.contains(&key.as_str()))
            .filter(|key| registry.contains(key))
            .collect();

        match names.as_slice() {
            [name] => registry.get(name).ok_or_else(|| {
                StructuralError::NoMaster {
                    raw: format_raw(data.raw()),
                }
                .into()
            }),
            [] => Err(StructuralError::NoMaster {
                raw: format_raw(data.raw()),
            }
            .into()),
            _ => Err(StructuralError::AmbiguousMaster {
                masters: names.join(", "),
                raw: format_raw(data.raw()),
            }
            .into()),
        }
    }

    fn build(
        master: &'static Master,
        payload: Option<Value>,
        meta: SlideMeta,
        audio_overlay: Option<FuzzyUriList>,
        level: usize,
        converter: &dyn MarkupConverter,
        title_max_length: usize,
    ) -> Result<Self> {
        let normalized = master.initialize_fields(payload, converter)?;
        let fields = normalized.fields;

        let mut media_uris = master.media_uris(&fields)?;
        media_uris.extend(normalized.inline_media_uris);
        if let Some(overlay) = &audio_overlay {
            media_uris.extend(overlay.uris());
        }
        let optional_media_uris = master.optional_media_uris(&fields)?;

        let mut steps = StepCollector::new();
        master.collect_steps_on_instantiation(&fields, &mut steps);

        let mut slide = Self {
            no: 0,
            level,
            meta,
            master,
            fields,
            media_uris,
            optional_media_uris,
            audio_overlay,
            steps,
            title: String::new(),
            plain_text: String::new(),
            children: Vec::new(),
        };
        slide.derive_texts(title_max_length);
        Ok(slide)
    }

    /// Second phase: let the master read the resolved assets.
    pub(crate) fn resolve(&mut self, resolver: &dyn Resolver, title_max_length: usize) -> Result<()> {
        self.fields = self
            .master
            .collect_fields_after_resolution(self.fields.clone(), resolver)?;
        self.master
            .collect_steps_after_resolution(&self.fields, &mut self.steps);
        self.derive_texts(title_max_length);
        Ok(())
    }

    fn derive_texts(&mut self, title_max_length: usize) {
        let plain_text = self.master.derive_plain_text_from_fields(&self.fields);
        self.plain_text = plain_text
            .as_deref()
            .map(|text| shorten_text(text, usize::MAX))
            .unwrap_or_default();

        let title = [
            self.meta.title.clone(),
            self.master.derive_title_from_fields(&self.fields),
            plain_text,
        ]
        .into_iter()
        .flatten()
        .map(|title| shorten_text(&title, title_max_length))
        .find(|title| !title.is_empty());

        self.title = title.unwrap_or_else(|| self.master.display_name().to_string());
    }

    /// `Nr. 3 [Hörbeispiel]: Für Elise`
    pub fn detailed_title(&self) -> String {
        format!(
            "Nr. {} [{}]: {}",
            self.no,
            self.master.display_name(),
            self.title
        )
    }

    /// The number of reveal states, at least one.
    pub fn step_count(&self) -> usize {
        self.steps.step_count()
    }

    /// TeX markup of the master, if it produces any.
    pub fn generate_markup(&self) -> Option<String> {
        self.master.generate_markup(&self.fields)
    }

    pub fn master_name(&self) -> &'static str {
        self.master.name()
    }

    /// A string field.
    pub fn field_str(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MarkdownConverter;
    use crate::error::Error;

    fn parse(yaml: &str) -> Result<Option<ParsedSlide>> {
        let raw: Value = serde_yaml::from_str(yaml).unwrap();
        Slide::parse(&raw, 1, &MarkdownConverter::new(), 80)
    }

    fn slide(yaml: &str) -> Slide {
        parse(yaml).unwrap().unwrap().slide
    }

    #[test]
    fn test_generic_slide() {
        let slide = slide("generic: Hello");
        assert_eq!(slide.master_name(), "generic");
        assert_eq!(slide.level, 1);
        assert_eq!(slide.title, "Hello");
    }

    #[test]
    fn test_master_name_only() {
        let slide = slide("camera");
        assert_eq!(slide.master_name(), "camera");
        assert_eq!(slide.title, "Dokumentenkamera");
    }

    #[test]
    fn test_no_master() {
        let err = parse("{ title: Nothing, generik: Hello }").unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::NoMaster { .. })
        ));
        assert!(err.to_string().contains("\"generik\":\"Hello\""));
    }

    #[test]
    fn test_ambiguous_master() {
        let err = parse("{ generic: Hello, task: Do it }").unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::AmbiguousMaster { .. })
        ));
    }

    #[test]
    fn test_absent_slide() {
        assert!(parse("{ state: absent, generic: Hello }").unwrap().is_none());
    }

    #[test]
    fn test_unknown_state() {
        let err = parse("{ state: hidden, generic: Hello }").unwrap_err();
        assert!(matches!(
            err,
            Error::Structural(StructuralError::UnknownState { .. })
        ));
    }

    #[test]
    fn test_meta_and_title() {
        let slide = slide("{ ref: intro, title: Einleitung, task: Lies den Text }");
        assert_eq!(slide.meta.reference.as_deref(), Some("intro"));
        assert_eq!(slide.title, "Einleitung");

        let slide = slide_with_no(slide, 3);
        assert_eq!(slide.detailed_title(), "Nr. 3 [Arbeitsauftrag]: Einleitung");
    }

    fn slide_with_no(mut slide: Slide, no: usize) -> Slide {
        slide.no = no;
        slide
    }

    #[test]
    fn test_media_uris() {
        let slide = slide(
            "
audio:
  src: ref:Fuer-Elise#theme
  description: Siehe [ref:Beethoven]
audioOverlay: ref:Applause
",
        );
        let uris: Vec<_> = slide.media_uris.iter().map(String::as_str).collect();
        assert_eq!(uris, vec!["ref:Applause", "ref:Beethoven", "ref:Fuer-Elise"]);
        assert!(slide.optional_media_uris.is_empty());
    }

    #[test]
    fn test_optional_media_uris() {
        let slide = slide("youtube: xtKavZG1KiM");
        assert!(slide.media_uris.is_empty());
        assert!(slide.optional_media_uris.contains("ref:YT_xtKavZG1KiM"));
    }

    #[test]
    fn test_children_are_returned_untouched() {
        let parsed = parse("{ generic: Parent, slides: [{ generic: Child }] }")
            .unwrap()
            .unwrap();
        assert!(parsed.children.unwrap().is_sequence());
    }

    #[test]
    fn test_failed_resolution_keeps_fields() {
        let mut slide = slide("sampleList: ref:a");
        slide
            .fields
            .insert(Value::from("samples"), Value::from("keine URI"));
        let before = slide.fields.clone();

        let resolver = crate::adapters::CatalogResolver::from_assets(Vec::new());
        assert!(slide.resolve(&resolver, 80).is_err());
        assert_eq!(slide.fields, before);
    }
}
