//! Master slides.
//!
//! A master is a content type: a field schema plus hooks that run while a
//! slide is parsed and after its media has been resolved. The registry is a
//! fixed, immutable map built on first use:
//!
//! - generic, task, quote, question: text based slides
//! - audio, image, video, youtube, sampleList: media slides
//! - person, wikipedia: reference slides
//! - counter, camera: interactive slides

pub mod audio;
pub mod camera;
pub mod counter;
pub mod field;
pub mod generic;
pub mod image;
pub mod person;
pub mod question;
pub mod quote;
pub mod sample_list;
pub mod task;
pub mod tex;
pub mod video;
pub mod wikipedia;
pub mod youtube;

use std::collections::{BTreeMap, BTreeSet};
use std::sync::LazyLock;

use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::adapters::Resolver;
use crate::core::markup::{convert_nested, MarkupConverter};
use crate::domain::uri::extract_inline_uris_from_value;
use crate::domain::{remove_fragment, MediaUri, StepCollector};
use crate::error::{format_raw, FieldContractError, Result};

// Re-export commonly used types
pub use field::{DefaultValue, FieldSpec, FieldType};

/// Icon size of a master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IconSize {
    Small,
    Large,
}

/// Icon shown next to slides of a master
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MasterIcon {
    pub name: &'static str,
    pub color: &'static str,
    pub size: IconSize,
    pub show_on_slides: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unicode_symbol: Option<&'static str>,
}

impl MasterIcon {
    pub const fn new(name: &'static str, color: &'static str) -> Self {
        Self {
            name,
            color,
            size: IconSize::Small,
            show_on_slides: true,
            unicode_symbol: None,
        }
    }

    pub const fn large(mut self) -> Self {
        self.size = IconSize::Large;
        self
    }

    pub const fn hidden(mut self) -> Self {
        self.show_on_slides = false;
        self
    }

    pub const fn symbol(mut self, symbol: &'static str) -> Self {
        self.unicode_symbol = Some(symbol);
        self
    }
}

/// The behavior of one master.
///
/// Every hook has a default that does nothing, so a master only implements
/// what it needs. Phase one hooks (`collect_*_on_instantiation`,
/// `collect_media_uris`) see normalized fields only; phase two hooks
/// (`collect_*_after_resolution`) may read descriptors from the resolver.
pub trait MasterSpec: Send + Sync {
    /// Registry key, also the slide key selecting this master
    fn name(&self) -> &'static str;

    fn display_name(&self) -> &'static str;

    fn icon(&self) -> MasterIcon;

    fn fields(&self) -> &'static [FieldSpec];

    /// Field receiving a scalar payload, e.g. `audio: ref:Yesterday`
    fn short_form_field(&self) -> Option<&'static str> {
        None
    }

    /// Turn shorthand input into a field mapping.
    fn normalize_fields_input(&self, raw: Value) -> Result<Value> {
        Ok(raw)
    }

    /// Add derived fields once the schema checks passed.
    fn collect_fields_on_instantiation(&self, fields: Mapping) -> Result<Mapping> {
        Ok(fields)
    }

    /// Media URIs that must be resolvable.
    fn collect_media_uris(&self, _fields: &Mapping) -> Result<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }

    /// Media URIs that may fail to resolve.
    fn collect_optional_media_uris(&self, _fields: &Mapping) -> Result<BTreeSet<String>> {
        Ok(BTreeSet::new())
    }

    fn collect_steps_on_instantiation(&self, _fields: &Mapping, _steps: &mut StepCollector) {}

    /// Rewrite fields using resolved asset descriptors.
    fn collect_fields_after_resolution(
        &self,
        fields: Mapping,
        _resolver: &dyn Resolver,
    ) -> Result<Mapping> {
        Ok(fields)
    }

    fn collect_steps_after_resolution(&self, _fields: &Mapping, _steps: &mut StepCollector) {}

    fn derive_title_from_fields(&self, _fields: &Mapping) -> Option<String> {
        None
    }

    /// All text of a slide on one line. Defaults to the string fields
    /// joined by ` | `.
    fn derive_plain_text_from_fields(&self, fields: &Mapping) -> Option<String> {
        let texts: Vec<&str> = fields
            .values()
            .filter_map(Value::as_str)
            .filter(|text| !text.trim().is_empty())
            .collect();
        if texts.is_empty() {
            None
        } else {
            Some(texts.join(" | "))
        }
    }

    /// TeX markup for handouts.
    fn generate_markup(&self, _fields: &Mapping) -> Option<String> {
        None
    }
}

/// Fields after normalization, together with the URIs found inline
#[derive(Debug, Clone, Default)]
pub struct NormalizedFields {
    pub fields: Mapping,
    pub inline_media_uris: BTreeSet<String>,
}

/// A registered master
pub struct Master {
    spec: Box<dyn MasterSpec>,
}

impl std::fmt::Debug for Master {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Master").field("name", &self.name()).finish()
    }
}

impl PartialEq for Master {
    fn eq(&self, other: &Self) -> bool {
        self.name() == other.name()
    }
}

impl Serialize for Master {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl Master {
    pub fn new(spec: impl MasterSpec + 'static) -> Self {
        Self {
            spec: Box::new(spec),
        }
    }

    pub fn name(&self) -> &'static str {
        self.spec.name()
    }

    pub fn display_name(&self) -> &'static str {
        self.spec.display_name()
    }

    pub fn icon(&self) -> MasterIcon {
        self.spec.icon()
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.spec.fields()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|field| field.name == name)
    }

    pub fn short_form_field(&self) -> Option<&'static str> {
        self.spec.short_form_field()
    }

    /// Run the field contract on the payload of a slide.
    ///
    /// Order: short form, master normalization, unknown fields, defaults,
    /// required fields, types, validation, markup, inline URIs, asset URIs,
    /// derived fields.
    pub fn initialize_fields(
        &self,
        raw: Option<Value>,
        converter: &dyn MarkupConverter,
    ) -> Result<NormalizedFields> {
        let raw = self.expand_short_form(raw);
        let normalized = self.spec.normalize_fields_input(raw)?;
        let mut fields = match normalized {
            Value::Mapping(fields) => fields,
            other => {
                return Err(FieldContractError::NotAMapping {
                    master: self.name().to_string(),
                    raw: format_raw(&other),
                }
                .into())
            }
        };

        self.check_schema(&mut fields)?;

        let mut inline_media_uris = BTreeSet::new();
        for spec in self.fields() {
            let Some(value) = fields.shift_remove(spec.name) else {
                continue;
            };
            // Scanned before conversion: the HTML encodes brackets that are
            // not part of a plain reference token.
            if spec.inline_markup {
                extract_inline_uris_from_value(&value, &mut inline_media_uris);
            }
            let value = if spec.markup {
                convert_nested(value, converter)
            } else {
                value
            };
            if spec.asset_uri {
                self.check_asset_uri(spec, &value)?;
            }
            fields.insert(Value::from(spec.name), value);
        }

        let fields = self.spec.collect_fields_on_instantiation(fields)?;

        Ok(NormalizedFields {
            fields,
            inline_media_uris,
        })
    }

    fn expand_short_form(&self, raw: Option<Value>) -> Value {
        match raw {
            None | Some(Value::Null) => Value::Mapping(Mapping::new()),
            Some(value @ (Value::String(_) | Value::Number(_) | Value::Bool(_))) => {
                match self.short_form_field() {
                    Some(field) => {
                        let mut fields = Mapping::new();
                        fields.insert(Value::from(field), value);
                        Value::Mapping(fields)
                    }
                    None => value,
                }
            }
            Some(value) => value,
        }
    }

    /// Unknown fields, defaults, required fields, types and validation.
    fn check_schema(&self, fields: &mut Mapping) -> Result<()> {
        let master = self.name().to_string();
        let raw = format_raw(&Value::Mapping(fields.clone()));

        for key in fields.keys() {
            let known = key.as_str().and_then(|name| self.field(name)).is_some();
            if !known {
                return Err(FieldContractError::UnknownField {
                    master,
                    field: key.as_str().map(str::to_string).unwrap_or_else(|| format_raw(key)),
                    raw,
                }
                .into());
            }
        }

        for spec in self.fields() {
            if fields.get(spec.name).map_or(true, Value::is_null) {
                fields.shift_remove(spec.name);
                match spec.default {
                    Some(default) => {
                        fields.insert(Value::from(spec.name), default.to_value());
                    }
                    None if spec.required => {
                        return Err(FieldContractError::MandatoryField {
                            master,
                            field: spec.name.to_string(),
                            raw,
                        }
                        .into())
                    }
                    None => continue,
                }
            }

            let Some(value) = fields.get(spec.name) else {
                continue;
            };
            if !spec.accepts(value) {
                return Err(FieldContractError::WrongType {
                    master,
                    field: spec.name.to_string(),
                    expected: spec.type_names(),
                    value: format_raw(value),
                }
                .into());
            }
            if let Some(validate) = spec.validate {
                if !validate(value) {
                    return Err(FieldContractError::Validation {
                        master,
                        field: spec.name.to_string(),
                        value: format_raw(value),
                    }
                    .into());
                }
            }
        }

        Ok(())
    }

    fn check_asset_uri(&self, spec: &FieldSpec, value: &Value) -> Result<()> {
        let valid = match value {
            Value::String(uri) => MediaUri::check(uri),
            Value::Sequence(items) => items
                .iter()
                .all(|item| item.as_str().is_some_and(MediaUri::check)),
            _ => false,
        };
        if valid {
            Ok(())
        } else {
            Err(FieldContractError::InvalidAssetUri {
                master: self.name().to_string(),
                field: spec.name.to_string(),
                value: format_raw(value),
            }
            .into())
        }
    }

    /// Required media URIs of normalized fields, fragments removed.
    pub fn media_uris(&self, fields: &Mapping) -> Result<BTreeSet<String>> {
        Ok(strip_fragments(self.spec.collect_media_uris(fields)?))
    }

    /// Optional media URIs of normalized fields, fragments removed.
    pub fn optional_media_uris(&self, fields: &Mapping) -> Result<BTreeSet<String>> {
        Ok(strip_fragments(self.spec.collect_optional_media_uris(fields)?))
    }

    pub fn collect_steps_on_instantiation(&self, fields: &Mapping, steps: &mut StepCollector) {
        self.spec.collect_steps_on_instantiation(fields, steps)
    }

    pub fn collect_fields_after_resolution(
        &self,
        fields: Mapping,
        resolver: &dyn Resolver,
    ) -> Result<Mapping> {
        self.spec.collect_fields_after_resolution(fields, resolver)
    }

    pub fn collect_steps_after_resolution(&self, fields: &Mapping, steps: &mut StepCollector) {
        self.spec.collect_steps_after_resolution(fields, steps)
    }

    pub fn derive_title_from_fields(&self, fields: &Mapping) -> Option<String> {
        self.spec.derive_title_from_fields(fields)
    }

    pub fn derive_plain_text_from_fields(&self, fields: &Mapping) -> Option<String> {
        self.spec.derive_plain_text_from_fields(fields)
    }

    pub fn generate_markup(&self, fields: &Mapping) -> Option<String> {
        self.spec.generate_markup(fields)
    }
}

fn strip_fragments(uris: BTreeSet<String>) -> BTreeSet<String> {
    uris.iter()
        .map(|uri| remove_fragment(uri).to_string())
        .collect()
}

/// The fixed set of masters
pub struct MasterRegistry {
    masters: BTreeMap<&'static str, Master>,
}

static REGISTRY: LazyLock<MasterRegistry> = LazyLock::new(MasterRegistry::build);

/// The process wide registry.
pub fn registry() -> &'static MasterRegistry {
    &REGISTRY
}

impl MasterRegistry {
    fn build() -> Self {
        let masters = [
            Master::new(generic::GenericMaster),
            Master::new(task::TaskMaster),
            Master::new(quote::QuoteMaster),
            Master::new(question::QuestionMaster),
            Master::new(audio::AudioMaster),
            Master::new(image::ImageMaster),
            Master::new(video::VideoMaster),
            Master::new(youtube::YoutubeMaster),
            Master::new(sample_list::SampleListMaster),
            Master::new(person::PersonMaster),
            Master::new(wikipedia::WikipediaMaster),
            Master::new(counter::CounterMaster),
            Master::new(camera::CameraMaster),
        ];

        Self {
            masters: masters
                .into_iter()
                .map(|master| (master.name(), master))
                .collect(),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Master> {
        self.masters.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.masters.contains_key(name)
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.masters.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Master> {
        self.masters.values()
    }

    pub fn len(&self) -> usize {
        self.masters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masters.is_empty()
    }
}

/// A string field.
pub(crate) fn str_field<'a>(fields: &'a Mapping, name: &str) -> Option<&'a str> {
    fields.get(name).and_then(Value::as_str)
}

/// A boolean field, `false` if absent.
pub(crate) fn bool_field(fields: &Mapping, name: &str) -> bool {
    fields.get(name).and_then(Value::as_bool).unwrap_or(false)
}

/// An integer field.
pub(crate) fn int_field(fields: &Mapping, name: &str) -> Option<i64> {
    fields.get(name).and_then(Value::as_i64)
}

/// Set a field unless it already holds a value.
pub(crate) fn set_if_absent(fields: &mut Mapping, name: &str, value: impl Into<Value>) {
    if fields.get(name).map_or(true, Value::is_null) {
        fields.insert(Value::from(name), value.into());
    }
}

/// A single URI field as a set.
pub(crate) fn uri_set(fields: &Mapping, names: &[&str]) -> BTreeSet<String> {
    names
        .iter()
        .filter_map(|name| str_field(fields, name))
        .map(str::to_string)
        .collect()
}
