//! Fuzzy media references.
//!
//! Authors may reference media in several ways:
//!
//! ```yaml
//! samples: ref:Fuer-Elise_HB
//! samples: ref:Fuer-Elise_HB Für Elise
//! samples: Für Elise ref:Fuer-Elise_HB#complete
//! samples:
//!   - uri: ref:Fuer-Elise_HB
//!     title: Für Elise
//!   - ref:Mondschein_HB#1 First movement
//! ```
//!
//! All of them end up as an ordered list of `WrappedUri`s.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::core::DataCutter;
use crate::error::{format_raw, Result, UriError};

use super::uri::{remove_fragment, MEDIA_URI_REGEX};

static WHITESPACE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s{2,}").unwrap());

/// Titles that explicitly mean "no title".
const NO_TITLE_MARKERS: &[&str] = &[".", "none"];

/// A media URI with an optional human readable title
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrappedUri {
    /// The media URI, fragment included
    pub uri: String,

    /// Custom title set by the author
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl WrappedUri {
    /// Create a wrapped URI.
    pub fn new(uri: impl Into<String>, title: Option<String>) -> Self {
        Self {
            uri: uri.into(),
            title,
        }
    }

    /// Parse the string form: the first URI in the text, the rest is the title.
    pub fn from_text(spec: &str) -> std::result::Result<Self, UriError> {
        let found = MEDIA_URI_REGEX
            .find(spec)
            .ok_or_else(|| UriError::NotFound(spec.to_string()))?;

        let rest = format!("{}{}", &spec[..found.start()], &spec[found.end()..]);
        let rest = WHITESPACE_REGEX.replace_all(rest.trim(), " ").to_string();
        let title = if rest.is_empty() || NO_TITLE_MARKERS.contains(&rest.as_str()) {
            None
        } else {
            Some(rest)
        };

        Ok(Self::new(found.as_str(), title))
    }

    /// Parse the mapping form `{ uri, title }`. Other keys are rejected.
    pub fn from_mapping(raw: &Value) -> Result<Self> {
        let mut data = DataCutter::new("media URI", raw)?;
        let uri = data.cut_string_not_null("uri")?;
        let title = data.cut_string("title")?;
        data.check_empty()?;
        Ok(Self::new(uri, title))
    }

    fn from_value(raw: &Value) -> Result<Self> {
        match raw {
            Value::String(spec) => Ok(Self::from_text(spec)?),
            Value::Mapping(_) => Self::from_mapping(raw),
            other => Err(UriError::UnsupportedSpec(format_raw(other)).into()),
        }
    }

    /// The title set by the author, or the URI itself.
    pub fn title_or_uri(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.uri)
    }

    /// Convert back into a loosely typed value.
    pub fn to_value(&self) -> Value {
        let mut map = Mapping::new();
        map.insert(Value::from("uri"), Value::from(self.uri.as_str()));
        if let Some(title) = &self.title {
            map.insert(Value::from("title"), Value::from(title.as_str()));
        }
        Value::Mapping(map)
    }
}

/// An ordered list of wrapped URIs
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FuzzyUriList {
    entries: Vec<WrappedUri>,
}

impl FuzzyUriList {
    /// Parse a string, a `{uri, title}` mapping or a list mixing both.
    pub fn parse(raw: &Value) -> Result<Self> {
        let entries = match raw {
            Value::Sequence(items) => items
                .iter()
                .map(WrappedUri::from_value)
                .collect::<Result<Vec<_>>>()?,
            other => vec![WrappedUri::from_value(other)?],
        };
        Ok(Self { entries })
    }

    /// Build a list from already wrapped URIs.
    pub fn from_entries(entries: Vec<WrappedUri>) -> Self {
        Self { entries }
    }

    /// The entries in input order, duplicates and fragments preserved.
    pub fn entries(&self) -> &[WrappedUri] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, WrappedUri> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The URIs to resolve: fragments removed, duplicates dropped.
    pub fn uris(&self) -> BTreeSet<String> {
        self.entries
            .iter()
            .map(|entry| remove_fragment(&entry.uri).to_string())
            .collect()
    }

    /// Convert into a sequence of `{uri, title}` mappings.
    pub fn to_value(&self) -> Value {
        Value::Sequence(self.entries.iter().map(WrappedUri::to_value).collect())
    }
}

impl<'a> IntoIterator for &'a FuzzyUriList {
    type Item = &'a WrappedUri;
    type IntoIter = std::slice::Iter<'a, WrappedUri>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Collect the URIs of a fuzzy specification without keeping the titles.
pub fn extract_uris_from_fuzzy_specs(raw: &Value) -> Result<BTreeSet<String>> {
    Ok(FuzzyUriList::parse(raw)?.uris())
}
