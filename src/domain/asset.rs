//! Media asset descriptors as delivered by a resolver.
//!
//! The engine never produces these itself; a `Resolver` fills them in and
//! the masters read them during the second resolution phase.

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use super::uri::remove_fragment;

/// A resolved media asset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Asset {
    /// Reference without scheme, e.g. `Fuer-Elise_HB`
    #[serde(rename = "ref")]
    pub reference: String,

    /// Stable identifier without scheme
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,

    /// Human readable title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Named parts of the asset (samples of an audio file, pages of a document)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub samples: Vec<Sample>,

    /// Any further metadata (composer, artist, birth, ...)
    #[serde(default, skip_serializing_if = "Mapping::is_empty")]
    pub meta: Mapping,
}

impl Asset {
    /// Create an asset with a reference and a title.
    pub fn new(reference: impl Into<String>, title: Option<&str>) -> Self {
        Self {
            reference: reference.into(),
            uuid: None,
            title: title.map(str::to_string),
            samples: Vec::new(),
            meta: Mapping::new(),
        }
    }

    /// Attach a sample.
    pub fn with_sample(mut self, reference: impl Into<String>, title: Option<&str>) -> Self {
        self.samples.push(Sample {
            reference: reference.into(),
            title: title.map(str::to_string),
        });
        self
    }

    /// Attach a metadata entry.
    pub fn with_meta(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.meta.insert(Value::from(key), value.into());
        self
    }

    /// `ref:<reference>`
    pub fn ref_uri(&self) -> String {
        format!("ref:{}", self.reference)
    }

    /// `uuid:<uuid>` if the asset has one
    pub fn uuid_uri(&self) -> Option<String> {
        self.uuid.as_ref().map(|uuid| format!("uuid:{}", uuid))
    }

    /// Whether a URI (fragment ignored) points to this asset.
    pub fn matches(&self, uri: &str) -> bool {
        let uri = remove_fragment(uri);
        uri == self.ref_uri() || self.uuid_uri().as_deref() == Some(uri)
    }

    /// Look up a sample by the fragment of a URI.
    pub fn sample(&self, reference: &str) -> Option<&Sample> {
        self.samples.iter().find(|sample| sample.reference == reference)
    }

    /// A string metadata entry.
    pub fn meta_str(&self, key: &str) -> Option<&str> {
        self.meta.get(key).and_then(Value::as_str)
    }
}

/// A named part of an asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Fragment used to select the sample, e.g. `complete`
    #[serde(rename = "ref")]
    pub reference: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}
