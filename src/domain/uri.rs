//! Media URIs.
//!
//! A media URI has the form `scheme:authority[#fragment]`, for example
//! `ref:Fuer-Elise_HB#complete` or `uuid:c262fe9b-c705-43fd-a5d4-4bb38178d9e7`.
//! The optional fragment selects a sample of the asset.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use regex::Regex;
use serde_yaml::Value;

use crate::error::UriError;

/// Recognized URI schemes.
pub const SCHEMES: &[&str] = &["ref", "uuid"];

/// The unanchored grammar, used to find a URI inside free text.
pub static MEDIA_URI_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(?P<uri>(?P<scheme>ref|uuid):(?P<authority>[a-zA-Z0-9_-]+)(?:#(?P<fragment>[a-zA-Z0-9_,-]+))?)",
    )
    .unwrap()
});

/// The anchored grammar, used to validate a value that must be a URI.
static MEDIA_URI_STRICT_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:ref|uuid):[a-zA-Z0-9_-]+(?:#[a-zA-Z0-9_,-]+)?$").unwrap()
});

/// Inline reference tokens inside markup, e.g. `[ref:Beethoven caption="Bonn"]`.
pub(crate) static INLINE_REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"\[(?P<uri>(?:ref|uuid):[a-zA-Z0-9_-]+(?:#[a-zA-Z0-9_,-]+)?)(?:\s+[^\]]*)?\]"#,
    )
    .unwrap()
});

/// A parsed media URI
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUri {
    /// The URI as written, including the fragment
    pub raw: String,

    /// `ref` or `uuid`
    pub scheme: String,

    /// The part between scheme and fragment
    pub authority: String,

    /// The sample selector after `#`
    pub fragment: Option<String>,
}

impl MediaUri {
    /// Parse a string that must consist of exactly one media URI.
    pub fn parse(uri: &str) -> Result<Self, UriError> {
        if !Self::check(uri) {
            return Err(UriError::Invalid(uri.to_string()));
        }
        let caps = MEDIA_URI_REGEX
            .captures(uri)
            .ok_or_else(|| UriError::Invalid(uri.to_string()))?;

        Ok(Self {
            raw: uri.to_string(),
            scheme: caps["scheme"].to_string(),
            authority: caps["authority"].to_string(),
            fragment: caps.name("fragment").map(|m| m.as_str().to_string()),
        })
    }

    /// Check whether the whole string is a valid media URI.
    pub fn check(uri: &str) -> bool {
        MEDIA_URI_STRICT_REGEX.is_match(uri)
    }

    /// Return the URI unchanged if valid.
    pub fn validate(uri: &str) -> Result<&str, UriError> {
        if Self::check(uri) {
            Ok(uri)
        } else {
            Err(UriError::Invalid(uri.to_string()))
        }
    }

    /// The URI without its fragment, e.g. `ref:Yesterday`
    pub fn without_fragment(&self) -> String {
        format!("{}:{}", self.scheme, self.authority)
    }

    /// Build a URI from its parts.
    pub fn compose(scheme: &str, authority: &str, fragment: Option<&str>) -> String {
        match fragment {
            Some(fragment) if !fragment.is_empty() => {
                format!("{}:{}#{}", scheme, authority, fragment)
            }
            _ => format!("{}:{}", scheme, authority),
        }
    }
}

/// Split `ref:Alla-Turca#complete` into `("ref:Alla-Turca", Some("complete"))`.
pub fn split_by_fragment(uri: &str) -> (&str, Option<&str>) {
    match uri.split_once('#') {
        Some((prefix, fragment)) if !prefix.is_empty() => (prefix, Some(fragment)),
        _ => (uri, None),
    }
}

/// Remove the `#fragment` suffix.
pub fn remove_fragment(uri: &str) -> &str {
    split_by_fragment(uri).0
}

/// Remove the scheme prefix: `ref:Fuer-Elise` becomes `Fuer-Elise`.
pub fn remove_scheme(uri: &str) -> &str {
    SCHEMES
        .iter()
        .find_map(|scheme| {
            uri.strip_prefix(scheme)
                .and_then(|rest| rest.strip_prefix(':'))
        })
        .unwrap_or(uri)
}

/// Collect the URIs of all inline reference tokens in a text.
pub fn extract_inline_uris(text: &str, uris: &mut BTreeSet<String>) {
    for caps in INLINE_REFERENCE_REGEX.captures_iter(text) {
        uris.insert(remove_fragment(&caps["uri"]).to_string());
    }
}

/// Walk a value recursively and collect the inline reference tokens of all strings.
pub fn extract_inline_uris_from_value(value: &Value, uris: &mut BTreeSet<String>) {
    match value {
        Value::String(text) => extract_inline_uris(text, uris),
        Value::Sequence(items) => {
            for item in items {
                extract_inline_uris_from_value(item, uris);
            }
        }
        Value::Mapping(map) => {
            for item in map.values() {
                extract_inline_uris_from_value(item, uris);
            }
        }
        Value::Tagged(tagged) => extract_inline_uris_from_value(&tagged.value, uris),
        _ => {}
    }
}

/// Find media URIs recursively: every string that is a URI counts.
/// Fragments are removed.
pub fn find_media_uris(value: &Value, uris: &mut BTreeSet<String>) {
    match value {
        Value::String(text) => {
            if MediaUri::check(text) {
                uris.insert(remove_fragment(text).to_string());
            }
        }
        Value::Sequence(items) => {
            for item in items {
                find_media_uris(item, uris);
            }
        }
        Value::Mapping(map) => {
            for item in map.values() {
                find_media_uris(item, uris);
            }
        }
        Value::Tagged(tagged) => find_media_uris(&tagged.value, uris),
        _ => {}
    }
}
