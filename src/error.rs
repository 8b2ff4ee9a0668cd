//! Error types for presentation parsing.
//!
//! Parsing errors are grouped the same way a content author has to fix them:
//! - `StructuralError`: the shape of the document is wrong
//! - `FieldContractError`: a master's field schema is violated
//! - `UriError`: a media reference cannot be understood
//!
//! Resolution errors cross the async boundary as `anyhow::Error`.

use serde_yaml::Value;
use thiserror::Error;

/// Result type alias using the umbrella parse error.
pub type Result<T> = std::result::Result<T, Error>;

/// Serialize a raw record into one line so an author can find it in the file.
pub fn format_raw(raw: &Value) -> String {
    serde_json::to_string(raw).unwrap_or_else(|_| format!("{:?}", raw))
}

/// Umbrella error for everything that can go wrong while parsing.
#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Structural(#[from] StructuralError),

    #[error(transparent)]
    FieldContract(#[from] FieldContractError),

    #[error(transparent)]
    Uri(#[from] UriError),

    /// The input is not valid YAML.
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Malformed document shape.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StructuralError {
    #[error("No master slide found: {raw}")]
    NoMaster { raw: String },

    #[error("Ambiguous master ({masters}), each slide must have exactly one master slide: {raw}")]
    AmbiguousMaster { masters: String, raw: String },

    #[error("The property “slides” must not be null or empty")]
    SlidesMissing,

    #[error("Unknown {context} property {keys}: {raw}")]
    UnknownProperty {
        context: String,
        keys: String,
        raw: String,
    },

    #[error("The {context} must be a mapping: {raw}")]
    NotAMapping { context: String, raw: String },

    #[error("The {context} property “{key}” must not be null: {raw}")]
    MissingKey {
        context: String,
        key: String,
        raw: String,
    },

    #[error("The {context} property “{key}” has to be a {expected}: {raw}")]
    WrongType {
        context: String,
        key: String,
        expected: &'static str,
        raw: String,
    },

    #[error("Unknown slide state “{state}”, only “absent” is allowed: {raw}")]
    UnknownState { state: String, raw: String },

    #[error("A reference abbreviation “ref:./” was found, but the presentation has no “ref” meta information")]
    RefAbbreviationWithoutRef,
}

/// Schema violation inside one master's fields.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldContractError {
    #[error("The master slide “{master}” has no field named “{field}”: {raw}")]
    UnknownField {
        master: String,
        field: String,
        raw: String,
    },

    #[error("A field named “{field}” is mandatory for the master slide “{master}”: {raw}")]
    MandatoryField {
        master: String,
        field: String,
        raw: String,
    },

    #[error("The field “{field}” of the master slide “{master}” has to be of type {expected}: {value}")]
    WrongType {
        master: String,
        field: String,
        expected: String,
        value: String,
    },

    #[error("The field “{field}” of the master slide “{master}” failed validation: {value}")]
    Validation {
        master: String,
        field: String,
        value: String,
    },

    #[error("The field “{field}” of the master slide “{master}” contains an invalid media URI: {value}")]
    InvalidAssetUri {
        master: String,
        field: String,
        value: String,
    },

    #[error("The fields of the master slide “{master}” must be a mapping after normalization: {raw}")]
    NotAMapping { master: String, raw: String },

    #[error("The master slide “{master}” rejected its input: {message}: {raw}")]
    Input {
        master: String,
        message: String,
        raw: String,
    },
}

/// A media reference that cannot be understood.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UriError {
    #[error("No media URI found in “{0}”")]
    NotFound(String),

    #[error("The media URI is not valid: {0}")]
    Invalid(String),

    #[error("A media URI specification has to be a string, a mapping or a list: {0}")]
    UnsupportedSpec(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_raw_is_single_line() {
        let raw: Value = serde_yaml::from_str("generic:\n  markup: Hello\n").unwrap();
        assert_eq!(format_raw(&raw), r#"{"generic":{"markup":"Hello"}}"#);
    }

    #[test]
    fn test_structural_error_message_embeds_raw() {
        let err = StructuralError::NoMaster {
            raw: r#"{"unknown":1}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"No master slide found: {"unknown":1}"#);
    }

    #[test]
    fn test_umbrella_is_transparent() {
        let err: Error = FieldContractError::MandatoryField {
            master: "audio".to_string(),
            field: "src".to_string(),
            raw: "{}".to_string(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "A field named “src” is mandatory for the master slide “audio”: {}"
        );
    }
}
