//! Field schemas of master slides.
//!
//! Every master declares its fields as a static list of `FieldSpec`s:
//!
//! ```ignore
//! const FIELDS: &[FieldSpec] = &[
//!     FieldSpec::new("src", "The media URI of the audio file.")
//!         .types(&[FieldType::String])
//!         .required()
//!         .asset_uri(),
//!     FieldSpec::new("autoplay", "Start playback when the slide is shown.")
//!         .types(&[FieldType::Boolean])
//!         .default_value(DefaultValue::Bool(false)),
//! ];
//! ```

use std::fmt;

use serde::Serialize;
use serde_yaml::Value;

/// Value types a field may hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Sequence,
    Mapping,
}

impl FieldType {
    /// Whether a value is of this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Integer => value.is_i64() || value.is_u64(),
            FieldType::Boolean => value.is_bool(),
            FieldType::Sequence => value.is_sequence(),
            FieldType::Mapping => value.is_mapping(),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Number => write!(f, "number"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Sequence => write!(f, "list"),
            FieldType::Mapping => write!(f, "mapping"),
        }
    }
}

/// A default value that can live in a `const` schema
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Integer(i64),
    Str(&'static str),
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Bool(value) => Value::from(value),
            DefaultValue::Integer(value) => Value::from(value),
            DefaultValue::Str(value) => Value::from(value),
        }
    }
}

impl Serialize for DefaultValue {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_value().serialize(serializer)
    }
}

/// The contract of one field
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FieldSpec {
    pub name: &'static str,

    /// Shown by `lectern masters`
    pub description: &'static str,

    /// Allowed types, empty means any
    pub types: &'static [FieldType],

    pub required: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,

    /// Convert Markdown to HTML
    pub markup: bool,

    /// The value is a media URI (or a list of them) and must be valid
    pub asset_uri: bool,

    /// Scan for inline references like `[ref:Beethoven]`
    pub inline_markup: bool,

    #[serde(skip)]
    pub validate: Option<fn(&Value) -> bool>,
}

impl FieldSpec {
    pub const fn new(name: &'static str, description: &'static str) -> Self {
        Self {
            name,
            description,
            types: &[],
            required: false,
            default: None,
            markup: false,
            asset_uri: false,
            inline_markup: false,
            validate: None,
        }
    }

    pub const fn types(mut self, types: &'static [FieldType]) -> Self {
        self.types = types;
        self
    }

    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub const fn default_value(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn markup(mut self) -> Self {
        self.markup = true;
        self
    }

    pub const fn asset_uri(mut self) -> Self {
        self.asset_uri = true;
        self
    }

    pub const fn inline_markup(mut self) -> Self {
        self.inline_markup = true;
        self
    }

    pub const fn validate(mut self, validate: fn(&Value) -> bool) -> Self {
        self.validate = Some(validate);
        self
    }

    /// Whether a value satisfies the declared types.
    pub fn accepts(&self, value: &Value) -> bool {
        self.types.is_empty() || self.types.iter().any(|t| t.matches(value))
    }

    /// `string or list`
    pub fn type_names(&self) -> String {
        self.types
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" or ")
    }
}
