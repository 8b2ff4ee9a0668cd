//! Consume-and-verify access to loosely typed records.
//!
//! Every parsing stage cuts the keys it understands out of a `DataCutter`
//! and finally calls `check_empty()`. Whatever is left over is a typo or
//! an unsupported property and becomes an error instead of silently
//! dropped data.

use serde_yaml::{Mapping, Number, Value};

use crate::error::{format_raw, StructuralError};

/// A record whose keys are removed as they are read
#[derive(Debug, Clone)]
pub struct DataCutter {
    /// Label used in error messages (`presentation`, `meta`, `slide`, ...)
    context: String,

    /// The record as it was handed over, for error messages
    raw: Value,

    /// The keys not consumed yet
    data: Mapping,
}

impl DataCutter {
    /// Wrap a raw value. The value has to be a mapping.
    pub fn new(context: impl Into<String>, raw: &Value) -> Result<Self, StructuralError> {
        let context = context.into();
        match raw {
            Value::Mapping(map) => Ok(Self {
                context,
                raw: raw.clone(),
                data: map.clone(),
            }),
            _ => Err(StructuralError::NotAMapping {
                context,
                raw: format_raw(raw),
            }),
        }
    }

    /// Wrap an already destructured mapping.
    pub fn from_mapping(context: impl Into<String>, data: Mapping) -> Self {
        Self {
            context: context.into(),
            raw: Value::Mapping(data.clone()),
            data,
        }
    }

    /// The record as it was before any key was cut.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// The string keys not consumed yet, in document order.
    pub fn keys(&self) -> Vec<String> {
        self.data
            .keys()
            .map(|key| match key {
                Value::String(key) => key.clone(),
                other => format_raw(other),
            })
            .collect()
    }

    /// Whether a key is still present.
    pub fn contains(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// Remove and return a value. Absent keys and explicit nulls yield `None`.
    pub fn cut(&mut self, key: &str) -> Option<Value> {
        match self.data.shift_remove(key) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Remove a value that has to be present.
    pub fn cut_not_null(&mut self, key: &str) -> Result<Value, StructuralError> {
        self.cut(key).ok_or_else(|| self.missing(key))
    }

    /// Remove an optional string value.
    pub fn cut_string(&mut self, key: &str) -> Result<Option<String>, StructuralError> {
        match self.cut(key) {
            None => Ok(None),
            Some(Value::String(value)) => Ok(Some(value)),
            Some(_) => Err(self.wrong_type(key, "string")),
        }
    }

    /// Remove a string value that has to be present.
    pub fn cut_string_not_null(&mut self, key: &str) -> Result<String, StructuralError> {
        self.cut_string(key)?.ok_or_else(|| self.missing(key))
    }

    /// Remove an optional number value.
    pub fn cut_number(&mut self, key: &str) -> Result<Option<Number>, StructuralError> {
        match self.cut(key) {
            None => Ok(None),
            Some(Value::Number(value)) => Ok(Some(value)),
            Some(_) => Err(self.wrong_type(key, "number")),
        }
    }

    /// Remove a number value that has to be present.
    pub fn cut_number_not_null(&mut self, key: &str) -> Result<Number, StructuralError> {
        self.cut_number(key)?.ok_or_else(|| self.missing(key))
    }

    /// Whether all keys have been consumed.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Fail if any key has not been consumed.
    pub fn check_empty(&self) -> Result<(), StructuralError> {
        if self.is_empty() {
            return Ok(());
        }
        let keys = self
            .keys()
            .iter()
            .map(|key| format!("“{}”", key))
            .collect::<Vec<_>>()
            .join(", ");
        Err(StructuralError::UnknownProperty {
            context: self.context.clone(),
            keys,
            raw: format_raw(&self.raw),
        })
    }

    fn missing(&self, key: &str) -> StructuralError {
        StructuralError::MissingKey {
            context: self.context.clone(),
            key: key.to_string(),
            raw: format_raw(&self.raw),
        }
    }

    fn wrong_type(&self, key: &str, expected: &'static str) -> StructuralError {
        StructuralError::WrongType {
            context: self.context.clone(),
            key: key.to_string(),
            expected,
            raw: format_raw(&self.raw),
        }
    }
}
