//! Declarative parameter schema
//!
//! Each handler owns a list of `ParameterSchema` entries describing its input
//! bag. Schemas are immutable once the handler is built and are exported
//! verbatim by the documentation surface.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Declared type of a parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    /// A type name this build does not know; no type check is performed
    #[serde(other)]
    Unknown,
}

impl ParamType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamType::String => "string",
            ParamType::Number => "number",
            ParamType::Boolean => "boolean",
            ParamType::Object => "object",
            ParamType::Array => "array",
            ParamType::Unknown => "unknown",
        }
    }

    /// Whether `value` has this type. `Unknown` accepts everything.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            ParamType::String => value.is_string(),
            ParamType::Number => value.as_f64().is_some_and(|n| !n.is_nan()),
            ParamType::Boolean => value.is_boolean(),
            ParamType::Object => value.is_object(),
            ParamType::Array => value.is_array(),
            ParamType::Unknown => true,
        }
    }
}

impl std::fmt::Display for ParamType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Range, pattern and enumeration rules for one parameter
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationRules {
    /// Lower bound: numeric value, string length in characters, or array length
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    /// Upper bound, same interpretation as `min`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    /// Regular expression a string value must match (unanchored)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pattern: Option<String>,
    /// Allowed values
    #[serde(
        default,
        rename = "enum",
        skip_serializing_if = "Option::is_none"
    )]
    pub allowed: Option<Vec<Value>>,
}

/// Description of one parameter of a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,
    #[serde(rename = "type")]
    pub param_type: ParamType,
    pub required: bool,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub validation: Option<ValidationRules>,
}

impl ParameterSchema {
    /// An optional parameter with no rules
    pub fn new(name: impl Into<String>, param_type: ParamType) -> Self {
        Self {
            name: name.into(),
            param_type,
            required: false,
            description: String::new(),
            validation: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Number)
    }

    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Boolean)
    }

    pub fn object(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Object)
    }

    pub fn array(name: impl Into<String>) -> Self {
        Self::new(name, ParamType::Array)
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.rules_mut().min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.rules_mut().max = Some(max);
        self
    }

    pub fn pattern(mut self, pattern: impl Into<String>) -> Self {
        self.rules_mut().pattern = Some(pattern.into());
        self
    }

    /// Restrict the value to one of `allowed`
    pub fn one_of<I, V>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.rules_mut().allowed = Some(allowed.into_iter().map(Into::into).collect());
        self
    }

    fn rules_mut(&mut self) -> &mut ValidationRules {
        self.validation.get_or_insert_with(ValidationRules::default)
    }
}
