//! Declarative parameter validation
//!
//! `validate_parameters` checks a parameter bag against a handler's schema.
//! It never fails: every problem becomes a human-readable message and all of
//! them are returned together so a client can fix its input in one round trip.

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::model::{ParameterSchema, ValidationRules};

/// Outcome of a validation pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationResult {
    /// A passing result
    pub fn ok() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
        }
    }

    /// Valid iff `errors` is empty
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    pub fn invalid(error: impl Into<String>) -> Self {
        Self::from_errors(vec![error.into()])
    }

    /// Append another result's errors
    pub fn merge(mut self, other: ValidationResult) -> Self {
        self.errors.extend(other.errors);
        self.valid = self.valid && other.valid && self.errors.is_empty();
        self
    }
}

/// Validate `input` against `schema`
///
/// Per entry: a missing required key is reported and nothing else is checked;
/// an absent or null optional value is accepted; a type mismatch is reported
/// and the rules are skipped; otherwise every applicable rule is evaluated.
pub fn validate_parameters(schema: &[ParameterSchema], input: &Map<String, Value>) -> ValidationResult {
    let mut errors = Vec::new();

    for param in schema {
        let value = match input.get(&param.name) {
            None if param.required => {
                errors.push(format!("Missing required parameter: {}", param.name));
                continue;
            }
            None | Some(Value::Null) => continue,
            Some(value) => value,
        };

        if !param.param_type.matches(value) {
            errors.push(format!(
                "Parameter '{}' must be of type {}",
                param.name, param.param_type
            ));
            continue;
        }

        if let Some(rules) = &param.validation {
            check_rules(&param.name, value, rules, &mut errors);
        }
    }

    ValidationResult::from_errors(errors)
}

fn check_rules(name: &str, value: &Value, rules: &ValidationRules, errors: &mut Vec<String>) {
    if let Some(min) = rules.min {
        match measure(value) {
            Some(Measure::Number(n)) if n < min => {
                errors.push(format!("Parameter '{name}' must be at least {min}"));
            }
            Some(Measure::Chars(len)) if (len as f64) < min => {
                errors.push(format!("Parameter '{name}' must be at least {min} characters"));
            }
            Some(Measure::Items(len)) if (len as f64) < min => {
                errors.push(format!("Parameter '{name}' must have at least {min} items"));
            }
            _ => {}
        }
    }

    if let Some(max) = rules.max {
        match measure(value) {
            Some(Measure::Number(n)) if n > max => {
                errors.push(format!("Parameter '{name}' must be at most {max}"));
            }
            Some(Measure::Chars(len)) if (len as f64) > max => {
                errors.push(format!("Parameter '{name}' must be at most {max} characters"));
            }
            Some(Measure::Items(len)) if (len as f64) > max => {
                errors.push(format!("Parameter '{name}' must have at most {max} items"));
            }
            _ => {}
        }
    }

    if let (Some(pattern), Some(text)) = (&rules.pattern, value.as_str()) {
        // An uncompilable pattern rejects the value.
        let matched = Regex::new(pattern).is_ok_and(|re| re.is_match(text));
        if !matched {
            errors.push(format!("Parameter '{name}' does not match required pattern"));
        }
    }

    if let Some(allowed) = &rules.allowed {
        if !allowed.iter().any(|candidate| same_value(candidate, value)) {
            let listed: Vec<String> = allowed.iter().map(display_value).collect();
            errors.push(format!(
                "Parameter '{name}' must be one of: {}",
                listed.join(", ")
            ));
        }
    }
}

enum Measure {
    Number(f64),
    Chars(usize),
    Items(usize),
}

fn measure(value: &Value) -> Option<Measure> {
    match value {
        Value::Number(n) => n.as_f64().map(Measure::Number),
        Value::String(s) => Some(Measure::Chars(s.chars().count())),
        Value::Array(items) => Some(Measure::Items(items.len())),
        _ => None,
    }
}

/// Numbers compare by value so `5.0` is a member of `[5, 6]`
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
