//! Model validation: the validator seam used before create/update, plus a rule-based implementation.

use crate::error::ConfigError;
use crate::model::ApiModel;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::marker::PhantomData;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Outcome of validating one model. Empty `errors` means valid.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ValidationResult {
    pub errors: Vec<FieldError>,
}

impl ValidationResult {
    pub fn valid() -> Self {
        ValidationResult::default()
    }

    pub fn from_errors(errors: Vec<FieldError>) -> Self {
        ValidationResult { errors }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }
}

/// Validates a decoded model before it reaches a creator or updater.
pub trait ModelValidator<T>: Send + Sync {
    fn validate(&self, model: &T) -> ValidationResult;
}

/// Delegates to [`ApiModel::validate`]. Used when a resource has no explicit validator.
pub struct DefaultValidator;

impl<T: ApiModel> ModelValidator<T> for DefaultValidator {
    fn validate(&self, model: &T) -> ValidationResult {
        model.validate()
    }
}

/// Per-field rules, applied to the serialized JSON form of the model.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ValidationRule {
    #[serde(default)]
    pub required: Option<bool>,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default)]
    pub max_length: Option<u32>,
    #[serde(default)]
    pub min_length: Option<u32>,
    #[serde(default)]
    pub pattern: Option<String>,
    #[serde(default)]
    pub allowed: Option<Vec<Value>>,
    #[serde(default)]
    pub minimum: Option<f64>,
    #[serde(default)]
    pub maximum: Option<f64>,
}

struct CompiledRule {
    field: String,
    rule: ValidationRule,
    pattern: Option<Regex>,
}

pub struct RuleValidator<T> {
    rules: Vec<CompiledRule>,
    _model: PhantomData<fn(&T)>,
}

impl<T> Default for RuleValidator<T> {
    fn default() -> Self {
        RuleValidator {
            rules: Vec::new(),
            _model: PhantomData,
        }
    }
}

impl<T> RuleValidator<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule for `field` (the serialized field name). Fails on an invalid regex pattern.
    pub fn rule(mut self, field: impl Into<String>, rule: ValidationRule) -> Result<Self, ConfigError> {
        let field = field.into();
        let pattern = match &rule.pattern {
            Some(p) => Some(
                Regex::new(p).map_err(|e| ConfigError::InvalidArgument(format!("invalid pattern for {}: {}", field, e)))?,
            ),
            None => None,
        };
        self.rules.push(CompiledRule { field, rule, pattern });
        Ok(self)
    }
}

impl<T: Serialize> RuleValidator<T> {
    fn check(&self, body: &serde_json::Map<String, Value>) -> ValidationResult {
        let mut result = ValidationResult::valid();
        for compiled in &self.rules {
            let col = compiled.field.as_str();
            let val = body.get(col);
            if compiled.rule.required == Some(true) && (val.is_none() || val == Some(&Value::Null)) {
                result.push(col, format!("{} is required", col));
                continue;
            }
            if let Some(v) = val {
                if let Some(message) = validate_field(col, v, compiled) {
                    result.push(col, message);
                }
            }
        }
        result
    }
}

impl<T: Serialize> ModelValidator<T> for RuleValidator<T> {
    fn validate(&self, model: &T) -> ValidationResult {
        match serde_json::to_value(model) {
            Ok(Value::Object(map)) => self.check(&map),
            Ok(_) => ValidationResult::from_errors(vec![FieldError::new("", "model must serialize to a JSON object")]),
            Err(e) => ValidationResult::from_errors(vec![FieldError::new("", format!("model could not be serialized: {}", e))]),
        }
    }
}

fn validate_field(col: &str, v: &Value, compiled: &CompiledRule) -> Option<String> {
    if v.is_null() {
        return None;
    }
    let rule = &compiled.rule;
    if let Some(format) = &rule.format {
        if let Some(message) = validate_format(col, v, format) {
            return Some(message);
        }
    }
    if let Some(s) = v.as_str() {
        let len = s.chars().count();
        if let Some(max) = rule.max_length {
            if len > max as usize {
                return Some(format!("{} must be at most {} characters", col, max));
            }
        }
        if let Some(min) = rule.min_length {
            if len < min as usize {
                return Some(format!("{} must be at least {} characters", col, min));
            }
        }
        if let Some(re) = &compiled.pattern {
            if !re.is_match(s) {
                return Some(format!("{} does not match required pattern", col));
            }
        }
    }
    if let Some(ref allowed) = rule.allowed {
        if !allowed.iter().any(|a| value_eq(v, a)) {
            return Some(format!(
                "{} must be one of: {:?}",
                col,
                allowed.iter().take(5).collect::<Vec<_>>()
            ));
        }
    }
    if let Some(n) = v.as_f64() {
        if let Some(min) = rule.minimum {
            if n < min {
                return Some(format!("{} must be at least {}", col, min));
            }
        }
        if let Some(max) = rule.maximum {
            if n > max {
                return Some(format!("{} must be at most {}", col, max));
            }
        }
    }
    None
}

fn value_eq(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::String(s), Value::String(t)) => s == t,
        (Value::Number(n), Value::Number(m)) => n.as_f64() == m.as_f64(),
        _ => a == b,
    }
}

fn validate_format(col: &str, v: &Value, format: &str) -> Option<String> {
    let s = v.as_str()?;
    match format.to_lowercase().as_str() {
        "email" if !s.contains('@') || s.len() < 3 => Some(format!("{} must be a valid email", col)),
        "uuid" if uuid::Uuid::parse_str(s).is_err() => Some(format!("{} must be a valid UUID", col)),
        _ => None,
    }
}
