//! Parameter value validation
//!
//! One routine per declared kind. Each takes the definition, the raw JSON
//! value and the bound escape capability, and returns the value to
//! substitute.
//!
//! Common rules:
//! - An optional definition accepts `null` (and, for list-capable enums, an
//!   empty list) and yields an empty result without further checks.
//! - Dates are returned exactly as supplied; parsing only decides validity.
//! - Text and enum values are escaped when the definition asks for it and the
//!   capability supports it.

use std::collections::HashSet;

use serde_json::{json, Value};

use crate::dropdown::{dropdown_values, stringify_value, DropdownError, QueryResultSource};

use super::dates::is_date_literal;
use super::errors::{ValidationError, ValidationResult};
use super::escape::EscapeCapability;
use super::types::{ParameterDefinition, ParameterKind};

/// Where the allowed values of an enum-like parameter come from
pub trait OptionsSource {
    /// Returns the allowed values for `definition`
    fn allowed_values(&self, definition: &ParameterDefinition) -> Result<Vec<String>, DropdownError>;
}

/// Options declared on the definition itself
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticOptions;

impl OptionsSource for StaticOptions {
    fn allowed_values(&self, definition: &ParameterDefinition) -> Result<Vec<String>, DropdownError> {
        Ok(definition.enum_values())
    }
}

/// Options taken from the latest result of the definition's `queryId`
#[derive(Clone, Copy)]
pub struct DropdownOptions<'a> {
    source: Option<&'a dyn QueryResultSource>,
    org: Option<&'a str>,
}

impl<'a> DropdownOptions<'a> {
    pub fn new(source: Option<&'a dyn QueryResultSource>, org: Option<&'a str>) -> Self {
        Self { source, org }
    }
}

impl OptionsSource for DropdownOptions<'_> {
    fn allowed_values(&self, definition: &ParameterDefinition) -> Result<Vec<String>, DropdownError> {
        let query_id = definition
            .query_id
            .ok_or_else(|| DropdownError::MissingQueryId {
                name: definition.name.clone(),
            })?;
        let source = self.source.ok_or_else(|| DropdownError::NoResultSource {
            name: definition.name.clone(),
        })?;

        Ok(dropdown_values(source, query_id, self.org)?
            .into_iter()
            .map(|option| option.value)
            .collect())
    }
}

/// Validates values against their definitions.
///
/// Borrows the collaborators of one parameterized query for the duration of
/// a single `apply` call.
#[derive(Clone, Copy)]
pub struct ParameterValidator<'a> {
    escaper: Option<&'a dyn EscapeCapability>,
    dropdowns: DropdownOptions<'a>,
}

impl<'a> ParameterValidator<'a> {
    /// Creates a validator over the given collaborators
    pub fn new(
        escaper: Option<&'a dyn EscapeCapability>,
        results: Option<&'a dyn QueryResultSource>,
        org: Option<&'a str>,
    ) -> Self {
        Self {
            escaper,
            dropdowns: DropdownOptions::new(results, org),
        }
    }

    /// Validates and coerces one value.
    ///
    /// # Errors
    ///
    /// - `ValidationFailure::Rejected` if the value does not fit the definition
    /// - `ValidationFailure::Fatal` if a dropdown's options cannot be loaded
    pub fn validate(&self, definition: &ParameterDefinition, value: &Value) -> ValidationResult<Value> {
        match &definition.kind {
            ParameterKind::Text => validate_text(definition, value, self.escaper),
            ParameterKind::Number => validate_number(definition, value),
            ParameterKind::Date(_) => validate_date(definition, value),
            ParameterKind::DateRange(_) => validate_date_range(definition, value),
            ParameterKind::Enum => validate_options(definition, value, &StaticOptions, self.escaper),
            ParameterKind::Query => validate_options(definition, value, &self.dropdowns, self.escaper),
            ParameterKind::Unknown(type_name) => Err(ValidationError::UnknownParameterType {
                type_name: type_name.clone(),
            }
            .into()),
        }
    }
}

/// Text must be a string.
pub fn validate_text(
    definition: &ParameterDefinition,
    value: &Value,
    escaper: Option<&dyn EscapeCapability>,
) -> ValidationResult<Value> {
    if definition.optional && value.is_null() {
        return Ok(Value::Null);
    }

    let text = value
        .as_str()
        .ok_or_else(|| ValidationError::type_coercion("a string", value))?;

    Ok(Value::String(maybe_escape(definition, text, escaper)))
}

/// Numbers pass through; strings are parsed as floating point.
pub fn validate_number(definition: &ParameterDefinition, value: &Value) -> ValidationResult<Value> {
    if definition.optional && value.is_null() {
        return Ok(Value::Null);
    }

    match value {
        Value::Number(_) => Ok(value.clone()),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| ValidationError::type_coercion("a number", value).into()),
        _ => Err(ValidationError::type_coercion("a number", value).into()),
    }
}

/// Dates must be strings a date parser accepts; the original text is kept.
pub fn validate_date(definition: &ParameterDefinition, value: &Value) -> ValidationResult<Value> {
    if definition.optional && value.is_null() {
        return Ok(Value::Null);
    }

    match value.as_str() {
        Some(text) if is_date_literal(text) => Ok(value.clone()),
        _ => Err(ValidationError::type_coercion("a date", value).into()),
    }
}

/// Ranges must be objects with `start` and `end`, each a valid date.
pub fn validate_date_range(definition: &ParameterDefinition, value: &Value) -> ValidationResult<Value> {
    if definition.optional && value.is_null() {
        return Ok(json!({"start": null, "end": null}));
    }

    let (start, end) = value
        .as_object()
        .and_then(|range| Some((range.get("start")?, range.get("end")?)))
        .ok_or_else(|| {
            ValidationError::type_coercion("an object with 'start' and 'end' dates", value)
        })?;

    Ok(json!({
        "start": validate_date(definition, start)?,
        "end": validate_date(definition, end)?,
    }))
}

/// Enum-like validation shared by fixed enums and dropdowns.
///
/// A list is accepted only with multi-value options; its entries are checked
/// as a set, escaped one by one and joined. A scalar is stringified, checked
/// and escaped. Options are only fetched once the optional shortcuts have
/// been ruled out.
pub fn validate_options(
    definition: &ParameterDefinition,
    value: &Value,
    options: &dyn OptionsSource,
    escaper: Option<&dyn EscapeCapability>,
) -> ValidationResult<Value> {
    if let Value::Array(items) = value {
        let multi = definition.multi_values_options.as_ref().ok_or_else(|| {
            ValidationError::MultiValueNotAllowed {
                value: value.to_string(),
            }
        })?;

        if definition.optional && items.is_empty() {
            return Ok(Value::Null);
        }

        let values: Vec<String> = items.iter().map(stringify_value).collect();
        let allowed: HashSet<String> = options.allowed_values(definition)?.into_iter().collect();
        check_membership(&values, &allowed)?;

        let escaped: Vec<String> = values
            .iter()
            .map(|v| maybe_escape(definition, v, escaper))
            .collect();
        return Ok(Value::String(multi.join(&escaped)));
    }

    if definition.optional && value.is_null() {
        return Ok(Value::Null);
    }

    let text = stringify_value(value);
    let allowed: HashSet<String> = options.allowed_values(definition)?.into_iter().collect();
    check_membership(std::slice::from_ref(&text), &allowed)?;

    Ok(Value::String(maybe_escape(definition, &text, escaper)))
}

fn check_membership(values: &[String], allowed: &HashSet<String>) -> Result<(), ValidationError> {
    let mut invalid: Vec<String> = Vec::new();
    for value in values {
        if !allowed.contains(value) && !invalid.contains(value) {
            invalid.push(value.clone());
        }
    }

    if invalid.is_empty() {
        Ok(())
    } else {
        Err(ValidationError::EnumMembership { invalid })
    }
}

/// Escapes `value` when the definition asks for it and the capability can.
pub fn maybe_escape(
    definition: &ParameterDefinition,
    value: &str,
    escaper: Option<&dyn EscapeCapability>,
) -> String {
    match escaper {
        Some(escaper) if definition.escape && escaper.supports_escape() => escaper.escape(value),
        _ => value.to_string(),
    }
}
