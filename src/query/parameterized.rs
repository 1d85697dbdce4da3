//! Parameterized query
//!
//! Holds a template, its parameter schema and the values applied so far.
//!
//! Invariants:
//! - `apply` is all-or-nothing: a rejected call leaves values and text as
//!   they were.
//! - Applied values are never removed; a later call overwrites same-named
//!   entries.
//! - Every render starts from the original template source.
//! - The text is rendered from the values of the latest successful call
//!   only, while `missing_params` considers every value applied so far.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::dropdown::QueryResultSource;
use crate::observability::Event;
use crate::parameters::{
    escapes, EscapeCapability, ParameterKind, ParameterSchema, ParameterValidator,
    ValidationError, ValidationFailure,
};
use crate::template::{placeholder_names, render, Template, TemplateResult};

use super::errors::{InvalidParameterError, ParameterError};

/// A query template bound to a parameter schema
pub struct ParameterizedQuery {
    template: Template,
    schema: ParameterSchema,
    org: Option<String>,
    escaper: Option<Arc<dyn EscapeCapability>>,
    results: Option<Arc<dyn QueryResultSource>>,
    parameters: Map<String, Value>,
    text: String,
}

impl ParameterizedQuery {
    /// Parses `template` and binds it to `schema`.
    ///
    /// An empty schema accepts every value unchecked.
    pub fn new(template: impl Into<String>, schema: ParameterSchema) -> TemplateResult<Self> {
        let template = Template::parse(template)?;
        debug!(
            event = %Event::TemplateParsed,
            definitions = schema.len(),
            "Parsed query template"
        );

        let text = template.source().to_string();
        Ok(Self {
            template,
            schema,
            org: None,
            escaper: None,
            results: None,
            parameters: Map::new(),
            text,
        })
    }

    /// Scopes dropdown lookups to `org`
    pub fn with_org(mut self, org: impl Into<String>) -> Self {
        self.org = Some(org.into());
        self
    }

    /// Binds the data source's escape capability
    pub fn with_escaper(mut self, escaper: Arc<dyn EscapeCapability>) -> Self {
        self.escaper = Some(escaper);
        self
    }

    /// Binds the lookup used to resolve dropdown options
    pub fn with_result_source(mut self, results: Arc<dyn QueryResultSource>) -> Self {
        self.results = Some(results);
        self
    }

    /// Validates `values` and, if all of them are valid, merges them and
    /// re-renders the text.
    ///
    /// # Errors
    ///
    /// - `ParameterError::InvalidParameters` naming every rejected value
    /// - `ParameterError::Dropdown` as soon as a dropdown cannot be resolved
    ///
    /// Nothing changes on error.
    pub fn apply(&mut self, values: Map<String, Value>) -> Result<&mut Self, ParameterError> {
        let validated = if self.schema.is_empty() {
            values
        } else {
            self.validate_all(values)?
        };

        self.text = render(&self.template, &validated);

        let applied = validated.len();
        self.parameters.extend(validated);

        info!(
            event = %Event::ParametersApplied,
            applied,
            total = self.parameters.len(),
            "Applied query parameters"
        );

        Ok(self)
    }

    fn validate_all(&self, values: Map<String, Value>) -> Result<Map<String, Value>, ParameterError> {
        let validator = ParameterValidator::new(
            self.escaper.as_deref(),
            self.results.as_deref(),
            self.org.as_deref(),
        );

        let mut validated = Map::new();
        let mut failures = Vec::new();

        for (name, value) in values {
            let outcome = match self.schema.get(&name) {
                Some(definition) => validator.validate(definition, &value),
                None => Err(ValidationError::SchemaMismatch { name: name.clone() }.into()),
            };

            match outcome {
                Ok(value) => {
                    validated.insert(name, value);
                }
                Err(ValidationFailure::Rejected(err)) => {
                    warn!(
                        event = %Event::ParameterRejected,
                        parameter = %name,
                        code = err.code(),
                        severity = %err.severity(),
                        reason = %err,
                        "Failed parameter validation"
                    );
                    failures.push((name, err));
                }
                Err(ValidationFailure::Fatal(err)) => {
                    warn!(
                        event = %Event::ApplyAborted,
                        parameter = %name,
                        query_id = ?err.query_id(),
                        code = err.code(),
                        severity = %err.severity(),
                        error = %err,
                        "Aborted parameter application"
                    );
                    return Err(err.into());
                }
            }
        }

        if !failures.is_empty() {
            let err = InvalidParameterError::new(failures);
            warn!(
                event = %Event::ApplyRejected,
                parameters = %err.names().join(", "),
                "Rejected query parameters"
            );
            return Err(err.into());
        }

        Ok(validated)
    }

    /// Placeholders of the template not yet covered by an applied value.
    ///
    /// An object value covers `name.key` for each of its keys rather than
    /// `name` itself.
    pub fn missing_params(&self) -> BTreeSet<String> {
        let covered: HashSet<String> = self
            .parameters
            .iter()
            .flat_map(|(name, value)| match value {
                Value::Object(fields) => fields
                    .keys()
                    .map(|key| format!("{}.{}", name, key))
                    .collect::<Vec<_>>(),
                _ => vec![name.clone()],
            })
            .collect();

        placeholder_names(&self.template)
            .into_iter()
            .filter(|name| !covered.contains(name))
            .collect()
    }

    /// Returns false if some text parameter would be substituted unescaped
    pub fn is_safe(&self) -> bool {
        let escaping = escapes(self.escaper.as_deref());
        self.schema
            .iter()
            .filter(|definition| definition.kind == ParameterKind::Text)
            .all(|definition| escaping && definition.escape)
    }

    /// The latest rendered text, or the template source before any `apply`
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn schema(&self) -> &ParameterSchema {
        &self.schema
    }

    /// Every value applied so far
    pub fn parameters(&self) -> &Map<String, Value> {
        &self.parameters
    }

    pub fn org(&self) -> Option<&str> {
        self.org.as_deref()
    }
}

impl fmt::Debug for ParameterizedQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterizedQuery")
            .field("template", &self.template.source())
            .field("schema", &self.schema)
            .field("org", &self.org)
            .field("escaper", &self.escaper.is_some())
            .field("results", &self.results.is_some())
            .field("parameters", &self.parameters)
            .field("text", &self.text)
            .finish()
    }
}
