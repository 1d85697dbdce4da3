//! Parameter definitions
//!
//! Schema entries are read from JSON with this shape:
//!
//! ```json
//! {
//!   "name": "status",
//!   "type": "enum",
//!   "optional": false,
//!   "escape": true,
//!   "enumOptions": "open\nclosed",
//!   "queryId": 12,
//!   "multiValuesOptions": {"separator": ",", "prefix": "'", "suffix": "'"}
//! }
//! ```
//!
//! Unknown keys are ignored.

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::dropdown::QueryId;

use super::errors::{SchemaError, SchemaResult};

/// How much of a timestamp a date parameter carries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatePrecision {
    /// Calendar date only
    Day,
    /// Date and time to the minute
    Minute,
    /// Date and time to the second
    Second,
}

/// Declared parameter type.
///
/// Type strings outside the known set deserialize to `Unknown` and are
/// rejected when a value is supplied for them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ParameterKind {
    /// Free text
    Text,
    /// Integer or floating point number
    Number,
    /// One date (`date`, `datetime-local`, `datetime-with-seconds`)
    Date(DatePrecision),
    /// A `{start, end}` pair of dates (`date-range`, `datetime-range`,
    /// `datetime-range-with-seconds`)
    DateRange(DatePrecision),
    /// Value from a fixed list of options
    Enum,
    /// Value from the latest result of another query
    Query,
    /// Unrecognized type string
    Unknown(String),
}

impl ParameterKind {
    /// Returns the type string as written in schemas
    pub fn type_name(&self) -> &str {
        match self {
            ParameterKind::Text => "text",
            ParameterKind::Number => "number",
            ParameterKind::Date(DatePrecision::Day) => "date",
            ParameterKind::Date(DatePrecision::Minute) => "datetime-local",
            ParameterKind::Date(DatePrecision::Second) => "datetime-with-seconds",
            ParameterKind::DateRange(DatePrecision::Day) => "date-range",
            ParameterKind::DateRange(DatePrecision::Minute) => "datetime-range",
            ParameterKind::DateRange(DatePrecision::Second) => "datetime-range-with-seconds",
            ParameterKind::Enum => "enum",
            ParameterKind::Query => "query",
            ParameterKind::Unknown(name) => name,
        }
    }
}

impl From<String> for ParameterKind {
    fn from(name: String) -> Self {
        match name.as_str() {
            "text" => ParameterKind::Text,
            "number" => ParameterKind::Number,
            "date" => ParameterKind::Date(DatePrecision::Day),
            "datetime-local" => ParameterKind::Date(DatePrecision::Minute),
            "datetime-with-seconds" => ParameterKind::Date(DatePrecision::Second),
            "date-range" => ParameterKind::DateRange(DatePrecision::Day),
            "datetime-range" => ParameterKind::DateRange(DatePrecision::Minute),
            "datetime-range-with-seconds" => ParameterKind::DateRange(DatePrecision::Second),
            "enum" => ParameterKind::Enum,
            "query" => ParameterKind::Query,
            _ => ParameterKind::Unknown(name),
        }
    }
}

impl From<&str> for ParameterKind {
    fn from(name: &str) -> Self {
        ParameterKind::from(name.to_string())
    }
}

impl From<ParameterKind> for String {
    fn from(kind: ParameterKind) -> Self {
        kind.type_name().to_string()
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.type_name())
    }
}

/// Allowed values of an enum parameter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EnumOptions {
    /// An explicit list
    List(Vec<String>),
    /// One string holding one option per line
    Lines(String),
}

impl EnumOptions {
    /// Returns the options in declaration order
    pub fn values(&self) -> Vec<String> {
        match self {
            EnumOptions::List(values) => values.clone(),
            EnumOptions::Lines(text) => text.split('\n').map(str::to_string).collect(),
        }
    }
}

/// How list values are joined into one substitution.
///
/// Its presence on a definition, even with every field defaulted, is what
/// allows list input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MultiValuesOptions {
    /// Placed between entries
    pub separator: String,
    /// Placed before each entry
    pub prefix: String,
    /// Placed after each entry
    pub suffix: String,
}

impl Default for MultiValuesOptions {
    fn default() -> Self {
        Self {
            separator: ",".into(),
            prefix: String::new(),
            suffix: String::new(),
        }
    }
}

impl MultiValuesOptions {
    /// Creates options with the given separator and quoting
    pub fn new(
        separator: impl Into<String>,
        prefix: impl Into<String>,
        suffix: impl Into<String>,
    ) -> Self {
        Self {
            separator: separator.into(),
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// Joins already-escaped entries
    pub fn join(&self, entries: &[String]) -> String {
        entries
            .iter()
            .map(|entry| format!("{}{}{}", self.prefix, entry, self.suffix))
            .collect::<Vec<_>>()
            .join(&self.separator)
    }
}

/// One schema entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    /// Placeholder name
    pub name: String,
    /// Declared type
    #[serde(rename = "type")]
    pub kind: ParameterKind,
    /// Whether null (or an empty list) is accepted
    #[serde(default)]
    pub optional: bool,
    /// Whether values pass through the data source's escaping
    #[serde(default)]
    pub escape: bool,
    /// Allowed values for enum parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_options: Option<EnumOptions>,
    /// Source query for dropdown parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_id: Option<QueryId>,
    /// Enables list input for enum and dropdown parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_values_options: Option<MultiValuesOptions>,
}

impl ParameterDefinition {
    /// Creates a required definition of the given kind
    pub fn new(name: impl Into<String>, kind: impl Into<ParameterKind>) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            optional: false,
            escape: false,
            enum_options: None,
            query_id: None,
            multi_values_options: None,
        }
    }

    /// Creates a required text definition
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Text)
    }

    /// Creates a required number definition
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Number)
    }

    /// Creates a required date definition
    pub fn date(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::Date(DatePrecision::Day))
    }

    /// Creates a required date range definition
    pub fn date_range(name: impl Into<String>) -> Self {
        Self::new(name, ParameterKind::DateRange(DatePrecision::Day))
    }

    /// Creates a required enum definition over a fixed list
    pub fn enumeration<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut definition = Self::new(name, ParameterKind::Enum);
        definition.enum_options = Some(EnumOptions::List(
            options.into_iter().map(Into::into).collect(),
        ));
        definition
    }

    /// Creates a required dropdown definition backed by `query_id`
    pub fn query(name: impl Into<String>, query_id: QueryId) -> Self {
        let mut definition = Self::new(name, ParameterKind::Query);
        definition.query_id = Some(query_id);
        definition
    }

    /// Marks the definition optional
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Requests escaping
    pub fn escaped(mut self) -> Self {
        self.escape = true;
        self
    }

    /// Allows list input joined with `options`
    pub fn multi_values(mut self, options: MultiValuesOptions) -> Self {
        self.multi_values_options = Some(options);
        self
    }

    /// Returns the fixed enum options, empty if none are declared
    pub fn enum_values(&self) -> Vec<String> {
        self.enum_options
            .as_ref()
            .map(EnumOptions::values)
            .unwrap_or_default()
    }
}

/// Ordered list of definitions with unique names
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ParameterSchema {
    definitions: Vec<ParameterDefinition>,
}

impl ParameterSchema {
    /// Creates a schema, rejecting duplicate names
    pub fn new(definitions: Vec<ParameterDefinition>) -> SchemaResult<Self> {
        let mut seen = HashSet::new();
        for definition in &definitions {
            if !seen.insert(definition.name.as_str()) {
                return Err(SchemaError::DuplicateName {
                    name: definition.name.clone(),
                });
            }
        }
        Ok(Self { definitions })
    }

    /// Creates an empty schema; values are then accepted without validation
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parses a schema from a JSON array of definitions
    pub fn from_json(value: &Value) -> SchemaResult<Self> {
        let definitions: Vec<ParameterDefinition> = serde_json::from_value(value.clone())
            .map_err(|e| SchemaError::Malformed {
                reason: e.to_string(),
            })?;
        Self::new(definitions)
    }

    /// Parses a schema from JSON text
    pub fn from_json_str(text: &str) -> SchemaResult<Self> {
        let definitions: Vec<ParameterDefinition> =
            serde_json::from_str(text).map_err(|e| SchemaError::Malformed {
                reason: e.to_string(),
            })?;
        Self::new(definitions)
    }

    /// Looks up a definition by name
    pub fn get(&self, name: &str) -> Option<&ParameterDefinition> {
        self.definitions.iter().find(|d| d.name == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterDefinition> {
        self.definitions.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }
}
