//! Parameter definitions and value validation
//!
//! A schema declares, per placeholder, what kind of value it accepts. The
//! validator checks supplied values against it and produces the value that
//! is substituted into the template.

mod dates;
mod errors;
mod escape;
mod types;
mod validator;

pub use dates::{is_date_literal, parse_datetime};
pub use errors::{SchemaError, SchemaResult, ValidationError, ValidationFailure, ValidationResult};
pub use escape::{escapes, EscapeCapability, NoEscape, SqlQuoteEscaper};
pub use types::{
    DatePrecision, EnumOptions, MultiValuesOptions, ParameterDefinition, ParameterKind,
    ParameterSchema,
};
pub use validator::{
    maybe_escape, validate_date, validate_date_range, validate_number, validate_options,
    validate_text, DropdownOptions, OptionsSource, ParameterValidator, StaticOptions,
};
