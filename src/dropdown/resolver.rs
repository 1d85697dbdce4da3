//! Dropdown option resolution
//!
//! Turns the latest result of a query into `{name, value}` options.
//!
//! Per row, keys are compared case-insensitively. A `name` column supplies the
//! option name and a `value` column the option value; whichever is absent
//! falls back to the first declared column. Values are always stringified,
//! names keep their JSON type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::observability::Event;

use super::errors::{DropdownError, DropdownResult};
use super::source::{QueryId, QueryLookup, QueryResultData, QueryResultSource};

const NAME_COLUMN: &str = "name";
const VALUE_COLUMN: &str = "value";

/// One selectable dropdown entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DropdownOption {
    /// Display name, in its original JSON type
    pub name: Value,
    /// Value submitted for the parameter
    pub value: String,
}

/// Loads the options for `query_id` in the scope of `org`.
///
/// # Errors
///
/// Returns `DropdownError::DetachedQuerySource` when the query has no data
/// source, and propagates any error raised by `source`.
pub fn dropdown_values(
    source: &dyn QueryResultSource,
    query_id: QueryId,
    org: Option<&str>,
) -> DropdownResult<Vec<DropdownOption>> {
    let data = load_result(source, query_id, org)?;

    let first_column = data
        .columns
        .first()
        .ok_or_else(|| DropdownError::MalformedResult {
            query_id,
            reason: "result has no columns".into(),
        })?;

    let options = data
        .rows
        .iter()
        .map(|row| pluck_name_and_value(query_id, &first_column.name, row))
        .collect::<DropdownResult<Vec<_>>>()?;

    debug!(
        event = %Event::DropdownResolved,
        query_id,
        options = options.len(),
        "Resolved dropdown options"
    );

    Ok(options)
}

fn load_result(
    source: &dyn QueryResultSource,
    query_id: QueryId,
    org: Option<&str>,
) -> DropdownResult<QueryResultData> {
    match source.lookup(query_id, org)? {
        QueryLookup::Attached(Some(data)) => Ok(data),
        QueryLookup::Attached(None) => Err(DropdownError::NoResult { query_id }),
        QueryLookup::Detached => {
            warn!(event = %Event::QueryDetached, query_id, "Dropdown query has no data source");
            Err(DropdownError::DetachedQuerySource { query_id })
        }
    }
}

fn pluck_name_and_value(
    query_id: QueryId,
    first_column: &str,
    row: &Map<String, Value>,
) -> DropdownResult<DropdownOption> {
    // Later keys win when two differ only by case.
    let row: HashMap<String, &Value> = row.iter().map(|(k, v)| (k.to_lowercase(), v)).collect();
    let fallback = first_column.to_lowercase();

    let name_column = if row.contains_key(NAME_COLUMN) {
        NAME_COLUMN
    } else {
        fallback.as_str()
    };
    let value_column = if row.contains_key(VALUE_COLUMN) {
        VALUE_COLUMN
    } else {
        fallback.as_str()
    };

    let cell = |column: &str| {
        row.get(column)
            .copied()
            .ok_or_else(|| DropdownError::MalformedResult {
                query_id,
                reason: format!("row has no '{}' column", column),
            })
    };

    Ok(DropdownOption {
        name: cell(name_column)?.clone(),
        value: stringify_value(cell(value_column)?),
    })
}

/// Converts a JSON value to the string used for option matching.
///
/// Strings are returned as is; everything else uses its JSON text, so `5`
/// becomes `"5"` and `null` becomes `"null"`.
pub fn stringify_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
