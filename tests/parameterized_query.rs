//! Parameterized query behaviour: placeholder discovery, validation per
//! parameter type, optional parameters, rendering and safety.

use std::collections::BTreeSet;
use std::sync::Arc;

use serde_json::{json, Map, Value};

use paramquery::dropdown::{
    DropdownError, DropdownResult, QueryId, QueryLookup, QueryResultData, QueryResultSource,
};
use paramquery::parameters::{NoEscape, ParameterSchema, SqlQuoteEscaper, ValidationError};
use paramquery::query::{ParameterError, ParameterizedQuery};

/// Serves the same single-column result for every query id
struct FixedValues(Vec<Value>);

impl QueryResultSource for FixedValues {
    fn lookup(&self, _query_id: QueryId, _org: Option<&str>) -> DropdownResult<QueryLookup> {
        let rows: Vec<Value> = self.0.iter().map(|v| json!({ "value": v })).collect();
        let data: QueryResultData = serde_json::from_value(json!({
            "columns": [{"name": "value"}],
            "rows": rows
        }))
        .unwrap();
        Ok(QueryLookup::Attached(Some(data)))
    }
}

/// Every query is detached from its data source
struct Detached;

impl QueryResultSource for Detached {
    fn lookup(&self, _query_id: QueryId, _org: Option<&str>) -> DropdownResult<QueryLookup> {
        Ok(QueryLookup::Detached)
    }
}

fn params(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        other => panic!("expected object, got {}", other),
    }
}

fn schema(value: Value) -> ParameterSchema {
    ParameterSchema::from_json(&value).unwrap()
}

fn query(template: &str, definitions: Value) -> ParameterizedQuery {
    ParameterizedQuery::new(template, schema(definitions)).unwrap()
}

fn names(items: &[&str]) -> BTreeSet<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn invalid_names(err: ParameterError) -> Vec<String> {
    match err {
        ParameterError::InvalidParameters(invalid) => {
            invalid.names().into_iter().map(String::from).collect()
        }
        other => panic!("expected invalid parameters, got {:?}", other),
    }
}

// =============================================================================
// Missing parameters
// =============================================================================

#[test]
fn test_returns_empty_set_for_regular_query() {
    let query = ParameterizedQuery::new("SELECT 1", ParameterSchema::empty()).unwrap();
    assert!(query.missing_params().is_empty());
}

#[test]
fn test_finds_all_params_when_missing() {
    let query =
        ParameterizedQuery::new("SELECT {{param}} FROM {{table}}", ParameterSchema::empty()).unwrap();
    assert_eq!(query.missing_params(), names(&["param", "table"]));
}

#[test]
fn test_finds_all_params() {
    let mut query =
        ParameterizedQuery::new("SELECT {{param}} FROM {{table}}", ParameterSchema::empty()).unwrap();
    query
        .apply(params(json!({"param": "value", "table": "value"})))
        .unwrap();
    assert!(query.missing_params().is_empty());
}

#[test]
fn test_deduplicates_params() {
    let mut query = ParameterizedQuery::new(
        "SELECT {{param}}, {{param}} FROM {{table}}",
        ParameterSchema::empty(),
    )
    .unwrap();
    query
        .apply(params(json!({"param": "value", "table": "value"})))
        .unwrap();
    assert!(query.missing_params().is_empty());
}

#[test]
fn test_handles_nested_params() {
    let mut query = ParameterizedQuery::new(
        "SELECT {{param}}, {{param}} FROM {{table}} -- {{#test}} {{nested_param}} {{/test}}",
        ParameterSchema::empty(),
    )
    .unwrap();
    query
        .apply(params(json!({"param": "value", "table": "value"})))
        .unwrap();
    assert_eq!(query.missing_params(), names(&["test", "nested_param"]));
}

#[test]
fn test_schemaless_values_render_verbatim() {
    let mut query =
        ParameterizedQuery::new("SELECT {{a}}, {{b}}, {{c}}", ParameterSchema::empty()).unwrap();
    query
        .apply(params(json!({"a": "x'y", "b": 7, "c": true})))
        .unwrap();
    assert_eq!(query.text(), "SELECT x'y, 7, true");
}

// =============================================================================
// Optional parameters
// =============================================================================

const OPTIONAL_TEMPLATE: &str =
    "SELECT id, name FROM {{table}}{{#foo}} WHERE foo = {{foo}} {{/foo}};";

fn optional_query(foo: Value) -> ParameterizedQuery {
    let mut definition = json!({"name": "foo", "optional": true});
    for (key, value) in params(foo) {
        definition[key] = value;
    }
    ParameterizedQuery::new(
        OPTIONAL_TEMPLATE,
        schema(json!([definition, {"name": "table", "type": "text"}])),
    )
    .unwrap()
    .with_result_source(Arc::new(FixedValues(vec![json!("1")])))
}

fn assert_optional_skipped(foo: Value, input: Value) {
    let mut query = optional_query(foo);
    query
        .apply(params(json!({"foo": input, "table": "users"})))
        .unwrap();
    assert_eq!(query.text(), "SELECT id, name FROM users;");
}

fn assert_optional_missing_skipped(foo: Value) {
    let mut query = optional_query(foo);
    query.apply(params(json!({"table": "users"}))).unwrap();
    assert_eq!(query.text(), "SELECT id, name FROM users;");
}

#[test]
fn test_skips_optional_text_param_with_null() {
    assert_optional_skipped(json!({"type": "text"}), Value::Null);
}

#[test]
fn test_skips_optional_number_param_with_null() {
    assert_optional_skipped(json!({"type": "number"}), Value::Null);
}

#[test]
fn test_skips_optional_number_param_with_zero() {
    assert_optional_skipped(json!({"type": "number"}), json!(0));
}

#[test]
fn test_skips_optional_date_param_with_null() {
    assert_optional_skipped(json!({"type": "date"}), Value::Null);
}

#[test]
fn test_skips_optional_enum_param_with_null() {
    assert_optional_skipped(json!({"type": "enum"}), Value::Null);
}

#[test]
fn test_skips_optional_enum_multi_param_with_empty_list() {
    assert_optional_skipped(json!({"type": "enum", "multiValuesOptions": {}}), json!([]));
}

#[test]
fn test_skips_optional_enum_multi_param_with_null() {
    assert_optional_skipped(json!({"type": "enum", "multiValuesOptions": {}}), Value::Null);
}

#[test]
fn test_skips_optional_query_param_with_null() {
    assert_optional_skipped(json!({"type": "query"}), Value::Null);
}

#[test]
fn test_skips_optional_query_multi_param_with_empty_list() {
    assert_optional_skipped(json!({"type": "query", "multiValuesOptions": {}}), json!([]));
}

#[test]
fn test_skips_optional_query_multi_param_with_null() {
    assert_optional_skipped(json!({"type": "query", "multiValuesOptions": {}}), Value::Null);
}

#[test]
fn test_rejects_empty_list_for_enum_without_multi_values() {
    let mut query = optional_query(json!({"type": "enum"}));
    let err = query
        .apply(params(json!({"foo": [], "table": "users"})))
        .unwrap_err();
    match err {
        ParameterError::InvalidParameters(invalid) => {
            assert_eq!(invalid.names(), vec!["foo"]);
            assert!(matches!(
                invalid.failure("foo"),
                Some(ValidationError::MultiValueNotAllowed { .. })
            ));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_rejects_empty_list_for_query_without_multi_values() {
    let mut query = optional_query(json!({"type": "query", "queryId": 1}));
    let err = query
        .apply(params(json!({"foo": [], "table": "users"})))
        .unwrap_err();
    assert_eq!(invalid_names(err), vec!["foo"]);
}

#[test]
fn test_rejects_empty_string_for_optional_query() {
    let mut query = optional_query(json!({"type": "query", "queryId": 1}));
    let err = query
        .apply(params(json!({"foo": "", "table": "users"})))
        .unwrap_err();
    assert_eq!(invalid_names(err), vec!["foo"]);
}

#[test]
fn test_skips_missing_optional_params() {
    for foo in [
        json!({"type": "text"}),
        json!({"type": "number"}),
        json!({"type": "date"}),
        json!({"type": "enum"}),
        json!({"type": "enum", "multiValuesOptions": {}}),
        json!({"type": "query"}),
        json!({"type": "query", "multiValuesOptions": {}}),
    ] {
        assert_optional_missing_skipped(foo);
    }
}

// =============================================================================
// Validation per type
// =============================================================================

#[test]
fn test_raises_on_parameters_not_in_schema() {
    let mut query = query("foo", json!([{"name": "bar", "type": "text"}]));
    let err = query.apply(params(json!({"qux": 7}))).unwrap_err();
    assert_eq!(invalid_names(err), vec!["qux"]);
}

#[test]
fn test_raises_on_invalid_text_parameters() {
    let mut query = query("foo", json!([{"name": "bar", "type": "text"}]));
    assert!(query.apply(params(json!({"bar": 7}))).is_err());
}

#[test]
fn test_validates_text_parameters() {
    let mut query = query("foo {{bar}}", json!([{"name": "bar", "type": "text"}]));
    query.apply(params(json!({"bar": "baz"}))).unwrap();
    assert_eq!(query.text(), "foo baz");
}

#[test]
fn test_raises_on_invalid_number_parameters() {
    let mut query = query("foo", json!([{"name": "bar", "type": "number"}]));
    assert!(query.apply(params(json!({"bar": "baz"}))).is_err());
}

#[test]
fn test_validates_number_parameters() {
    let mut query = query("foo {{bar}}", json!([{"name": "bar", "type": "number"}]));
    query.apply(params(json!({"bar": 7}))).unwrap();
    assert_eq!(query.text(), "foo 7");
}

#[test]
fn test_coerces_number_parameters() {
    let mut query = query("foo {{bar}}", json!([{"name": "bar", "type": "number"}]));
    query.apply(params(json!({"bar": "3.14"}))).unwrap();
    assert_eq!(query.text(), "foo 3.14");
}

#[test]
fn test_raises_on_invalid_date_parameters() {
    let mut query = query("foo", json!([{"name": "bar", "type": "date"}]));
    assert!(query.apply(params(json!({"bar": "baz"}))).is_err());
}

#[test]
fn test_raises_on_null_for_date_parameters() {
    let mut query = query("foo", json!([{"name": "bar", "type": "date"}]));
    assert!(query.apply(params(json!({"bar": null}))).is_err());
}

#[test]
fn test_validates_date_parameters() {
    let mut query = query("foo {{bar}}", json!([{"name": "bar", "type": "date"}]));
    query
        .apply(params(json!({"bar": "2000-01-01 12:00:00"})))
        .unwrap();
    assert_eq!(query.text(), "foo 2000-01-01 12:00:00");
}

#[test]
fn test_enum_booleans_use_json_spelling() {
    let mut lower = query(
        "foo {{e}}",
        json!([{"name": "e", "type": "enum", "enumOptions": "true\nfalse"}]),
    );
    lower.apply(params(json!({"e": true}))).unwrap();
    assert_eq!(lower.text(), "foo true");

    let mut capitalized = query(
        "foo {{e}}",
        json!([{"name": "e", "type": "enum", "enumOptions": "True\nFalse"}]),
    );
    assert!(capitalized.apply(params(json!({"e": true}))).is_err());
}

#[test]
fn test_accepts_common_date_spellings_verbatim() {
    for literal in [
        "2000-01-01 12:00:00 UTC",
        "01/02/2000 3:04 PM",
        "2020-01",
        "Jan 2020",
    ] {
        let mut query = query("foo {{bar}}", json!([{"name": "bar", "type": "date"}]));
        query.apply(params(json!({ "bar": literal }))).unwrap();
        assert_eq!(query.text(), format!("foo {}", literal));
    }
}

#[test]
fn test_raises_on_invalid_enum_parameters() {
    let mut query = query(
        "foo",
        json!([{"name": "bar", "type": "enum", "enumOptions": ["baz", "qux"]}]),
    );
    assert!(query.apply(params(json!({"bar": 7}))).is_err());
}

#[test]
fn test_raises_on_unlisted_enum_value_parameters() {
    let mut query = query(
        "foo",
        json!([{"name": "bar", "type": "enum", "enumOptions": ["baz", "qux"]}]),
    );
    let err = query.apply(params(json!({"bar": "shlomo"}))).unwrap_err();
    assert_eq!(invalid_names(err), vec!["bar"]);
}

#[test]
fn test_raises_on_unlisted_enum_list_value_parameters() {
    let mut query = query(
        "foo",
        json!([{
            "name": "bar",
            "type": "enum",
            "enumOptions": ["baz", "qux"],
            "multiValuesOptions": {"separator": ",", "prefix": "", "suffix": ""}
        }]),
    );
    assert!(query
        .apply(params(json!({"bar": ["shlomo", "baz"]})))
        .is_err());
}

#[test]
fn test_validates_enum_parameters() {
    let mut query = query(
        "foo {{bar}}",
        json!([{"name": "bar", "type": "enum", "enumOptions": ["baz", "qux"]}]),
    );
    query.apply(params(json!({"bar": "baz"}))).unwrap();
    assert_eq!(query.text(), "foo baz");
}

#[test]
fn test_validates_enum_list_value_parameters() {
    let mut query = query(
        "foo {{bar}}",
        json!([{
            "name": "bar",
            "type": "enum",
            "enumOptions": ["baz", "qux"],
            "multiValuesOptions": {"separator": ",", "prefix": "'", "suffix": "'"}
        }]),
    );
    query.apply(params(json!({"bar": ["qux", "baz"]}))).unwrap();
    assert_eq!(query.text(), "foo 'qux','baz'");
}

#[test]
fn test_validates_enum_options_given_as_lines() {
    let mut query = query(
        "foo {{bar}}",
        json!([{"name": "bar", "type": "enum", "enumOptions": "baz\nqux"}]),
    );
    query.apply(params(json!({"bar": "qux"}))).unwrap();
    assert_eq!(query.text(), "foo qux");
}

#[test]
fn test_validation_accepts_integer_values_for_dropdowns() {
    let mut query = query("foo {{bar}}", json!([{"name": "bar", "type": "query", "queryId": 1}]))
        .with_result_source(Arc::new(FixedValues(vec![json!("1")])));
    query.apply(params(json!({"bar": 1}))).unwrap();
    assert_eq!(query.text(), "foo 1");
}

#[test]
fn test_raises_on_invalid_query_parameters() {
    let mut query = query("foo", json!([{"name": "bar", "type": "query", "queryId": 1}]))
        .with_result_source(Arc::new(FixedValues(vec![])));
    let err = query.apply(params(json!({"bar": 7}))).unwrap_err();
    assert_eq!(invalid_names(err), vec!["bar"]);
}

#[test]
fn test_raises_on_unlisted_query_value_parameters() {
    let mut query = query("foo", json!([{"name": "bar", "type": "query", "queryId": 1}]))
        .with_result_source(Arc::new(FixedValues(vec![json!("baz")])));
    assert!(query.apply(params(json!({"bar": "shlomo"}))).is_err());
}

#[test]
fn test_validates_query_parameters() {
    let mut query = query("foo {{bar}}", json!([{"name": "bar", "type": "query", "queryId": 1}]))
        .with_result_source(Arc::new(FixedValues(vec![json!("baz")])));
    query.apply(params(json!({"bar": "baz"}))).unwrap();
    assert_eq!(query.text(), "foo baz");
}

#[test]
fn test_validates_query_list_value_parameters() {
    let mut query = query(
        "foo {{bar}}",
        json!([{
            "name": "bar",
            "type": "query",
            "queryId": 1,
            "multiValuesOptions": {"separator": " | ", "prefix": "[", "suffix": "]"}
        }]),
    )
    .with_result_source(Arc::new(FixedValues(vec![json!(1), json!(2), json!(3)])));
    query.apply(params(json!({"bar": [3, "1"]}))).unwrap();
    assert_eq!(query.text(), "foo [3] | [1]");
}

#[test]
fn test_detached_dropdown_is_not_aggregated() {
    let mut query = query(
        "foo",
        json!([
            {"name": "bar", "type": "text"},
            {"name": "baz", "type": "query", "queryId": 1}
        ]),
    )
    .with_result_source(Arc::new(Detached));

    let err = query
        .apply(params(json!({"bar": 7, "baz": "x"})))
        .unwrap_err();
    assert!(err.is_detached());
    assert_eq!(
        err,
        ParameterError::Dropdown(DropdownError::DetachedQuerySource { query_id: 1 })
    );
}

#[test]
fn test_raises_on_invalid_date_range_parameters() {
    let mut query = query("foo", json!([{"name": "bar", "type": "date-range"}]));
    assert!(query.apply(params(json!({"bar": "baz"}))).is_err());
}

#[test]
fn test_validates_date_range_parameters() {
    let mut query = query(
        "foo {{bar.start}} {{bar.end}}",
        json!([{"name": "bar", "type": "date-range"}]),
    );
    query
        .apply(params(json!({
            "bar": {"start": "2000-01-01 12:00:00", "end": "2000-12-31 12:00:00"}
        })))
        .unwrap();
    assert_eq!(query.text(), "foo 2000-01-01 12:00:00 2000-12-31 12:00:00");
    assert!(query.missing_params().is_empty());
}

#[test]
fn test_raises_on_unexpected_param_types() {
    let mut query = query("foo", json!([{"name": "bar", "type": "burrito"}]));
    let err = query.apply(params(json!({"bar": "baz"}))).unwrap_err();
    assert_eq!(invalid_names(err), vec!["bar"]);
}

#[test]
fn test_reports_every_invalid_parameter_in_input_order() {
    let mut query = query(
        "{{a}} {{b}} {{c}}",
        json!([
            {"name": "a", "type": "number"},
            {"name": "b", "type": "text"},
            {"name": "c", "type": "date"}
        ]),
    );
    let err = query
        .apply(params(json!({"c": "nope", "b": "fine", "a": "nope", "d": 1})))
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "The following parameter values are incompatible with their definitions: c, a, d"
    );
    assert!(query.parameters().is_empty());
}

// =============================================================================
// Accumulation across calls
// =============================================================================

#[test]
fn test_render_uses_only_the_latest_call() {
    let mut query = query(
        "SELECT {{a}} FROM {{b}}",
        json!([{"name": "a", "type": "text"}, {"name": "b", "type": "text"}]),
    );

    query.apply(params(json!({"a": "id"}))).unwrap();
    query.apply(params(json!({"b": "users"}))).unwrap();

    assert_eq!(query.text(), "SELECT  FROM users");
    assert!(query.missing_params().is_empty());
    assert_eq!(query.parameters().get("a"), Some(&json!("id")));
}

#[test]
fn test_later_calls_overwrite_values() {
    let mut query = query("{{a}}", json!([{"name": "a", "type": "number"}]));
    query.apply(params(json!({"a": 1}))).unwrap();
    query.apply(params(json!({"a": 2}))).unwrap();
    assert_eq!(query.text(), "2");
    assert_eq!(query.parameters().get("a"), Some(&json!(2)));
}

#[test]
fn test_failed_call_keeps_previous_state() {
    let mut query = query("{{a}}", json!([{"name": "a", "type": "number"}]));
    query.apply(params(json!({"a": 1}))).unwrap();
    assert!(query.apply(params(json!({"a": "x"}))).is_err());
    assert_eq!(query.text(), "1");
    assert_eq!(query.parameters().get("a"), Some(&json!(1)));
}

// =============================================================================
// Safety
// =============================================================================

#[test]
fn test_is_not_safe_if_expecting_text_parameter() {
    assert!(!query("foo", json!([{"name": "bar", "type": "text"}])).is_safe());
}

#[test]
fn test_is_safe_if_not_expecting_text_parameter() {
    assert!(query("foo", json!([{"name": "bar", "type": "number"}])).is_safe());
}

#[test]
fn test_is_safe_if_not_expecting_any_parameters() {
    assert!(query("foo", json!([])).is_safe());
}

#[test]
fn test_is_safe_if_text_parameter_is_escaped() {
    let query = query("foo", json!([{"name": "bar", "type": "text", "escape": true}]))
        .with_org("acme")
        .with_escaper(Arc::new(SqlQuoteEscaper));
    assert!(query.is_safe());
}

#[test]
fn test_is_not_safe_if_data_source_does_not_support_escaping() {
    let query = query("foo", json!([{"name": "bar", "type": "text", "escape": true}]))
        .with_escaper(Arc::new(NoEscape));
    assert!(!query.is_safe());
}

#[test]
fn test_escapes_enum_values() {
    let mut query = query(
        "WHERE name IN ({{bar}})",
        json!([{
            "name": "bar",
            "type": "enum",
            "escape": true,
            "enumOptions": ["O'Hara", "Smith"],
            "multiValuesOptions": {"separator": ", ", "prefix": "'", "suffix": "'"}
        }]),
    )
    .with_escaper(Arc::new(SqlQuoteEscaper));
    query
        .apply(params(json!({"bar": ["O'Hara", "Smith"]})))
        .unwrap();
    assert_eq!(query.text(), "WHERE name IN ('O''Hara', 'Smith')");
}
