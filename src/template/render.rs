//! Template rendering
//!
//! Substitutes a parameter map into a parsed template. Output is query text,
//! so values are inserted verbatim: no markup escaping of any kind.

use serde_json::{Map, Value};

use super::parser::{Node, Template};

/// Renders `template` against `params`.
///
/// Names are looked up innermost context first. An exact key always wins; a
/// dotted name with no exact match falls back to mustache dotted lookup, so
/// `{{range.start}}` reads the `start` field of an object bound to `range`.
/// Unbound names render as empty text.
pub fn render(template: &Template, params: &Map<String, Value>) -> String {
    let root = Value::Object(params.clone());
    let mut stack = vec![&root];
    let mut out = String::with_capacity(template.source().len());
    render_nodes(template.nodes(), &mut stack, &mut out);
    out
}

fn render_nodes<'a>(nodes: &[Node], stack: &mut Vec<&'a Value>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Variable(name) => {
                if let Some(value) = lookup(name, stack) {
                    out.push_str(&display_value(value));
                }
            }
            Node::Section {
                name,
                inverted: false,
                body,
            } => match lookup(name, stack) {
                Some(value) if is_truthy(value) => match value {
                    Value::Array(items) => {
                        for item in items {
                            stack.push(item);
                            render_nodes(body, stack, out);
                            stack.pop();
                        }
                    }
                    _ => {
                        stack.push(value);
                        render_nodes(body, stack, out);
                        stack.pop();
                    }
                },
                _ => {}
            },
            Node::Section {
                name,
                inverted: true,
                body,
            } => {
                if !lookup(name, stack).is_some_and(is_truthy) {
                    render_nodes(body, stack, out);
                }
            }
            Node::Partial(_) => {}
        }
    }
}

fn lookup<'a>(name: &str, stack: &[&'a Value]) -> Option<&'a Value> {
    if name == "." {
        return stack.last().copied();
    }

    if let Some(value) = stack.iter().rev().find_map(|ctx| ctx.get(name)) {
        return Some(value);
    }

    let mut segments = name.split('.');
    let head = segments.next()?;
    let mut value = stack.iter().rev().find_map(|ctx| ctx.get(head))?;
    for segment in segments {
        value = value.get(segment)?;
    }
    Some(value)
}

/// Mustache truthiness over JSON values
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// Returns the text a value renders as
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
