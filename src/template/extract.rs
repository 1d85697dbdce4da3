//! Placeholder extraction
//!
//! Collects the free variable names of a template: every variable contributes
//! its identifier, every section (plain or inverted) contributes its own
//! identifier and then the names found in its body. Identifiers are opaque:
//! `bar.start` is one name, never split on the dot.

use std::collections::HashSet;

use super::parser::{Node, Template};

/// The implicit iterator, which names the current context rather than a parameter
const IMPLICIT_ITERATOR: &str = ".";

/// Returns the distinct placeholder names of a template in first-occurrence order.
pub fn placeholder_names(template: &Template) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut names = Vec::new();
    collect(template.nodes(), &mut seen, &mut names);
    names
}

fn collect(nodes: &[Node], seen: &mut HashSet<String>, names: &mut Vec<String>) {
    for node in nodes {
        match node {
            Node::Variable(name) => record(name, seen, names),
            Node::Section { name, body, .. } => {
                record(name, seen, names);
                collect(body, seen, names);
            }
            Node::Text(_) | Node::Partial(_) => {}
        }
    }
}

fn record(name: &str, seen: &mut HashSet<String>, names: &mut Vec<String>) {
    if name == IMPLICIT_ITERATOR {
        return;
    }
    if seen.insert(name.to_string()) {
        names.push(name.to_string());
    }
}
