//! Template parser
//!
//! Turns query text into a node tree. The grammar is the logic-less subset of
//! mustache that query templates use:
//!
//! - `{{name}}`, `{{{name}}}`, `{{& name}}`: variable interpolation
//! - `{{#name}} ... {{/name}}`: section
//! - `{{^name}} ... {{/name}}`: inverted section
//! - `{{! comment}}`: dropped
//! - `{{> name}}`: partial (no registry, renders empty)
//! - `{{=<% %>=}}`: delimiter change
//!
//! Every tag except a variable removes its whole line, line break included,
//! when it is the only thing on that line besides blanks.

use std::sync::LazyLock;

use regex::Regex;

use super::errors::{TemplateError, TemplateResult};

/// Default opening delimiter
pub const DEFAULT_OPEN: &str = "{{";
/// Default closing delimiter
pub const DEFAULT_CLOSE: &str = "}}";

static DELIMITER_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^=\s*(\S+)\s+(\S+)\s*=$").expect("valid delimiter pattern"));

/// A node in a parsed template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Literal text copied to the output as is
    Text(String),
    /// Interpolation of a named value
    Variable(String),
    /// A block rendered depending on the value bound to `name`
    Section {
        /// Section identifier
        name: String,
        /// True for `{{^name}}` blocks
        inverted: bool,
        /// Nested nodes
        body: Vec<Node>,
    },
    /// A partial reference
    Partial(String),
}

/// A parsed query template.
///
/// The original source is kept alongside the node tree; every render starts
/// from the same tree, never from a previous render's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    source: String,
    nodes: Vec<Node>,
}

impl Template {
    /// Parses template text.
    ///
    /// # Errors
    ///
    /// Returns `TemplateError` for unterminated tags, empty tags, unbalanced
    /// sections and malformed delimiter changes.
    pub fn parse(source: impl Into<String>) -> TemplateResult<Self> {
        let source = source.into();
        let nodes = parse_nodes(&source)?;
        Ok(Self { source, nodes })
    }

    /// Returns the unrendered template text
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Returns the top-level nodes
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}

/// An open section waiting for its closing tag
struct Frame {
    name: String,
    inverted: bool,
    offset: usize,
    /// Nodes of the enclosing level, restored when the section closes
    outer: Vec<Node>,
}

fn parse_nodes(source: &str) -> TemplateResult<Vec<Node>> {
    let mut open = DEFAULT_OPEN.to_string();
    let mut close = DEFAULT_CLOSE.to_string();
    let mut stack: Vec<Frame> = Vec::new();
    let mut current: Vec<Node> = Vec::new();
    let mut pos = 0;

    while pos < source.len() {
        let Some(rel_open) = source[pos..].find(open.as_str()) else {
            push_text(&mut current, &source[pos..]);
            break;
        };

        let tag_start = pos + rel_open;
        let content_start = tag_start + open.len();
        let rel_close = source[content_start..]
            .find(close.as_str())
            .ok_or(TemplateError::UnterminatedTag { offset: tag_start })?;
        let content_end = content_start + rel_close;
        let mut tag_end = content_end + close.len();
        let content = source[content_start..content_end].trim();
        let sigil = content.chars().next();

        // Non-output tags alone on their line take the whole line with them.
        let standalone = match sigil {
            Some('!' | '#' | '^' | '/' | '>' | '=') => standalone_line(source, pos, tag_start, tag_end),
            _ => None,
        };
        let text_end = standalone.map_or(tag_start, |(line_start, _)| line_start);
        push_text(&mut current, &source[pos..text_end]);

        match sigil {
            None => return Err(TemplateError::EmptyTag { offset: tag_start }),
            Some('!') => {}
            Some(sigil @ ('#' | '^')) => {
                let name = tag_name(&content[1..], tag_start)?;
                stack.push(Frame {
                    name,
                    inverted: sigil == '^',
                    offset: tag_start,
                    outer: std::mem::take(&mut current),
                });
            }
            Some('/') => {
                let name = tag_name(&content[1..], tag_start)?;
                let frame = stack.pop().ok_or_else(|| TemplateError::UnopenedSection {
                    name: name.clone(),
                    offset: tag_start,
                })?;
                if frame.name != name {
                    return Err(TemplateError::MismatchedSection {
                        expected: frame.name,
                        found: name,
                        offset: tag_start,
                    });
                }
                let body = std::mem::replace(&mut current, frame.outer);
                current.push(Node::Section {
                    name,
                    inverted: frame.inverted,
                    body,
                });
            }
            Some('>') => current.push(Node::Partial(tag_name(&content[1..], tag_start)?)),
            Some('&') => current.push(Node::Variable(tag_name(&content[1..], tag_start)?)),
            Some('{') => {
                // With default delimiters the third closing brace sits after `}}`.
                let inner = match content[1..].strip_suffix('}') {
                    Some(inner) => inner,
                    None if source[tag_end..].starts_with('}') => {
                        tag_end += 1;
                        &content[1..]
                    }
                    None => return Err(TemplateError::UnterminatedTag { offset: tag_start }),
                };
                current.push(Node::Variable(tag_name(inner, tag_start)?));
            }
            Some('=') => {
                let captures = DELIMITER_TAG.captures(content).ok_or_else(|| {
                    TemplateError::InvalidDelimiters {
                        offset: tag_start,
                        reason: format!("expected '=<open> <close>=', got '{}'", content),
                    }
                })?;
                open = captures[1].to_string();
                close = captures[2].to_string();
            }
            Some(_) => current.push(Node::Variable(tag_name(content, tag_start)?)),
        }

        pos = standalone.map_or(tag_end, |(_, line_end)| line_end);
    }

    if let Some(frame) = stack.pop() {
        return Err(TemplateError::UnclosedSection {
            name: frame.name,
            offset: frame.offset,
        });
    }

    Ok(current)
}

/// Returns the start of the tag's line and the end of its line break when
/// nothing but blanks shares the line with the tag.
fn standalone_line(
    source: &str,
    pos: usize,
    tag_start: usize,
    tag_end: usize,
) -> Option<(usize, usize)> {
    let line_start = source[..tag_start].rfind('\n').map_or(0, |i| i + 1);
    if line_start < pos || !is_blank(&source[line_start..tag_start]) {
        return None;
    }

    let rest = &source[tag_end..];
    let after = rest.trim_start_matches(|c| c == ' ' || c == '\t');
    let line_break = if after.starts_with("\r\n") {
        2
    } else if after.starts_with('\n') {
        1
    } else if after.is_empty() {
        0
    } else {
        return None;
    };

    Some((line_start, tag_end + (rest.len() - after.len()) + line_break))
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c == ' ' || c == '\t')
}

fn tag_name(raw: &str, offset: usize) -> TemplateResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(TemplateError::EmptyTag { offset });
    }
    Ok(name.to_string())
}

fn push_text(nodes: &mut Vec<Node>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(Node::Text(last)) = nodes.last_mut() {
        last.push_str(text);
    } else {
        nodes.push(Node::Text(text.to_string()));
    }
}
