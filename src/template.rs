//! Minimal `{{ .Name }}` template engine used for release names, asset names
//! and source URLs.
//!
//! Templates are compiled once with [`Template::parse`] and rendered with
//! [`Template::render`]. The two stages fail with distinct error variants so
//! a malformed template can be told apart from a reference to a variable the
//! view does not define.

use std::collections::BTreeMap;
use thiserror::Error;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemplateError {
    #[error("error parsing source template {name:?}: {reason}")]
    Parse { name: String, reason: String },
    #[error("error rendering source template {name:?}: variable {variable:?} is not defined")]
    Render { name: String, variable: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Variable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

/// Named values available to a template while rendering.
#[derive(Debug, Default, Clone)]
pub struct Variables<'a> {
    values: BTreeMap<&'static str, &'a str>,
}

impl<'a> Variables<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &'static str, value: &'a str) -> Self {
        self.values.insert(name, value);
        self
    }

    fn get(&self, name: &str) -> Option<&'a str> {
        self.values.get(name).copied()
    }
}

impl Template {
    pub fn parse(name: &str, source: &str) -> Result<Self, TemplateError> {
        let parse_error = |reason: String| TemplateError::Parse {
            name: name.to_string(),
            reason,
        };

        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find(OPEN) {
            let after_open = &rest[start + OPEN.len()..];
            let end = after_open.find(CLOSE).ok_or_else(|| {
                parse_error(format!(
                    "unclosed action at offset {}",
                    offset(source, rest) + start
                ))
            })?;

            let (action, trim_before, trim_after) = trim_markers(&after_open[..end]);

            let text = &rest[..start];
            let text = if trim_before { text.trim_end() } else { text };
            if !text.is_empty() {
                segments.push(Segment::Text(text.to_string()));
            }

            segments.push(Segment::Variable(parse_action(action.trim()).map_err(parse_error)?));

            rest = &after_open[end + CLOSE.len()..];
            if trim_after {
                rest = rest.trim_start();
            }
        }

        if !rest.is_empty() {
            segments.push(Segment::Text(rest.to_string()));
        }

        Ok(Template {
            name: name.to_string(),
            segments,
        })
    }

    pub fn render(&self, variables: &Variables) -> Result<String, TemplateError> {
        let mut output = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => output.push_str(text),
                Segment::Variable(variable) => {
                    let value = variables.get(variable).ok_or_else(|| TemplateError::Render {
                        name: self.name.clone(),
                        variable: variable.clone(),
                    })?;
                    output.push_str(value);
                }
            }
        }
        Ok(output)
    }
}

/// Compiles and renders in one step.
pub fn render(name: &str, source: &str, variables: &Variables) -> Result<String, TemplateError> {
    Template::parse(name, source)?.render(variables)
}

/// Strips `{{- ` and ` -}}` markers, which trim the whitespace of the
/// neighbouring text. The dash only counts when followed (or preceded) by
/// whitespace.
fn trim_markers(action: &str) -> (&str, bool, bool) {
    let mut action = action;

    let trim_before = action.starts_with('-') && action[1..].starts_with(char::is_whitespace);
    if trim_before {
        action = &action[1..];
    }

    let trim_after =
        action.ends_with('-') && action[..action.len() - 1].ends_with(char::is_whitespace);
    if trim_after {
        action = &action[..action.len() - 1];
    }

    (action, trim_before, trim_after)
}

fn parse_action(action: &str) -> Result<String, String> {
    if action.is_empty() {
        return Err("missing value for action".to_string());
    }

    let field = action.strip_prefix('.').ok_or_else(|| {
        format!(
            "unexpected {:?} in action, expected a field like .Version",
            action
        )
    })?;

    let mut chars = field.chars();
    let valid = matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

    if !valid {
        return Err(format!("bad field name {:?} in action", field));
    }

    Ok(field.to_string())
}

fn offset(source: &str, rest: &str) -> usize {
    source.len() - rest.len()
}
