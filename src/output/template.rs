//! A small subset of Go's `text/template`: literal text and `{{.Field}}`
//! actions over the fields of one test record.

use std::path::Path;

use serde::Serialize;
use serde_json::Value;

use crate::error::OutputError;
use crate::tree::{SourceRange, TestNode};
use crate::utils::relative_path;

/// Field paths a template may reference.
pub const KNOWN_FIELDS: &[&str] = &[
    "Name",
    "DisplayName",
    "FullName",
    "FullDisplayName",
    "Package",
    "Directory",
    "File",
    "Range",
    "Range.Start",
    "Range.Start.Line",
    "Range.Start.Column",
    "Range.End",
    "Range.End.Line",
    "Range.End.Column",
    "HasGeneratedName",
    "IsSubtest",
    "RelativeFileName",
    "RelativeDirectory",
];

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Text(String),
    Field(Vec<String>),
}

/// A parsed output template. Every field is checked at parse time, so
/// rendering a record cannot fail on a bad path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(source: &str) -> Result<Self, OutputError> {
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;
        let mut trim_next = false;

        while let Some(start) = rest.find(OPEN) {
            let mut text = &rest[..start];
            if trim_next {
                text = text.trim_start();
            }
            let action_offset = offset + start;
            let after_open = &rest[start + OPEN.len()..];
            let Some(end) = after_open.find(CLOSE) else {
                return Err(OutputError::invalid_template(action_offset, "unclosed action"));
            };

            let mut action = &after_open[..end];
            if let Some(stripped) = action.strip_prefix("- ") {
                text = text.trim_end();
                action = stripped;
            }
            trim_next = false;
            if let Some(stripped) = action.strip_suffix(" -") {
                trim_next = true;
                action = stripped;
            }

            if !text.is_empty() {
                segments.push(Segment::Text(text.to_string()));
            }
            segments.push(Segment::Field(parse_field(action.trim(), action_offset)?));

            let consumed = start + OPEN.len() + end + CLOSE.len();
            rest = &rest[consumed..];
            offset += consumed;
        }

        let tail = if trim_next { rest.trim_start() } else { rest };
        if !tail.is_empty() {
            segments.push(Segment::Text(tail.to_string()));
        }
        Ok(Self { segments })
    }

    /// Renders one record, as produced by [`TemplateRecord::to_value`].
    pub fn render(&self, record: &Value) -> Result<String, OutputError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Text(text) => out.push_str(text),
                Segment::Field(path) => {
                    let value = path
                        .iter()
                        .try_fold(record, |value, key| value.get(key))
                        .ok_or_else(|| OutputError::unknown_field(path.join(".")))?;
                    push_value(&mut out, value);
                }
            }
        }
        Ok(out)
    }
}

fn parse_field(action: &str, offset: usize) -> Result<Vec<String>, OutputError> {
    let Some(path) = action.strip_prefix('.') else {
        return Err(OutputError::invalid_template(
            offset,
            format!("unsupported action {{{{{action}}}}}, only fields are allowed"),
        ));
    };
    if path.is_empty() {
        return Err(OutputError::invalid_template(offset, "missing field name"));
    }
    if !KNOWN_FIELDS.contains(&path) {
        return Err(OutputError::unknown_field(path));
    }
    Ok(path.split('.').map(str::to_string).collect())
}

fn push_value(out: &mut String, value: &Value) {
    match value {
        Value::String(s) => out.push_str(s),
        Value::Number(n) => out.push_str(&n.to_string()),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Null => out.push_str("<no value>"),
        other => out.push_str(&other.to_string()),
    }
}

/// The fields a template sees for one test.
#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct TemplateRecord<'a> {
    pub name: &'a str,
    pub display_name: &'a str,
    pub full_name: &'a str,
    pub full_display_name: &'a str,
    pub package: &'a str,
    pub directory: String,
    pub file: String,
    pub range: SourceRange,
    pub has_generated_name: bool,
    pub is_subtest: bool,
    pub relative_file_name: String,
    pub relative_directory: String,
}

impl<'a> TemplateRecord<'a> {
    /// Relative paths are computed against `base`, normally the working
    /// directory.
    pub fn new(node: &'a TestNode, base: &Path) -> Self {
        Self {
            name: &node.name,
            display_name: &node.display_name,
            full_name: &node.full_name,
            full_display_name: &node.full_display_name,
            package: &node.package,
            directory: node.directory.display().to_string(),
            file: node.file.display().to_string(),
            range: node.range,
            has_generated_name: node.has_generated_name,
            is_subtest: node.is_subtest,
            relative_file_name: relative_path(base, &node.file).display().to_string(),
            relative_directory: relative_path(base, &node.directory)
                .display()
                .to_string(),
        }
    }

    pub fn to_value(&self) -> Result<Value, OutputError> {
        Ok(serde_json::to_value(self)?)
    }
}
