//! Rendering of collected records as text.

use clap::ValueEnum;
use serde::Serialize;
use serde_json::{Value, ser::PrettyFormatter};

use crate::clients::errors::{Error, Result};
use crate::router::Records;

pub const DEFAULT_LINE_FORMAT: &str = "{name}";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Indented JSON document
    Json,
    /// One line per record, built from `--line_format`
    Lines,
    /// YAML document
    Yaml,
}

pub fn format_records(
    records: &Records,
    format: OutputFormat,
    line_format: &str,
) -> Result<String> {
    match format {
        OutputFormat::Json => to_json(records),
        OutputFormat::Yaml => Ok(serde_yml::to_string(records)?.trim_end().to_string()),
        OutputFormat::Lines => format_lines(records, line_format),
    }
}

fn to_json(records: &Records) -> Result<String> {
    let mut buf = Vec::new();
    let mut ser =
        serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
    records.serialize(&mut ser)?;
    String::from_utf8(buf).map_err(|e| Error::SerializationError(e.to_string()))
}

fn format_lines(records: &Records, line_format: &str) -> Result<String> {
    let Value::Array(items) = serde_json::to_value(records)? else {
        return Err(Error::SerializationError("records did not serialize to a list".into()));
    };
    let lines = items
        .iter()
        .map(|item| render_line(line_format, item))
        .collect::<Result<Vec<_>>>()?;
    Ok(lines.join("\n"))
}

fn field_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Substitute `{field}` placeholders with the record's top-level fields.
///
/// `{{` and `}}` produce literal braces.
pub fn render_line(template: &str, record: &Value) -> Result<String> {
    let Value::Object(fields) = record else {
        return Err(Error::TemplateError("record is not an object".into()));
    };

    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                out.push('{');
            }
            '{' => {
                let mut key = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(k) => key.push(k),
                        None => {
                            return Err(Error::TemplateError(format!(
                                "unterminated placeholder in {template:?}"
                            )));
                        }
                    }
                }
                let value = fields
                    .get(&key)
                    .ok_or_else(|| Error::TemplateError(format!("record has no field `{key}`")))?;
                out.push_str(&field_text(value));
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                out.push('}');
            }
            '}' => {
                return Err(Error::TemplateError(format!("single `}}` in {template:?}")));
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}
