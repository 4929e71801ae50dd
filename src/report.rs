//! Report rendering
//!
//! Turns decoded template records into an indented text tree for the
//! terminal, or into JSON for other tools.

use std::fmt::Write;

use crate::common_types::{AttributeValue, TemplateRecord};
use crate::errors::Result;

/// Values longer than this many characters are cut and suffixed with "..."
pub const MAX_VALUE_CHARS: usize = 100;

pub const NO_TEMPLATES: &str = "No certificate templates found";

const INDENT: &str = "  ";

/// Renders the records as a tree: one node per template, its DN, and its
/// attributes sorted by name under "Template Details".
pub fn render_text(records: &[TemplateRecord]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Certificate Templates ({})", records.len());

    if records.is_empty() {
        let _ = writeln!(out, "{}{}", INDENT, NO_TEMPLATES);
        return out;
    }

    for record in records {
        render_record(&mut out, record);
    }
    out
}

/// Tree label of a template: "display (name)" when the two differ
pub fn template_label(record: &TemplateRecord) -> String {
    if record.display_name() != record.name() {
        format!("{} ({})", record.display_name(), record.name())
    } else {
        record.name().to_string()
    }
}

fn render_record(out: &mut String, record: &TemplateRecord) {
    let _ = writeln!(out, "{}{}", INDENT, template_label(record));
    let _ = writeln!(out, "{0}{0}DN: {1}", INDENT, record.distinguished_name());
    let _ = writeln!(out, "{0}{0}Template Details", INDENT);

    let detail = INDENT.repeat(3);
    for (name, value) in record.attributes().sorted() {
        match value {
            AttributeValue::Flag(set) => {
                let status = if *set { "Yes" } else { "No" };
                let _ = writeln!(out, "{}{}: {}", detail, title_case_key(name), status);
            }
            AttributeValue::List(items) if items.is_empty() => {
                let _ = writeln!(out, "{}{}: [empty]", detail, name);
            }
            AttributeValue::List(items) => {
                let _ = writeln!(out, "{}{}: [{} items]", detail, name, items.len());
                for (i, item) in items.iter().enumerate() {
                    let _ = writeln!(out, "{}{}[{}]: {}", detail, INDENT, i, truncate(item));
                }
            }
            AttributeValue::Text(text) => {
                let _ = writeln!(out, "{}{}: {}", detail, name, truncate(text));
            }
        }
    }
}

/// `Enrollee_Supplies_Subject` -> `Enrollee Supplies Subject`,
/// `Is_CA` -> `Is Ca`
pub fn title_case_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut previous_alpha = false;
    for c in key.chars() {
        let c = if c == '_' { ' ' } else { c };
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}

fn truncate(value: &str) -> String {
    match value.char_indices().nth(MAX_VALUE_CHARS) {
        Some((cut, _)) => format!("{}...", &value[..cut]),
        None => value.to_string(),
    }
}

/// Serializes the records as a pretty-printed JSON array.
pub fn render_json(records: &[TemplateRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}
