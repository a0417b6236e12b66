//! # Placeholder Engine
//!
//! Templates reference row fields with double-brace placeholders:
//! `Invoice {{ Number }} for {{Client}}`. A template is first split into a
//! sequence of [`Segment`]s, then each placeholder segment is resolved:
//!
//! 1. the reserved label [`TODAY_SENTINEL`] (any letter case) becomes the
//!    run's date as `YYYY-MM-DD`;
//! 2. any other label must equal a field name exactly, after trimming the
//!    whitespace inside the braces.
//!
//! An unknown label fails the render with [`UnresolvedPlaceholder`].
//!
//! Document bodies, email subjects and email bodies go through the more
//! lenient [`substitute_fields`], which only replaces `{{name}}` for the
//! names it knows and leaves everything else untouched.

use super::context::FieldMap;
use thiserror::Error;

/// Reserved label replaced by the current date.
pub const TODAY_SENTINEL: &str = "today's date";

/// Characters that cannot appear in a generated file name.
const FORBIDDEN_FILENAME_CHARS: [char; 9] = ['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// A placeholder whose label matches neither the date sentinel nor a field.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Placeholder \"{{{{{0}}}}}\" does not match any column headers.")]
pub struct UnresolvedPlaceholder(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    Literal(&'a str),
    Placeholder {
        /// The full `{{ ... }}` text as written.
        raw: &'a str,
        /// The label between the braces, trimmed.
        label: &'a str,
    },
}

/// Splits a template into literal text and placeholders.
///
/// A placeholder is `{{`, at least one character other than `}`, then `}}`.
/// Anything else, including unbalanced braces, stays literal.
pub fn tokenize(template: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut literal_start = 0;
    let mut cursor = 0;

    while let Some(rel) = template[cursor..].find("{{") {
        let open = cursor + rel;
        let inner_start = open + 2;
        match template[inner_start..].find('}') {
            Some(len) if len > 0 && template[inner_start + len..].starts_with("}}") => {
                if open > literal_start {
                    segments.push(Segment::Literal(&template[literal_start..open]));
                }
                let end = inner_start + len + 2;
                segments.push(Segment::Placeholder {
                    raw: &template[open..end],
                    label: template[inner_start..inner_start + len].trim(),
                });
                cursor = end;
                literal_start = end;
            }
            _ => cursor = open + 1,
        }
    }

    if literal_start < template.len() {
        segments.push(Segment::Literal(&template[literal_start..]));
    }
    segments
}

/// Renders a template, resolving each label through `lookup`.
///
/// The date sentinel wins over a field of the same name.
pub fn render<F>(template: &str, today: &str, lookup: F) -> Result<String, UnresolvedPlaceholder>
where
    F: Fn(&str) -> Option<String>,
{
    let mut out = String::with_capacity(template.len());
    for segment in tokenize(template) {
        match segment {
            Segment::Literal(text) => out.push_str(text),
            Segment::Placeholder { label, .. } => {
                if label.to_lowercase() == TODAY_SENTINEL {
                    out.push_str(today);
                } else {
                    let value =
                        lookup(label).ok_or_else(|| UnresolvedPlaceholder(label.to_string()))?;
                    out.push_str(&value);
                }
            }
        }
    }
    Ok(out)
}

/// Renders a template against a row's fields.
pub fn render_fields(
    template: &str,
    fields: &FieldMap,
    today: &str,
) -> Result<String, UnresolvedPlaceholder> {
    render(template, today, |label| fields.get(label).map(str::to_string))
}

/// Replaces every exact `{{name}}` for each known field, in field order.
/// Unknown placeholders are left as they are.
pub fn substitute_fields(text: &str, fields: &FieldMap) -> String {
    let mut out = text.to_string();
    for (name, value) in fields.iter() {
        let token = format!("{{{{{name}}}}}");
        if out.contains(&token) {
            out = out.replace(&token, value);
        }
    }
    out
}

/// Maps every forbidden file name character to `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if FORBIDDEN_FILENAME_CHARS.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect()
}
