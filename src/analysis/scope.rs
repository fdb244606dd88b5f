//! Position-to-scope resolution over the markup event stream.
//!
//! Given a byte offset, find the first open tag whose span contains it and
//! classify what the cursor sits on: the tag name, a plain attribute's name,
//! the quoted handler inside a call-style attribute, or nothing actionable.

use serde::Serialize;

use crate::markup::{MarkupEvent, MarkupTokenizer, OpenTagEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ScopeKind {
    Tag,
    AttributeName,
    AttributeValue,
    NoScope,
}

/// Classified lexical context of a cursor offset inside an open tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Scope {
    pub tag_name: String,
    pub kind: ScopeKind,
    /// Attribute name for `AttributeName`, unquoted handler text for `AttributeValue`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl Scope {
    fn new(tag_name: &str, kind: ScopeKind, data: Option<String>) -> Self {
        Self {
            tag_name: tag_name.to_string(),
            kind,
            data,
        }
    }

    fn no_scope(tag_name: &str) -> Self {
        Self::new(tag_name, ScopeKind::NoScope, None)
    }
}

/// Resolve the scope at `offset` by tokenizing `text`.
///
/// Returns `None` when the offset lies outside every open tag.
pub fn resolve_scope(offset: usize, text: &str) -> Option<Scope> {
    resolve_scope_in_events(offset, text, MarkupTokenizer::new(text))
}

/// Resolve the scope at `offset` from an already produced event sequence.
///
/// The first open tag containing the offset wins; later events are never
/// looked at. Attributes must be in document order and non-overlapping.
pub fn resolve_scope_in_events<I>(offset: usize, text: &str, events: I) -> Option<Scope>
where
    I: IntoIterator<Item = MarkupEvent>,
{
    for event in events {
        let tag = match event {
            MarkupEvent::OpenTag(tag) => tag,
            MarkupEvent::Finished => break,
        };
        if !tag.tag_span.contains_inclusive(offset) {
            continue;
        }

        log::debug!(
            target: "marko_ls::scope",
            "Offset {} inside tag '{}' at {}..{}",
            offset,
            tag.tag_name,
            tag.tag_span.start,
            tag.tag_span.end
        );
        return Some(classify_in_tag(offset, text, &tag));
    }
    None
}

fn classify_in_tag(offset: usize, text: &str, tag: &OpenTagEvent) -> Scope {
    let tag_name = tag.tag_name.as_str();

    let valid_char_at_offset = text
        .get(offset..)
        .and_then(|rest| rest.chars().next())
        .is_some_and(is_name_char);
    if !valid_char_at_offset {
        return Scope::no_scope(tag_name);
    }

    if offset <= tag.tag_name_end {
        return Scope::new(tag_name, ScopeKind::Tag, None);
    }

    for attribute in &tag.attributes {
        let name_span = attribute.name_span();
        // Attributes are ordered: once the offset is behind one, none further can match
        if offset < name_span.start {
            return Scope::no_scope(tag_name);
        }

        match &attribute.argument {
            None => {
                if name_span.contains_inclusive(offset) {
                    return Scope::new(
                        tag_name,
                        ScopeKind::AttributeName,
                        Some(attribute.name.clone()),
                    );
                }
            }
            Some(argument) => {
                // Strictly after the opening parenthesis
                if offset > argument.value_span.start && offset <= argument.value_span.end {
                    return Scope::new(
                        tag_name,
                        ScopeKind::AttributeValue,
                        Some(strip_delimiters(&argument.raw_text).to_string()),
                    );
                }
            }
        }
    }

    Scope::no_scope(tag_name)
}

/// Characters allowed in tag and attribute names.
fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '_' | '.' | ':' | '-' | '#')
}

/// Drop the first and last character (the surrounding quotes).
fn strip_delimiters(raw: &str) -> &str {
    let mut chars = raw.chars();
    match (chars.next(), chars.next_back()) {
        (Some(_), Some(_)) => chars.as_str(),
        _ => "",
    }
}
