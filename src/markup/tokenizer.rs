//! Best-effort streaming tokenizer for Marko/HTML markup.
//!
//! Only open tags are reported. Everything else (text, closing tags,
//! comments, declarations, raw-text bodies) is skipped. The tokenizer never
//! fails: an unterminated construct runs to the end of the text, and a tag
//! missing its `>` ends where the next tag begins.
//!
//! Scanning happens byte by byte. Slices are only cut at ASCII structural
//! bytes or at the end of the text, so every slice lands on a UTF-8 boundary.

use super::event::{ArgumentRecord, AttributeRecord, MarkupEvent, OpenTagEvent, Span};

const RAW_TEXT_TAGS: &[&str] = &["script", "style"];

/// Pull-style event source over a single document text.
///
/// Yields `MarkupEvent::OpenTag` for each tag in document order, then
/// `MarkupEvent::Finished` exactly once, then `None`.
pub struct MarkupTokenizer<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    finished: bool,
}

impl<'a> MarkupTokenizer<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            finished: false,
        }
    }

    /// Advance to the `<` of the next open tag, skipping everything that is not one.
    fn next_tag_start(&mut self) -> Option<usize> {
        let len = self.bytes.len();
        let mut i = self.pos;
        while i < len {
            match self.bytes[i] {
                b'$' if self.byte_at(i + 1) == Some(b'{') => {
                    i = self.skip_group(i + 1);
                }
                b'<' => {
                    if self.starts_with_at(i, "<!--") {
                        i = self.find_from(i + 4, "-->").map_or(len, |end| end + 3);
                    } else if matches!(self.byte_at(i + 1), Some(b'!' | b'?' | b'/')) {
                        i = self.skip_to_tag_close(i + 2);
                    } else if self.byte_at(i + 1).is_some_and(is_tag_start_byte) {
                        self.pos = i;
                        return Some(i);
                    } else {
                        i += 1;
                    }
                }
                _ => i += 1,
            }
        }
        self.pos = len;
        None
    }

    fn open_tag(&mut self, start: usize) -> OpenTagEvent {
        let len = self.bytes.len();
        let name_start = start + 1;
        let mut i = name_start;

        if self.starts_with_at(i, "${") {
            i = self.skip_group(i + 1);
        } else {
            while i < len && is_tag_name_byte(self.bytes[i]) {
                i += 1;
            }
        }
        let tag_name_end = i;
        let tag_name = self.text[name_start..tag_name_end].to_string();

        // Shorthand `.class` and `#id` suffixes
        while i < len && matches!(self.bytes[i], b'.' | b'#') {
            i += 1;
            while i < len && is_tag_name_byte(self.bytes[i]) {
                i += 1;
            }
        }
        // Tag parameters `|item|` and tag argument `(...)`
        if self.byte_at(i) == Some(b'|') {
            i = self.find_from(i + 1, "|").map_or(len, |end| end + 1);
        }
        if self.byte_at(i) == Some(b'(') {
            i = self.skip_group(i);
        }

        let mut attributes = Vec::new();
        let (end, opens_body) = loop {
            i = self.skip_separators(i);
            let Some(byte) = self.byte_at(i) else {
                break (len, false);
            };
            match byte {
                b'>' => break (i + 1, true),
                b'/' if self.byte_at(i + 1) == Some(b'>') => break (i + 2, false),
                // A new tag begins before this one was closed
                b'<' => break (i, false),
                _ => {}
            }

            let attr_start = i;
            while i < len && is_attr_name_byte(self.bytes[i]) {
                i += 1;
            }
            if i == attr_start {
                i = if is_quote(byte) {
                    self.skip_string(i)
                } else {
                    i + 1
                };
                continue;
            }
            let name = self.text[attr_start..i].to_string();
            let value_start = i;

            let mut argument = None;
            if self.byte_at(i) == Some(b'(') {
                let close = self.skip_group(i);
                let inner_end = if close > i + 1 && self.bytes[close - 1] == b')' {
                    close - 1
                } else {
                    close
                };
                argument = Some(ArgumentRecord {
                    value_span: Span::new(i, close),
                    raw_text: self.text[i + 1..inner_end].to_string(),
                });
                i = close;
            }

            let after_ws = self.skip_whitespace(i);
            if self.byte_at(after_ws) == Some(b'=') {
                i = self.skip_value(self.skip_whitespace(after_ws + 1));
            }

            attributes.push(AttributeRecord {
                name,
                value_span: Span::new(value_start, i),
                argument,
            });
        };

        self.pos = end;
        if opens_body
            && RAW_TEXT_TAGS
                .iter()
                .any(|raw| raw.eq_ignore_ascii_case(&tag_name))
        {
            self.skip_raw_text(&tag_name);
        }

        OpenTagEvent {
            tag_name,
            tag_span: Span::new(start, end),
            tag_name_end,
            attributes,
        }
    }

    fn skip_raw_text(&mut self, tag_name: &str) {
        let close = format!("</{}", tag_name.to_ascii_lowercase());
        let haystack = &self.bytes[self.pos..];
        let found = haystack
            .windows(close.len())
            .position(|window| window.eq_ignore_ascii_case(close.as_bytes()));
        self.pos = match found {
            Some(rel) => self.pos + rel,
            None => self.bytes.len(),
        };
    }

    /// Skip an unquoted or quoted attribute value.
    ///
    /// An arrow `=>` continues an unquoted value, so `onClick=(e) => go(e)`
    /// is one value even with whitespace around the arrow.
    fn skip_value(&self, mut i: usize) -> usize {
        let len = self.bytes.len();
        if i >= len {
            return len;
        }
        if is_quote(self.bytes[i]) {
            return self.skip_string(i);
        }
        while i < len {
            match self.bytes[i] {
                b'(' | b'[' | b'{' => i = self.skip_group(i),
                quote if is_quote(quote) => i = self.skip_string(i),
                b'=' if self.byte_at(i + 1) == Some(b'>') => {
                    i = self.skip_whitespace(i + 2);
                }
                b'/' if self.byte_at(i + 1) == Some(b'>') => break,
                b'>' | b'<' | b',' => break,
                byte if byte.is_ascii_whitespace() => {
                    let next = self.skip_whitespace(i);
                    if !self.starts_with_at(next, "=>") {
                        break;
                    }
                    i = next;
                }
                _ => i += 1,
            }
        }
        i
    }

    /// Skip a bracketed group starting at `i`. Returns the index past the closing bracket.
    fn skip_group(&self, i: usize) -> usize {
        let len = self.bytes.len();
        let mut depth = 0usize;
        let mut j = i;
        while j < len {
            match self.bytes[j] {
                quote if is_quote(quote) => {
                    j = self.skip_string(j);
                    continue;
                }
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        return j + 1;
                    }
                }
                _ => {}
            }
            j += 1;
        }
        len
    }

    /// Skip a quoted string starting at `i`. Returns the index past the closing quote.
    fn skip_string(&self, i: usize) -> usize {
        let len = self.bytes.len();
        let quote = self.bytes[i];
        let mut j = i + 1;
        while j < len {
            match self.bytes[j] {
                b'\\' => j += 2,
                byte if byte == quote => return j + 1,
                _ => j += 1,
            }
        }
        len
    }

    /// Skip a closing tag or declaration body up to and including `>`.
    /// Stops before a `<` so a following tag is not swallowed.
    fn skip_to_tag_close(&self, mut i: usize) -> usize {
        let len = self.bytes.len();
        while i < len {
            match self.bytes[i] {
                b'>' => return i + 1,
                b'<' => return i,
                _ => i += 1,
            }
        }
        len
    }

    fn skip_whitespace(&self, mut i: usize) -> usize {
        while i < self.bytes.len() && self.bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        i
    }

    fn skip_separators(&self, mut i: usize) -> usize {
        while i < self.bytes.len() && (self.bytes[i].is_ascii_whitespace() || self.bytes[i] == b',')
        {
            i += 1;
        }
        i
    }

    fn byte_at(&self, i: usize) -> Option<u8> {
        self.bytes.get(i).copied()
    }

    fn starts_with_at(&self, i: usize, needle: &str) -> bool {
        self.bytes
            .get(i..)
            .is_some_and(|rest| rest.starts_with(needle.as_bytes()))
    }

    fn find_from(&self, i: usize, needle: &str) -> Option<usize> {
        self.text.get(i..)?.find(needle).map(|rel| i + rel)
    }
}

impl Iterator for MarkupTokenizer<'_> {
    type Item = MarkupEvent;

    fn next(&mut self) -> Option<MarkupEvent> {
        if self.finished {
            return None;
        }
        if let Some(start) = self.next_tag_start() {
            return Some(MarkupEvent::OpenTag(self.open_tag(start)));
        }
        self.finished = true;
        Some(MarkupEvent::Finished)
    }
}

fn is_quote(byte: u8) -> bool {
    matches!(byte, b'"' | b'\'' | b'`')
}

fn is_tag_start_byte(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || matches!(byte, b'@' | b'$' | b'_') || byte >= 0x80
}

fn is_tag_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b':' | b'@' | b'$') || byte >= 0x80
}

fn is_attr_name_byte(byte: u8) -> bool {
    !(byte.is_ascii_whitespace()
        || is_quote(byte)
        || matches!(
            byte,
            b'=' | b'>' | b'<' | b'/' | b'(' | b')' | b',' | b'{' | b'}' | b'[' | b']' | b'|' | b';'
        ))
}
