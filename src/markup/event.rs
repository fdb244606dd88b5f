//! Events emitted by the markup tokenizer.

/// Half-open byte range `[start, end)` into the document text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end, "span start {} past end {}", start, end);
        Self { start, end }
    }

    /// Inclusive on both ends: a cursor sitting right after the last
    /// character still belongs to the span.
    pub fn contains_inclusive(&self, offset: usize) -> bool {
        self.start <= offset && offset <= self.end
    }
}

/// Argument of a call-style attribute, e.g. `on-click('handleClick')`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgumentRecord {
    /// From the opening `(` to just past the closing `)`.
    pub value_span: Span,
    /// Text between the parentheses, quotes included.
    pub raw_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeRecord {
    pub name: String,
    /// Starts where the attribute name ends and covers the value, if any.
    pub value_span: Span,
    pub argument: Option<ArgumentRecord>,
}

impl AttributeRecord {
    /// Nominal span of the attribute name: `[value_span.start - name.len(), value_span.start]`.
    pub fn name_span(&self) -> Span {
        Span::new(
            self.value_span.start.saturating_sub(self.name.len()),
            self.value_span.start,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenTagEvent {
    pub tag_name: String,
    pub tag_span: Span,
    pub tag_name_end: usize,
    pub attributes: Vec<AttributeRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupEvent {
    OpenTag(OpenTagEvent),
    /// The whole text has been consumed. Always the last event.
    Finished,
}
