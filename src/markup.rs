//! Markup event source: open-tag events over a template document.

mod event;
mod tokenizer;

pub use event::{ArgumentRecord, AttributeRecord, MarkupEvent, OpenTagEvent, Span};
pub use tokenizer::MarkupTokenizer;
