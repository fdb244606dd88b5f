/// An open text document as last synchronized by the client
#[derive(Debug, Clone)]
pub struct Document {
    text: String,
    version: Option<i32>,
    language_id: Option<String>,
}

impl Document {
    /// Create a new document with just text
    pub fn new(text: String) -> Self {
        Self {
            text,
            version: None,
            language_id: None,
        }
    }

    /// Create a new document as sent by `textDocument/didOpen`
    pub fn opened(text: String, version: i32, language_id: String) -> Self {
        Self {
            text,
            version: Some(version),
            language_id: Some(language_id),
        }
    }

    /// Get the text content
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Get the document version
    pub fn version(&self) -> Option<i32> {
        self.version
    }

    /// Get the language ID
    pub fn language_id(&self) -> Option<&str> {
        self.language_id.as_deref()
    }

    /// Replace the text, keeping the language ID
    pub fn update(&mut self, text: String, version: Option<i32>) {
        self.text = text;
        self.version = version;
    }

    /// Get a position mapper for this document
    pub fn position_mapper(&self) -> crate::text::PositionMapper<'_> {
        crate::text::PositionMapper::new(self.text())
    }
}
