use tower_lsp_server::ls_types::{Position, Range};

/// Maps between LSP positions (line, UTF-16 column) and byte offsets.
pub struct PositionMapper<'a> {
    text: &'a str,
    line_starts: Vec<usize>,
}

impl<'a> PositionMapper<'a> {
    /// Create a new PositionMapper with pre-computed line starts
    pub fn new(text: &'a str) -> Self {
        let line_starts = compute_line_starts(text);
        Self { text, line_starts }
    }

    fn line_bounds(&self, line: usize) -> Option<(usize, usize)> {
        let start = *self.line_starts.get(line)?;
        let end = match self.line_starts.get(line + 1) {
            Some(next) => next - 1, // Exclude the newline
            None => self.text.len(),
        };
        Some((start, end))
    }

    /// Convert an LSP position to a byte offset.
    ///
    /// Columns past the end of the line clamp to the line end. Returns `None`
    /// for a line past the end of the document.
    pub fn position_to_byte(&self, position: Position) -> Option<usize> {
        let (line_start, line_end) = self.line_bounds(position.line as usize)?;
        let line_text = &self.text[line_start..line_end];

        match convert_utf16_to_byte_in_line(line_text, position.character as usize) {
            Some(byte_offset) => Some(line_start + byte_offset),
            None => Some(line_end),
        }
    }

    /// Convert a byte offset to an LSP position.
    ///
    /// An offset inside a multi-byte character maps to that character's start.
    pub fn byte_to_position(&self, offset: usize) -> Option<Position> {
        if offset > self.text.len() {
            return None;
        }
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };
        let (line_start, line_end) = self.line_bounds(line)?;
        let line_text = &self.text[line_start..line_end];

        let mut line_offset = offset.saturating_sub(line_start).min(line_text.len());
        while !line_text.is_char_boundary(line_offset) {
            line_offset -= 1;
        }
        let character = convert_byte_to_utf16_in_line(line_text, line_offset).unwrap_or(0);

        Some(Position {
            line: line as u32,
            character: character as u32,
        })
    }

    /// Convert a byte range to an LSP range
    pub fn byte_range_to_range(&self, start: usize, end: usize) -> Option<Range> {
        Some(Range {
            start: self.byte_to_position(start)?,
            end: self.byte_to_position(end)?,
        })
    }
}

/// Compute line start offsets for efficient position mapping
pub fn compute_line_starts(text: &str) -> Vec<usize> {
    let mut line_starts = vec![0];
    line_starts.extend(
        text.bytes()
            .enumerate()
            .filter(|(_, byte)| *byte == b'\n')
            .map(|(i, _)| i + 1),
    );
    line_starts
}

/// Convert UTF-16 position to byte position within a line
/// Returns None if the UTF-16 position is beyond the end of the line
#[inline(always)]
pub fn convert_utf16_to_byte_in_line(line_text: &str, utf16_pos: usize) -> Option<usize> {
    let mut byte_offset = 0;
    let mut utf16_offset = 0;

    for ch in line_text.chars() {
        if utf16_offset >= utf16_pos {
            return Some(byte_offset);
        }
        utf16_offset += ch.len_utf16();
        byte_offset += ch.len_utf8();
    }

    if utf16_offset >= utf16_pos {
        Some(byte_offset)
    } else {
        None
    }
}

/// Convert byte position to UTF-16 position within a line
/// Returns None if the byte position is in the middle of a multi-byte character
#[inline(always)]
pub fn convert_byte_to_utf16_in_line(line_text: &str, byte_pos: usize) -> Option<usize> {
    let prefix = line_text.get(..byte_pos)?;
    Some(prefix.chars().map(char::len_utf16).sum())
}
