//! Position conversion between LSP coordinates and byte offsets.
//!
//! The editing engine works on UTF-8 byte offsets; LSP positions count UTF-16
//! code units per line.

use std::ops::Range;

use tower_lsp::lsp_types::Position;

/// Line start table for one document.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Byte offset where each line starts.
    line_starts: Vec<usize>,
    source: String,
}

impl LineIndex {
    pub fn new(source: String) -> Self {
        let line_starts = std::iter::once(0)
            .chain(source.match_indices('\n').map(|(i, _)| i + 1))
            .collect();
        Self {
            line_starts,
            source,
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Byte range of a line, excluding its `\n` or `\r\n` terminator.
    fn line_span(&self, line: usize) -> Range<usize> {
        let start = self.line_starts[line];
        let end = match self.line_starts.get(line + 1) {
            Some(&next) if self.source.as_bytes()[..next - 1].ends_with(b"\r") => {
                (next - 2).max(start)
            }
            Some(&next) => next - 1,
            None => self.source.len(),
        };
        start..end
    }

    /// Convert a byte offset to an LSP position.
    pub fn offset_to_position(&self, offset: usize) -> Position {
        let offset = offset.min(self.source.len());
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let span = self.line_span(line);
        let col: usize = self.source[span.start..offset.max(span.start).min(span.end)]
            .chars()
            .map(char::len_utf16)
            .sum();

        Position::new(line as u32, col as u32)
    }

    /// Convert an LSP position to a byte offset.
    ///
    /// Columns past the end of a line clamp to the line end; a column inside a
    /// surrogate pair resolves to the start of that character. Returns None if
    /// the line does not exist.
    pub fn position_to_offset(&self, position: Position) -> Option<usize> {
        let line = position.line as usize;
        if line >= self.line_starts.len() {
            return None;
        }

        let span = self.line_span(line);
        let mut utf16_col = 0u32;
        for (i, c) in self.source[span.clone()].char_indices() {
            if utf16_col >= position.character {
                return Some(span.start + i);
            }
            utf16_col += c.len_utf16() as u32;
            if utf16_col > position.character {
                return Some(span.start + i);
            }
        }

        Some(span.end)
    }

    /// Convert a byte span to an LSP range.
    pub fn span_to_range(&self, span: &Range<usize>) -> tower_lsp::lsp_types::Range {
        tower_lsp::lsp_types::Range::new(
            self.offset_to_position(span.start),
            self.offset_to_position(span.end),
        )
    }
}
