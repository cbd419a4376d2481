//! Lexical helpers shared by the cursor analyzer, hover, and diagnostics.
//!
//! A quote preceded by a backslash neither opens nor closes a literal. A quote of
//! the other kind inside an open literal is plain content.

/// An open string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenQuote {
    /// The quote byte (`"` or `'`).
    pub quote: u8,
    /// Byte offset of the opening quote.
    pub start: usize,
}

/// Left-to-right quote state machine.
#[derive(Debug, Clone, Copy, Default)]
pub struct QuoteScanner {
    open: Option<OpenQuote>,
}

impl QuoteScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the byte at `index`. Returns true if the byte opened or closed a literal.
    pub fn advance(&mut self, bytes: &[u8], index: usize) -> bool {
        let byte = bytes[index];
        if !matches!(byte, b'"' | b'\'') {
            return false;
        }
        if index > 0 && bytes[index - 1] == b'\\' {
            return false;
        }
        match self.open {
            None => {
                self.open = Some(OpenQuote {
                    quote: byte,
                    start: index,
                });
                true
            }
            Some(open) if open.quote == byte => {
                self.open = None;
                true
            }
            Some(_) => false,
        }
    }

    /// The literal currently open, if any.
    pub fn open(&self) -> Option<OpenQuote> {
        self.open
    }

    pub fn in_string(&self) -> bool {
        self.open.is_some()
    }
}

/// Scan `text[..end]` and return the literal still open at `end`.
pub fn open_quote_before(text: &str, end: usize) -> Option<OpenQuote> {
    let bytes = &text.as_bytes()[..end];
    let mut scanner = QuoteScanner::new();
    for i in 0..bytes.len() {
        scanner.advance(bytes, i);
    }
    scanner.open()
}

/// Bytes that continue an identifier.
pub fn is_ident_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
