//! Cursor context analysis for AppliesTo expressions.
//!
//! Classifies the token that ends at the cursor so completion knows what the
//! user is typing: the inside of a string literal, an operator, or the start of
//! a function name.

use std::ops::Range;

use super::scan::{is_ident_byte, open_quote_before};

/// Two-character operators, checked in this order against the text ending at
/// the cursor. No entry may be a suffix of an earlier entry.
pub const MULTI_CHAR_OPERATORS: [&str; 8] = ["==", "!=", ">=", "<=", "=~", "!~", "&&", "||"];

/// Characters that form an operator token on their own.
const SINGLE_CHAR_OPERATORS: &[u8] = b"><=!&|()";

/// Operators spelled as words.
const WORD_OPERATORS: [&str; 2] = ["and", "or"];

/// What the word under the cursor is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WordKind {
    /// Inside an unterminated string literal.
    StringLiteral,
    /// A symbolic or word operator.
    Operator,
    /// A (possibly empty) run of identifier characters.
    FunctionName,
}

/// Coarse position of the word within the expression, for UI hints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntacticContext {
    Start,
    AfterParen,
    AfterOperator,
    AfterFunction,
    Normal,
}

/// The analyzer's view of one cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordContext {
    /// The matched text.
    pub word: String,
    /// Byte offset where the word starts.
    pub start: usize,
    /// Byte offset where the word ends (the cursor).
    pub end: usize,
    pub kind: WordKind,
    pub context: SyntacticContext,
}

impl WordContext {
    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Whether the suggestion engine should run for this word.
    pub fn wants_suggestions(&self) -> bool {
        !self.word.is_empty() && self.kind != WordKind::StringLiteral
    }
}

/// Analyze the word ending at `cursor` in `text`.
///
/// `cursor` is a byte offset on a char boundary, `0 <= cursor <= text.len()`.
pub fn analyze(text: &str, cursor: usize) -> WordContext {
    debug_assert!(
        cursor <= text.len() && text.is_char_boundary(cursor),
        "cursor {cursor} out of range for text of length {}",
        text.len()
    );

    let (start, kind) = if let Some(open) = open_quote_before(text, cursor) {
        (open.start + 1, WordKind::StringLiteral)
    } else if let Some(len) = operator_len_before(text, cursor) {
        (cursor - len, WordKind::Operator)
    } else {
        (identifier_start(text, cursor), WordKind::FunctionName)
    };

    WordContext {
        word: text[start..cursor].to_string(),
        start,
        end: cursor,
        kind,
        context: syntactic_context(&text[..start]),
    }
}

/// Length of the operator token ending at `cursor`, if there is one.
fn operator_len_before(text: &str, cursor: usize) -> Option<usize> {
    let before = &text[..cursor];

    if let Some(op) = MULTI_CHAR_OPERATORS.iter().find(|op| before.ends_with(*op)) {
        return Some(op.len());
    }

    if before
        .as_bytes()
        .last()
        .is_some_and(|b| SINGLE_CHAR_OPERATORS.contains(b))
    {
        return Some(1);
    }

    word_operator_len(text, cursor)
}

/// Length of `and` / `or` ending at `cursor` when it stands as a whole word.
fn word_operator_len(text: &str, cursor: usize) -> Option<usize> {
    let bytes = text.as_bytes();
    if bytes.get(cursor).is_some_and(|b| is_ident_byte(*b)) {
        return None;
    }

    WORD_OPERATORS.iter().find_map(|word| {
        let start = cursor.checked_sub(word.len())?;
        let whole_word = bytes[start..cursor].eq_ignore_ascii_case(word.as_bytes())
            && (start == 0 || !is_ident_byte(bytes[start - 1]));
        whole_word.then_some(word.len())
    })
}

/// Start of the run of ASCII letters and underscores ending at `cursor`.
fn identifier_start(text: &str, cursor: usize) -> usize {
    let run = text.as_bytes()[..cursor]
        .iter()
        .rev()
        .take_while(|b| b.is_ascii_alphabetic() || **b == b'_')
        .count();
    cursor - run
}

fn syntactic_context(before_word: &str) -> SyntacticContext {
    match before_word.trim_end().chars().next_back() {
        None => SyntacticContext::Start,
        Some('(') => SyntacticContext::AfterParen,
        Some('=' | '!' | '<' | '>' | '~' | '&' | '|') => SyntacticContext::AfterOperator,
        Some(c) if c.is_ascii_alphanumeric() || c == '_' => SyntacticContext::AfterFunction,
        Some(_) => SyntacticContext::Normal,
    }
}
