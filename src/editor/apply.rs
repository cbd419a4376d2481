//! Turning an accepted suggestion into a text edit.
//!
//! `apply` replaces the partial word that was typed. `insert_at_caret` is the
//! toolbar variant: nothing is replaced and whitespace is padded around the
//! inserted text.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::suggest::Suggestion;
use crate::catalog::FunctionDescriptor;

/// First placeholder in a function's syntax: a quoted string holding an
/// angle-bracket token, or a bare angle-bracket token.
static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*(<[^<>"]+>)[^"]*"|(<[^<>]+>)"#).unwrap());

/// Where the cursor ends up after an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CursorPlacement {
    /// Caret at a byte offset.
    Cursor(usize),
    /// Selected byte range, used to highlight a placeholder.
    Selection(Range<usize>),
}

impl CursorPlacement {
    fn shifted(self, by: usize) -> Self {
        match self {
            CursorPlacement::Cursor(at) => CursorPlacement::Cursor(at + by),
            CursorPlacement::Selection(range) => {
                CursorPlacement::Selection(range.start + by..range.end + by)
            }
        }
    }

    /// The caret offset, or the start of the selection.
    pub fn anchor(&self) -> usize {
        match self {
            CursorPlacement::Cursor(at) => *at,
            CursorPlacement::Selection(range) => range.start,
        }
    }
}

/// A splice into the editor buffer.
///
/// `replace` is a range of the text before the edit; `placement` offsets refer
/// to the text after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOperation {
    pub replace: Range<usize>,
    pub insert_text: String,
    pub placement: CursorPlacement,
}

impl EditOperation {
    /// Apply the edit to `text`, returning the new buffer.
    pub fn apply_to(&self, text: &str) -> String {
        let mut out = String::with_capacity(text.len() + self.insert_text.len());
        out.push_str(&text[..self.replace.start]);
        out.push_str(&self.insert_text);
        out.push_str(&text[self.replace.end..]);
        out
    }

    /// Placement relative to the start of the inserted text.
    pub fn local_placement(&self) -> CursorPlacement {
        match &self.placement {
            CursorPlacement::Cursor(at) => CursorPlacement::Cursor(at - self.replace.start),
            CursorPlacement::Selection(range) => CursorPlacement::Selection(
                range.start - self.replace.start..range.end - self.replace.start,
            ),
        }
    }
}

/// Replace the partial word `text[word_start..cursor]` with the chosen suggestion.
///
/// The typed text is fully replaced by the canonical spelling, so case is
/// corrected and aliases resolved.
pub fn apply(chosen: Suggestion<'_>, text: &str, word_start: usize, cursor: usize) -> EditOperation {
    debug_assert!(word_start <= cursor && cursor <= text.len());

    let (insert_text, local) = match chosen {
        Suggestion::Function(f) => function_insertion(f),
        Suggestion::Operator(op) => {
            let spelling = op.spelling_for(&text[word_start..cursor]).to_string();
            let end = spelling.len();
            (spelling, CursorPlacement::Cursor(end))
        }
    };

    EditOperation {
        replace: word_start..cursor,
        insert_text,
        placement: local.shifted(word_start),
    }
}

/// Insert the chosen function or operator at `caret` without replacing anything.
///
/// A leading space is added unless the previous character is whitespace, `(`,
/// `&`, `|` or `!`. Operators also get a trailing space unless the next
/// character is whitespace or `)`.
pub fn insert_at_caret(chosen: Suggestion<'_>, text: &str, caret: usize) -> EditOperation {
    debug_assert!(caret <= text.len() && text.is_char_boundary(caret));

    let prev = text[..caret].chars().next_back();
    let next = text[caret..].chars().next();
    let leading = prev.is_some_and(|c| !(c.is_whitespace() || matches!(c, '(' | '&' | '|' | '!')));

    let mut insert_text = String::new();
    if leading {
        insert_text.push(' ');
    }

    let placement = match chosen {
        Suggestion::Function(f) => {
            let (body, local) = function_insertion(f);
            insert_text.push_str(&body);
            local.shifted(usize::from(leading))
        }
        Suggestion::Operator(op) => {
            insert_text.push_str(&op.symbol);
            let trailing = !next.is_some_and(|c| c.is_whitespace() || c == ')');
            if trailing {
                insert_text.push(' ');
            }
            CursorPlacement::Cursor(insert_text.len())
        }
    };

    EditOperation {
        replace: caret..caret,
        insert_text,
        placement: placement.shifted(caret),
    }
}

/// Text and caret placement (relative to the text) for a function.
fn function_insertion(f: &FunctionDescriptor) -> (String, CursorPlacement) {
    let text = f.insert_text().to_string();
    let placement = if !f.takes_parameters() {
        CursorPlacement::Cursor(text.len())
    } else if let Some(range) = placeholder_range(&text) {
        CursorPlacement::Selection(range)
    } else if let Some(paren) = text.find('(') {
        CursorPlacement::Cursor(paren + 1)
    } else {
        CursorPlacement::Cursor(text.len())
    };
    (text, placement)
}

/// Byte range of the first angle-bracket placeholder in `syntax`.
fn placeholder_range(syntax: &str) -> Option<Range<usize>> {
    let caps = PLACEHOLDER.captures(syntax)?;
    caps.get(1).or_else(|| caps.get(2)).map(|m| m.range())
}
