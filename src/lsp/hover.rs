//! Hover information for AppliesTo expressions.

use std::ops::Range;

use tower_lsp::lsp_types::{Hover, HoverContents, MarkupContent, MarkupKind, Position};

use super::completion::{function_docs, operator_docs};
use crate::catalog::{get_operator, FunctionNamespace};
use crate::document::DocumentState;
use crate::editor::{is_ident_byte, open_quote_before};

fn is_symbol_byte(b: u8) -> bool {
    matches!(b, b'=' | b'!' | b'<' | b'>' | b'~' | b'&' | b'|' | b'(' | b')')
}

/// The run of bytes matching `pred` that touches `offset`.
fn token_around(source: &str, offset: usize, pred: fn(u8) -> bool) -> Option<Range<usize>> {
    let bytes = source.as_bytes();
    let start = offset - bytes[..offset].iter().rev().take_while(|b| pred(**b)).count();
    let end = offset + bytes[offset..].iter().take_while(|b| pred(**b)).count();
    (start < end).then_some(start..end)
}

/// Shrink a symbol run to the operator under the cursor.
///
/// Runs like `)&&!(` hold several operators; try the longest spelling that
/// covers `offset` first.
fn operator_within(source: &str, run: Range<usize>, offset: usize) -> Option<Range<usize>> {
    [2, 1].into_iter().find_map(|len| {
        let first = offset.saturating_sub(len).max(run.start);
        let last = offset.min(run.end.saturating_sub(len));
        (first..=last)
            .map(|start| start..start + len)
            .find(|span| get_operator(&source[span.clone()]).is_some())
    })
}

/// Generate hover for the function or operator at a position.
pub fn hover_at_position(
    doc: &DocumentState,
    namespace: &FunctionNamespace,
    position: Position,
) -> Option<Hover> {
    let at = doc.expression_at(position)?;
    let source = at.source();
    let offset = at.offset;

    let (span, value) = if let Some(span) = token_around(source, offset, is_ident_byte) {
        if open_quote_before(source, span.start).is_some() {
            return None;
        }
        let word = &source[span.clone()];
        let docs: Vec<String> = namespace.lookup(word).map(function_docs).collect();
        if !docs.is_empty() {
            (span, docs.join("\n\n---\n\n"))
        } else {
            let op = get_operator(word)?;
            (span, operator_docs(op))
        }
    } else {
        let run = token_around(source, offset, is_symbol_byte)?;
        if open_quote_before(source, run.start).is_some() {
            return None;
        }
        let span = operator_within(source, run, offset)?;
        let op = get_operator(&source[span.clone()])?;
        (span, operator_docs(op))
    };

    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value,
        }),
        range: Some(at.range_of(&span)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CustomFunction;
    use crate::document::DocumentFormat;

    fn hover_text(source: &str, col: u32) -> Option<String> {
        hover_with(source, col, &FunctionNamespace::default())
    }

    fn hover_with(source: &str, col: u32, namespace: &FunctionNamespace) -> Option<String> {
        let doc = DocumentState::new(source.to_string(), 0, DocumentFormat::Expression);
        let hover = hover_at_position(&doc, namespace, Position::new(0, col))?;
        match hover.contents {
            HoverContents::Markup(markup) => Some(markup.value),
            _ => None,
        }
    }

    #[test]
    fn hover_on_function() {
        let text = hover_text("isLinux() && hasCategory(\"web\")", 16).unwrap();
        assert!(text.contains("hasCategory(\"<string>\")"));
        assert!(text.contains("*Parameters:*"));
    }

    #[test]
    fn hover_at_end_of_name() {
        assert!(hover_text("isLinux()", 7).unwrap().contains("Linux"));
    }

    #[test]
    fn hover_on_symbol_operator() {
        let text = hover_text("isLinux() && isWindows()", 10).unwrap();
        assert!(text.contains("**`&&`** (logical)"));
        assert!(text.contains("`and`"));
    }

    #[test]
    fn hover_on_adjacent_operators() {
        let text = hover_text("isLinux()&&!isWindows()", 11).unwrap();
        assert!(text.contains("**`&&`**"));
        let text = hover_text("isLinux() && !isWindows()", 13).unwrap();
        assert!(text.contains("**`!`**"));
    }

    #[test]
    fn hover_on_word_operator() {
        let text = hover_text("isLinux() OR isWindows()", 11).unwrap();
        assert!(text.contains("**`||`**"));
    }

    #[test]
    fn no_hover_inside_string() {
        assert!(hover_text("hasCategory(\"isLinux\")", 15).is_none());
    }

    #[test]
    fn no_hover_on_unknown_name() {
        assert!(hover_text("system.hostname", 3).is_none());
    }

    #[test]
    fn hover_custom_function() {
        let namespace = FunctionNamespace::from_custom_records(vec![CustomFunction {
            id: 5,
            name: "isProdWeb".to_string(),
            code: Some("isLinux()".to_string()),
            description: None,
            syntax: None,
            parameters: None,
            example: None,
        }]);
        let text = hover_with("isProdWeb()", 2, &namespace).unwrap();
        assert!(text.contains("Custom function #5"));
        assert!(text.contains("isLinux()"));
    }
}
