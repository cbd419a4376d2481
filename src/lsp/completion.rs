//! Completion support for AppliesTo expressions.
//!
//! Runs the editing engine at the cursor and turns each suggestion into a
//! completion item whose text edit replaces the partially typed word. The
//! cursor placement from `apply` becomes snippet tab stops.

use tower_lsp::lsp_types::*;
use tracing::debug;

use crate::catalog::{operators, FunctionDescriptor, FunctionNamespace, OperatorDescriptor, Provenance};
use crate::document::{DocumentState, ExpressionAt};
use crate::editor::{analyze, apply, suggest, CursorPlacement, EditOperation, Suggestion};

/// Escape text for use inside an LSP snippet.
fn escape_snippet(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '$' | '}' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Render an edit's inserted text for the host, with tab stops when the
/// cursor does not simply land after the insertion.
fn render_insert_text(at: &ExpressionAt<'_>, edit: &EditOperation) -> (String, InsertTextFormat) {
    let text = &edit.insert_text;
    match edit.local_placement() {
        CursorPlacement::Cursor(pos) if pos == text.len() => {
            (at.encode(text), InsertTextFormat::PLAIN_TEXT)
        }
        CursorPlacement::Cursor(pos) => {
            let snippet = format!(
                "{}$0{}",
                escape_snippet(&at.encode(&text[..pos])),
                escape_snippet(&at.encode(&text[pos..]))
            );
            (snippet, InsertTextFormat::SNIPPET)
        }
        CursorPlacement::Selection(range) => {
            let snippet = format!(
                "{}${{1:{}}}{}",
                escape_snippet(&at.encode(&text[..range.start])),
                escape_snippet(&at.encode(&text[range.clone()])),
                escape_snippet(&at.encode(&text[range.end..]))
            );
            (snippet, InsertTextFormat::SNIPPET)
        }
    }
}

/// Markdown documentation for a function.
pub(crate) fn function_docs(function: &FunctionDescriptor) -> String {
    let mut doc = format!("```\n{}\n```", function.insert_text());
    if !function.description.is_empty() {
        doc.push_str(&format!("\n\n{}", function.description));
    }
    if function.takes_parameters() {
        if let Some(parameters) = &function.parameters {
            doc.push_str(&format!("\n\n*Parameters:* {}", parameters));
        }
    }
    if let Some(example) = &function.example {
        doc.push_str(&format!("\n\n*Example:* `{}`", example));
    }
    if let Provenance::Custom { id } = function.provenance {
        doc.push_str(&format!("\n\n*Custom function #{}*", id));
        if let Some(code) = &function.code {
            doc.push_str(&format!("\n\n```\n{}\n```", code));
        }
    }
    doc
}

/// Markdown documentation for an operator.
pub(crate) fn operator_docs(op: &OperatorDescriptor) -> String {
    let mut doc = format!("**`{}`** ({})", op.symbol, op.category.as_str());
    if !op.alternatives.is_empty() {
        let alternatives: Vec<String> = op.alternatives.iter().map(|a| format!("`{}`", a)).collect();
        doc.push_str(&format!("\n\nAlso written {}", alternatives.join(", ")));
    }
    doc.push_str(&format!("\n\n{}", op.description));
    if let Some(example) = &op.example {
        doc.push_str(&format!("\n\n*Example:* `{}`", example));
    }
    doc
}

fn completion_item(at: &ExpressionAt<'_>, word_start: usize, rank: usize, chosen: Suggestion<'_>) -> CompletionItem {
    let edit = apply(chosen, at.source(), word_start, at.offset);
    let (new_text, format) = render_insert_text(at, &edit);
    let range = at.range_of(&edit.replace);

    let (kind, detail, docs, filter_text) = match chosen {
        Suggestion::Function(f) => (
            CompletionItemKind::FUNCTION,
            f.insert_text().to_string(),
            function_docs(f),
            None,
        ),
        Suggestion::Operator(op) => (
            CompletionItemKind::OPERATOR,
            format!("{} operator", op.category.as_str()),
            operator_docs(op),
            // Typing `an` must still match `&&`
            Some(edit.insert_text.clone()),
        ),
    };

    CompletionItem {
        label: chosen.label().to_string(),
        kind: Some(kind),
        detail: Some(detail),
        documentation: Some(Documentation::MarkupContent(MarkupContent {
            kind: MarkupKind::Markdown,
            value: docs,
        })),
        sort_text: Some(format!("{:02}", rank)),
        filter_text,
        insert_text_format: Some(format),
        text_edit: Some(CompletionTextEdit::Edit(TextEdit { range, new_text })),
        ..Default::default()
    }
}

/// Generate completions at a position in a document.
pub fn completion_at_position(
    doc: &DocumentState,
    namespace: &FunctionNamespace,
    position: Position,
) -> Option<CompletionResponse> {
    let at = doc.expression_at(position)?;
    let context = analyze(at.source(), at.offset);
    debug!(
        word = %context.word,
        kind = ?context.kind,
        context = ?context.context,
        "completion context"
    );
    if !context.wants_suggestions() {
        return None;
    }

    let items: Vec<CompletionItem> = suggest(&context.word, namespace.functions(), operators())
        .into_iter()
        .enumerate()
        .map(|(rank, chosen)| completion_item(&at, context.start, rank, chosen))
        .collect();

    if items.is_empty() {
        None
    } else {
        Some(CompletionResponse::List(CompletionList {
            is_incomplete: true,
            items,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CustomFunction;
    use crate::document::DocumentFormat;

    fn get_completions(source: &str, format: DocumentFormat, position: Position) -> Vec<CompletionItem> {
        let doc = DocumentState::new(source.to_string(), 0, format);
        let namespace = FunctionNamespace::default();
        match completion_at_position(&doc, &namespace, position) {
            Some(CompletionResponse::List(list)) => {
                assert!(list.is_incomplete);
                list.items
            }
            _ => vec![],
        }
    }

    fn labels(items: &[CompletionItem]) -> Vec<&str> {
        items.iter().map(|i| i.label.as_str()).collect()
    }

    fn edit(item: &CompletionItem) -> &TextEdit {
        match item.text_edit.as_ref() {
            Some(CompletionTextEdit::Edit(edit)) => edit,
            other => panic!("expected a plain text edit, got {:?}", other),
        }
    }

    #[test]
    fn function_prefix_completion() {
        let items = get_completions("isLin", DocumentFormat::Expression, Position::new(0, 5));
        assert_eq!(labels(&items), vec!["isLinux"]);
        let edit = edit(&items[0]);
        assert_eq!(edit.new_text, "isLinux()");
        assert_eq!(edit.range, Range::new(Position::new(0, 0), Position::new(0, 5)));
        assert_eq!(items[0].insert_text_format, Some(InsertTextFormat::PLAIN_TEXT));
    }

    #[test]
    fn placeholder_becomes_tab_stop() {
        let items = get_completions("isLinux() && hasC", DocumentFormat::Expression, Position::new(0, 17));
        assert_eq!(labels(&items), vec!["hasCategory"]);
        let edit = edit(&items[0]);
        assert_eq!(edit.new_text, "hasCategory(\"${1:<string>}\")");
        assert_eq!(edit.range.start, Position::new(0, 13));
        assert_eq!(items[0].insert_text_format, Some(InsertTextFormat::SNIPPET));
    }

    #[test]
    fn operator_alternative_completion() {
        let items = get_completions("isLinux() AN", DocumentFormat::Expression, Position::new(0, 12));
        assert_eq!(labels(&items), vec!["&&"]);
        assert_eq!(edit(&items[0]).new_text, "and");
        assert_eq!(items[0].filter_text.as_deref(), Some("and"));
        assert_eq!(items[0].kind, Some(CompletionItemKind::OPERATOR));
    }

    #[test]
    fn no_completions_inside_string() {
        let items = get_completions("hasCategory(\"is", DocumentFormat::Expression, Position::new(0, 15));
        assert!(items.is_empty());
    }

    #[test]
    fn no_completions_for_empty_word() {
        assert!(get_completions("isLinux() ", DocumentFormat::Expression, Position::new(0, 10)).is_empty());
    }

    #[test]
    fn sort_text_preserves_rank() {
        let items = get_completions("is", DocumentFormat::Expression, Position::new(0, 2));
        assert_eq!(items.len(), 5);
        let sort: Vec<_> = items.iter().map(|i| i.sort_text.clone().unwrap()).collect();
        assert_eq!(sort, vec!["00", "01", "02", "03", "04"]);
    }

    #[test]
    fn json_module_completion_is_escaped() {
        let json = "{\"appliesTo\": \"hasC\"}";
        let items = get_completions(json, DocumentFormat::JsonModule, Position::new(0, 19));
        assert_eq!(labels(&items), vec!["hasCategory"]);
        let edit = edit(&items[0]);
        assert_eq!(edit.new_text, "hasCategory(\\\\\"${1:<string>}\\\\\")");
        assert_eq!(edit.range, Range::new(Position::new(0, 15), Position::new(0, 19)));
    }

    #[test]
    fn outside_module_expression_has_no_completions() {
        let json = "{\"name\": \"isL\", \"appliesTo\": \"\"}";
        assert!(get_completions(json, DocumentFormat::JsonModule, Position::new(0, 13)).is_empty());
    }

    #[test]
    fn custom_functions_are_documented() {
        let namespace = FunctionNamespace::from_custom_records(vec![CustomFunction {
            id: 12,
            name: "isProdWeb".to_string(),
            code: Some("isLinux() && hasCategory(\"web\")".to_string()),
            description: Some("Production web servers".to_string()),
            syntax: None,
            parameters: None,
            example: None,
        }]);
        let doc = DocumentState::new("isProd".to_string(), 0, DocumentFormat::Expression);
        let Some(CompletionResponse::List(list)) =
            completion_at_position(&doc, &namespace, Position::new(0, 6))
        else {
            panic!("expected completions");
        };
        assert_eq!(labels(&list.items), vec!["isProdWeb"]);
        let Some(Documentation::MarkupContent(docs)) = &list.items[0].documentation else {
            panic!("expected markdown docs");
        };
        assert!(docs.value.contains("Custom function #12"));
        assert!(docs.value.contains("Production web servers"));
    }

    #[test]
    fn snippet_escaping() {
        assert_eq!(escape_snippet("a$b}c\\d"), "a\\$b\\}c\\\\d");
    }
}
