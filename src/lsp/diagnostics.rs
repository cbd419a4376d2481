//! Lexical diagnostics for AppliesTo expressions.
//!
//! Expressions are evaluated by the monitoring platform, so checks here stay
//! lexical: string termination, parenthesis balance, and calls to names that
//! no known function carries.

use std::ops::Range;

use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};

use crate::catalog::{get_operator, FunctionNamespace};
use crate::document::{DocumentState, ExpressionAt, RegionState};
use crate::editor::{is_ident_byte, QuoteScanner};

const SOURCE: &str = "appliesTo";

/// A problem found in one expression, in expression-local offsets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexicalIssue {
    pub span: Range<usize>,
    pub severity: DiagnosticSeverity,
    pub code: &'static str,
    pub message: String,
}

impl LexicalIssue {
    fn error(span: Range<usize>, code: &'static str, message: String) -> Self {
        Self {
            span,
            severity: DiagnosticSeverity::ERROR,
            code,
            message,
        }
    }
}

/// Scan one expression for lexical problems.
pub fn lexical_issues(source: &str, namespace: &FunctionNamespace) -> Vec<LexicalIssue> {
    let bytes = source.as_bytes();
    let mut issues = Vec::new();
    let mut scanner = QuoteScanner::new();
    let mut open_parens = Vec::new();
    let mut i = 0;

    while i < bytes.len() {
        if scanner.advance(bytes, i) || scanner.in_string() {
            i += 1;
            continue;
        }

        match bytes[i] {
            b'(' => open_parens.push(i),
            b')' => {
                if open_parens.pop().is_none() {
                    issues.push(LexicalIssue::error(
                        i..i + 1,
                        "unbalanced-paren",
                        "unmatched `)`".to_string(),
                    ));
                }
            }
            b if (b.is_ascii_alphabetic() || b == b'_')
                && (i == 0 || !is_ident_byte(bytes[i - 1])) =>
            {
                let end = i + bytes[i..].iter().take_while(|b| is_ident_byte(**b)).count();
                let name = &source[i..end];
                let is_call = bytes.get(end) == Some(&b'(');
                if is_call && !namespace.contains(name) && get_operator(name).is_none() {
                    issues.push(LexicalIssue {
                        span: i..end,
                        severity: DiagnosticSeverity::WARNING,
                        code: "unknown-function",
                        message: format!("unknown function `{}`", name),
                    });
                }
                i = end;
                continue;
            }
            _ => {}
        }
        i += 1;
    }

    if let Some(open) = scanner.open() {
        issues.push(LexicalIssue::error(
            open.start..source.len(),
            "unterminated-string",
            "unterminated string literal".to_string(),
        ));
    }

    for start in open_parens {
        issues.push(LexicalIssue::error(
            start..start + 1,
            "unbalanced-paren",
            "unclosed `(`".to_string(),
        ));
    }

    issues.sort_by_key(|issue| issue.span.start);
    issues
}

fn region_diagnostics(
    doc: &DocumentState,
    region: &RegionState,
    namespace: &FunctionNamespace,
) -> Vec<Diagnostic> {
    let at = ExpressionAt::new(&doc.line_index, region, 0);
    lexical_issues(at.source(), namespace)
        .into_iter()
        .map(|issue| Diagnostic {
            range: at.range_of(&issue.span),
            severity: Some(issue.severity),
            code: Some(NumberOrString::String(issue.code.to_string())),
            code_description: None,
            source: Some(SOURCE.to_string()),
            message: issue.message,
            related_information: None,
            tags: None,
            data: None,
        })
        .collect()
}

/// Diagnostics for every expression in a document, in host coordinates.
pub fn to_diagnostics(doc: &DocumentState, namespace: &FunctionNamespace) -> Vec<Diagnostic> {
    doc.regions
        .iter()
        .flat_map(|region| region_diagnostics(doc, region, namespace))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codes(source: &str) -> Vec<(&'static str, Range<usize>)> {
        lexical_issues(source, &FunctionNamespace::default())
            .into_iter()
            .map(|i| (i.code, i.span))
            .collect()
    }

    #[test]
    fn clean_expression() {
        assert!(codes("isLinux() && hasCategory(\"web\")").is_empty());
    }

    #[test]
    fn unterminated_string() {
        assert_eq!(codes("hasCategory(\"web"), vec![
            ("unbalanced-paren", 11..12),
            ("unterminated-string", 12..16),
        ]);
    }

    #[test]
    fn parens_inside_strings_are_ignored() {
        assert!(codes("hasCategory(\"(web\")").is_empty());
    }

    #[test]
    fn unmatched_close_paren() {
        assert_eq!(codes("isLinux())"), vec![("unbalanced-paren", 9..10)]);
    }

    #[test]
    fn unknown_function_call() {
        let issues = lexical_issues("isLinux() || isMainframe()", &FunctionNamespace::default());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].code, "unknown-function");
        assert_eq!(issues[0].severity, DiagnosticSeverity::WARNING);
        assert_eq!(issues[0].span, 13..24);
    }

    #[test]
    fn word_operators_and_properties_are_not_calls() {
        assert!(codes("not(isLinux()) and system.hostname =~ \"web\"").is_empty());
        assert!(codes("isLinux ()").is_empty());
    }

    #[test]
    fn module_diagnostics_use_host_ranges() {
        use crate::document::DocumentFormat;
        use tower_lsp::lsp_types::Position;

        let json = "{\n  \"appliesTo\": \"isBogus() \\u0026\\u0026 (\"\n}";
        let doc = DocumentState::new(json.to_string(), 0, DocumentFormat::JsonModule);
        let diagnostics = to_diagnostics(&doc, &FunctionNamespace::default());
        assert_eq!(diagnostics.len(), 2);
        assert_eq!(diagnostics[0].range.start, Position::new(1, 16));
        assert_eq!(diagnostics[0].range.end, Position::new(1, 23));
        // `(` sits after two six-byte escapes
        assert_eq!(diagnostics[1].range.start, Position::new(1, 39));
        assert_eq!(diagnostics[1].source.as_deref(), Some("appliesTo"));
    }
}
