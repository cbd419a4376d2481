//! Ranked completion candidates for a partial word.

use crate::catalog::{FunctionDescriptor, OperatorDescriptor};

/// Maximum function candidates returned for one word.
pub const MAX_FUNCTION_SUGGESTIONS: usize = 5;
/// Maximum operator candidates returned for one word.
pub const MAX_OPERATOR_SUGGESTIONS: usize = 3;

/// A completion candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suggestion<'a> {
    Function(&'a FunctionDescriptor),
    Operator(&'a OperatorDescriptor),
}

impl<'a> Suggestion<'a> {
    /// Display name: the function name or the operator symbol.
    pub fn label(&self) -> &'a str {
        match self {
            Suggestion::Function(f) => &f.name,
            Suggestion::Operator(op) => &op.symbol,
        }
    }
}

/// Suggest completions for `word`.
///
/// Functions whose name starts with `word` (case-insensitive) come first, in
/// corpus order, at most five. Operators whose symbol or an alternative starts
/// with `word` follow, at most three; single-character operators are never
/// suggested. An empty word yields nothing.
pub fn suggest<'a>(
    word: &str,
    functions: &'a [FunctionDescriptor],
    operators: &'a [OperatorDescriptor],
) -> Vec<Suggestion<'a>> {
    if word.is_empty() {
        return Vec::new();
    }
    let prefix = word.to_lowercase();

    let function_matches = functions
        .iter()
        .filter(|f| f.name.to_lowercase().starts_with(&prefix))
        .take(MAX_FUNCTION_SUGGESTIONS)
        .map(Suggestion::Function);

    let operator_matches = operators
        .iter()
        .filter(|op| !op.is_single_char() && op.matches_prefix(&prefix))
        .take(MAX_OPERATOR_SUGGESTIONS)
        .map(Suggestion::Operator);

    function_matches.chain(operator_matches).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{builtin_functions, operators, FunctionNamespace};

    fn labels<'a>(items: &[Suggestion<'a>]) -> Vec<&'a str> {
        items.iter().map(|s| s.label()).collect()
    }

    #[test]
    fn empty_word_suggests_nothing() {
        assert!(suggest("", builtin_functions(), operators()).is_empty());
    }

    #[test]
    fn prefix_match_is_case_insensitive() {
        let items = suggest("HASCATEG", builtin_functions(), operators());
        assert_eq!(labels(&items), vec!["hasCategory"]);
    }

    #[test]
    fn functions_capped_at_five() {
        let items = suggest("is", builtin_functions(), operators());
        assert_eq!(items.len(), MAX_FUNCTION_SUGGESTIONS);
        assert_eq!(
            labels(&items),
            vec!["isLinux", "isWindows", "isUnix", "isSolaris", "isAIX"]
        );
    }

    #[test]
    fn operators_follow_functions() {
        let ns = FunctionNamespace::from_custom_records(vec![crate::catalog::CustomFunction {
            id: 1,
            name: "andromedaHosts".to_string(),
            code: None,
            description: None,
            syntax: None,
            parameters: None,
            example: None,
        }]);
        let items = suggest("an", ns.functions(), operators());
        assert!(matches!(items[0], Suggestion::Function(f) if f.name == "andromedaHosts"));
        assert!(matches!(items[1], Suggestion::Operator(op) if op.symbol == "&&"));
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn operators_capped_at_three_and_skip_single_char() {
        let items = suggest("!", builtin_functions(), operators());
        assert_eq!(labels(&items), vec!["!=", "!~"]);

        let items = suggest("=", builtin_functions(), operators());
        assert_eq!(labels(&items), vec!["==", "=~"]);

        let items = suggest(">", builtin_functions(), operators());
        assert_eq!(labels(&items), vec![">="]);
    }

    #[test]
    fn operator_cap_applies() {
        let many: Vec<OperatorDescriptor> = ["<=", "<>", "<<", "<<="]
            .iter()
            .map(|s| OperatorDescriptor {
                symbol: s.to_string(),
                alternatives: vec![],
                description: String::new(),
                example: None,
                category: crate::catalog::OperatorCategory::Comparison,
            })
            .collect();
        let items = suggest("<", &[], &many);
        assert_eq!(labels(&items), vec!["<=", "<>", "<<"]);
    }

    #[test]
    fn alternatives_match() {
        let items = suggest("o", builtin_functions(), operators());
        assert_eq!(labels(&items), vec!["||"]);
        let items = suggest("no", builtin_functions(), operators());
        assert!(items.is_empty(), "`!` is single-char even via `not`");
    }

    #[test]
    fn never_suggests_single_char_operators() {
        for word in ["(", ")", "!", "&", "|", "<", ">", "=", "n", "a"] {
            let items = suggest(word, builtin_functions(), operators());
            assert!(items.iter().all(|s| match s {
                Suggestion::Operator(op) => op.symbol.len() > 1,
                Suggestion::Function(_) => true,
            }));
        }
    }
}
