//! Built-in AppliesTo functions and operators with documentation.
//!
//! The catalog is plain data in `builtins.toml`, embedded at compile time and
//! parsed once on first use.

use std::sync::LazyLock;

use serde::Deserialize;

use super::function::FunctionDescriptor;
use super::operator::OperatorDescriptor;

/// Raw catalog file layout.
#[derive(Debug, Deserialize)]
struct CatalogFile {
    functions: Vec<FunctionDescriptor>,
    operators: Vec<OperatorDescriptor>,
}

static CATALOG: LazyLock<CatalogFile> = LazyLock::new(|| {
    toml::from_str(include_str!("builtins.toml")).expect("embedded builtins.toml is valid")
});

/// Built-in functions in catalog order.
pub fn builtin_functions() -> &'static [FunctionDescriptor] {
    &CATALOG.functions
}

/// All operators in catalog order.
pub fn operators() -> &'static [OperatorDescriptor] {
    &CATALOG.operators
}

/// Look up a built-in function by exact name.
pub fn get_builtin(name: &str) -> Option<&'static FunctionDescriptor> {
    CATALOG.functions.iter().find(|f| f.name == name)
}

/// Look up an operator by symbol or alternative spelling.
pub fn get_operator(text: &str) -> Option<&'static OperatorDescriptor> {
    CATALOG.operators.iter().find(|op| op.is_spelled(text))
}
