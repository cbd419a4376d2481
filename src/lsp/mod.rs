//! LSP protocol feature implementations.
//!
//! This module provides implementations for LSP features:
//! - Completion driven by the expression editing engine
//! - Hover documentation for functions and operators
//! - Lexical diagnostics
//! - Toolbar insert commands

mod commands;
mod completion;
mod diagnostics;
mod hover;

pub use commands::{commands, toolbar_edit, InsertCommand, InsertOutcome, ToolbarEdit};
pub use completion::completion_at_position;
pub use diagnostics::{lexical_issues, to_diagnostics, LexicalIssue};
pub use hover::hover_at_position;
