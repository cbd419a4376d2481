//! AppliesTo expression editing engine.
//!
//! Three pure operations drive autocompletion, recomputed on every keystroke:
//! - `analyze` classifies the word ending at the cursor
//! - `suggest` ranks function and operator candidates for that word
//! - `apply` / `insert_at_caret` turn an accepted candidate into an edit

mod analyzer;
mod apply;
mod scan;
mod suggest;

pub use analyzer::{analyze, SyntacticContext, WordContext, WordKind, MULTI_CHAR_OPERATORS};
pub use apply::{apply, insert_at_caret, CursorPlacement, EditOperation};
pub use scan::{is_ident_byte, open_quote_before, OpenQuote, QuoteScanner};
pub use suggest::{suggest, Suggestion, MAX_FUNCTION_SUGGESTIONS, MAX_OPERATOR_SUGGESTIONS};
