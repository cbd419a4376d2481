//! Toolbar insert commands.
//!
//! Clients expose operator and function palettes; clicking an entry runs
//! `workspace/executeCommand` with the document, the caret, and the entry. The
//! server computes the insertion, and the caller pushes it back with
//! `workspace/applyEdit`.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tower_lsp::lsp_types::{Position, Range, TextEdit, Url};

use crate::catalog::{get_operator, FunctionNamespace};
use crate::document::{DocumentState, LineIndex};
use crate::editor::{insert_at_caret, CursorPlacement, Suggestion};
use crate::error::CommandError;

pub const INSERT_OPERATOR: &str = "appliesTo.insertOperator";
pub const INSERT_FUNCTION: &str = "appliesTo.insertFunction";

/// Every command the server advertises.
pub fn commands() -> Vec<String> {
    vec![INSERT_OPERATOR.to_string(), INSERT_FUNCTION.to_string()]
}

/// A decoded toolbar command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertCommand {
    Operator {
        uri: Url,
        position: Position,
        symbol: String,
    },
    Function {
        uri: Url,
        position: Position,
        name: String,
    },
}

fn decode<T: DeserializeOwned>(command: &'static str, value: Value) -> Result<T, CommandError> {
    serde_json::from_value(value).map_err(|source| CommandError::InvalidArgument { command, source })
}

impl InsertCommand {
    /// Decode `[uri, position, label]` arguments.
    pub fn parse(command: &str, arguments: Vec<Value>) -> Result<Self, CommandError> {
        let command = match command {
            INSERT_OPERATOR => INSERT_OPERATOR,
            INSERT_FUNCTION => INSERT_FUNCTION,
            other => return Err(CommandError::UnknownCommand(other.to_string())),
        };

        let [uri, position, label]: [Value; 3] = arguments
            .try_into()
            .map_err(|_| CommandError::MissingArguments {
                command,
                expected: 3,
            })?;
        let uri: Url = decode(command, uri)?;
        let position: Position = decode(command, position)?;
        let label: String = decode(command, label)?;

        Ok(if command == INSERT_OPERATOR {
            InsertCommand::Operator {
                uri,
                position,
                symbol: label,
            }
        } else {
            InsertCommand::Function {
                uri,
                position,
                name: label,
            }
        })
    }

    pub fn uri(&self) -> &Url {
        match self {
            InsertCommand::Operator { uri, .. } | InsertCommand::Function { uri, .. } => uri,
        }
    }

    fn position(&self) -> Position {
        match self {
            InsertCommand::Operator { position, .. } | InsertCommand::Function { position, .. } => {
                *position
            }
        }
    }
}

/// Where the caret lands once the client has applied the edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InsertOutcome {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<Range>,
}

/// The edit to push to the client and the resulting caret.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolbarEdit {
    pub edit: TextEdit,
    pub outcome: InsertOutcome,
}

/// Compute a toolbar insertion.
///
/// Returns `Ok(None)` when the position is not inside an expression.
pub fn toolbar_edit(
    doc: &DocumentState,
    namespace: &FunctionNamespace,
    command: &InsertCommand,
) -> Result<Option<ToolbarEdit>, CommandError> {
    let chosen = match command {
        InsertCommand::Operator { symbol, .. } => Suggestion::Operator(
            get_operator(symbol).ok_or_else(|| CommandError::UnknownOperator(symbol.clone()))?,
        ),
        InsertCommand::Function { name, .. } => Suggestion::Function(
            namespace
                .lookup(name)
                .next()
                .ok_or_else(|| CommandError::UnknownFunction(name.clone()))?,
        ),
    };

    let Some(at) = doc.expression_at(command.position()) else {
        return Ok(None);
    };
    let edit = insert_at_caret(chosen, at.source(), at.offset);

    let new_text = at.encode(&edit.insert_text);
    let host_start = at.to_host(edit.replace.start);
    let host_end = at.to_host(edit.replace.end);

    // Positions after the edit come from the edited host text
    let source = doc.source();
    let edited = LineIndex::new(format!(
        "{}{}{}",
        &source[..host_start],
        new_text,
        &source[host_end..]
    ));
    let host_at = |local: usize| host_start + at.encode(&edit.insert_text[..local]).len();

    let outcome = match edit.local_placement() {
        CursorPlacement::Cursor(local) => InsertOutcome {
            cursor: Some(edited.offset_to_position(host_at(local))),
            selection: None,
        },
        CursorPlacement::Selection(local) => InsertOutcome {
            cursor: None,
            selection: Some(edited.span_to_range(&(host_at(local.start)..host_at(local.end)))),
        },
    };

    Ok(Some(ToolbarEdit {
        edit: TextEdit {
            range: at.range_of(&edit.replace),
            new_text,
        },
        outcome,
    }))
}
