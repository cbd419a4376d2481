//! AppliesTo Language Server implementation.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;
use tower_lsp::jsonrpc::{Error, Result};
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer, LspService};
use tracing::{debug, info, warn};

pub mod catalog;
mod document;
pub mod editor;
pub mod error;
mod logicmodule;
mod lsp;
pub(crate) mod settings;

pub use document::{DocumentFormat, DocumentState, LineIndex};
pub use lsp::{
    completion_at_position, hover_at_position, lexical_issues, to_diagnostics, toolbar_edit,
    InsertCommand, InsertOutcome, LexicalIssue, ToolbarEdit,
};
pub use settings::{
    custom_functions, discover_settings, load_function_file, load_settings, try_load_settings,
    ClientConfiguration, Settings,
};

use catalog::FunctionNamespace;
use document::DocumentStore;

/// Completion triggers beyond identifier characters.
const TRIGGER_CHARACTERS: [&str; 6] = ["=", "!", "<", ">", "&", "|"];

pub struct Backend {
    client: Client,
    documents: DocumentStore,
    namespace: RwLock<Arc<FunctionNamespace>>,
}

impl Backend {
    pub(crate) fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            namespace: RwLock::new(Arc::new(FunctionNamespace::default())),
        }
    }

    async fn namespace(&self) -> Arc<FunctionNamespace> {
        Arc::clone(&*self.namespace.read().await)
    }

    /// Store the document and publish diagnostics.
    async fn on_document_change(&self, uri: Url, text: String, version: i32) {
        let state = self.documents.open(uri.clone(), text, version);
        debug!(%uri, format = ?state.format, regions = state.regions.len(), "document updated");
        self.publish_diagnostics_for(&uri, &state).await;
    }

    /// Publish diagnostics for a document.
    async fn publish_diagnostics_for(&self, uri: &Url, state: &DocumentState) {
        let namespace = self.namespace().await;
        let diagnostics = lsp::to_diagnostics(state, &namespace);
        self.client
            .publish_diagnostics(uri.clone(), diagnostics, Some(state.version))
            .await;
    }

    /// Swap in a new namespace and re-check every open document.
    async fn replace_namespace(&self, namespace: FunctionNamespace) {
        info!(custom = namespace.custom_count(), "custom functions updated");
        *self.namespace.write().await = Arc::new(namespace);
        for (uri, state) in self.documents.all() {
            self.publish_diagnostics_for(&uri, &state).await;
        }
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        let workspace_root = params
            .workspace_folders
            .as_ref()
            .and_then(|folders| folders.first())
            .and_then(|f| f.uri.to_file_path().ok())
            .or_else(|| {
                #[allow(deprecated)]
                params.root_uri.as_ref()?.to_file_path().ok()
            });

        if let Some(root) = workspace_root {
            let (settings, settings_dir) = settings::discover_settings(&root);
            let records = settings::custom_functions(&settings, &settings_dir);
            let namespace = FunctionNamespace::from_custom_records(records);
            info!(
                root = %root.display(),
                custom = namespace.custom_count(),
                "workspace initialized"
            );
            *self.namespace.write().await = Arc::new(namespace);
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                hover_provider: Some(HoverProviderCapability::Simple(true)),
                completion_provider: Some(CompletionOptions {
                    trigger_characters: Some(
                        TRIGGER_CHARACTERS.iter().map(|c| c.to_string()).collect(),
                    ),
                    resolve_provider: Some(false),
                    ..Default::default()
                }),
                execute_command_provider: Some(ExecuteCommandOptions {
                    commands: lsp::commands(),
                    work_done_progress_options: WorkDoneProgressOptions::default(),
                }),
                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "AppliesTo language server initialized")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        self.on_document_change(
            params.text_document.uri,
            params.text_document.text,
            params.text_document.version,
        )
        .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        // We use FULL sync, so there's exactly one change with the full text
        if let Some(change) = params.content_changes.into_iter().next() {
            self.on_document_change(
                params.text_document.uri,
                change.text,
                params.text_document.version,
            )
            .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        self.documents.close(&params.text_document.uri);
        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        match ClientConfiguration::from_value(params.settings) {
            Ok(config) => {
                if let Some(records) = config.custom_functions() {
                    self.replace_namespace(FunctionNamespace::from_custom_records(records))
                        .await;
                }
            }
            Err(e) => warn!("ignoring configuration: {}", e),
        }
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let Some(doc) = self.documents.get(uri) else {
            return Ok(None);
        };
        let namespace = self.namespace().await;
        Ok(lsp::hover_at_position(&doc, &namespace, position))
    }

    async fn completion(&self, params: CompletionParams) -> Result<Option<CompletionResponse>> {
        let uri = &params.text_document_position.text_document.uri;
        let position = params.text_document_position.position;

        let Some(doc) = self.documents.get(uri) else {
            debug!(%uri, "completion for unknown document");
            return Ok(None);
        };
        let namespace = self.namespace().await;
        Ok(lsp::completion_at_position(&doc, &namespace, position))
    }

    async fn execute_command(&self, params: ExecuteCommandParams) -> Result<Option<Value>> {
        let command = InsertCommand::parse(&params.command, params.arguments)
            .map_err(|e| Error::invalid_params(e.to_string()))?;
        debug!(?command, "execute command");

        let uri = command.uri().clone();
        let Some(doc) = self.documents.get(&uri) else {
            return Ok(None);
        };
        let namespace = self.namespace().await;
        let Some(toolbar) = lsp::toolbar_edit(&doc, &namespace, &command)
            .map_err(|e| Error::invalid_params(e.to_string()))?
        else {
            return Ok(None);
        };

        let edit = WorkspaceEdit {
            changes: Some(HashMap::from([(uri, vec![toolbar.edit])])),
            ..Default::default()
        };
        match self.client.apply_edit(edit).await {
            Ok(response) if response.applied => serde_json::to_value(&toolbar.outcome)
                .map(Some)
                .map_err(|_| Error::internal_error()),
            Ok(response) => {
                warn!(reason = ?response.failure_reason, "client rejected edit");
                Ok(None)
            }
            Err(e) => {
                warn!("applyEdit failed: {}", e);
                Ok(None)
            }
        }
    }
}

pub fn create_service() -> (LspService<Backend>, tower_lsp::ClientSocket) {
    LspService::new(Backend::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_can_be_created() {
        let (_service, _socket) = create_service();
    }
}
