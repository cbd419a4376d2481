//! Document state management for the AppliesTo language server.

use std::ops::Range;
use std::sync::Arc;

use dashmap::DashMap;
use tower_lsp::lsp_types::{Position, Url};

use crate::logicmodule::{extract_json_regions, extract_xml_regions};

use super::region::{ExpressionRegion, HostEncoding, OffsetMapper, RegionState};
use super::text::LineIndex;

/// How a document holds its expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    /// The whole document is one AppliesTo expression.
    Expression,
    /// A LogicModule JSON export.
    JsonModule,
    /// A LogicModule XML export.
    XmlModule,
}

impl DocumentFormat {
    /// Pick the format from the URI's file extension.
    pub fn from_uri(uri: &Url) -> Self {
        let path = uri.path().to_ascii_lowercase();
        if path.ends_with(".json") {
            DocumentFormat::JsonModule
        } else if path.ends_with(".xml") {
            DocumentFormat::XmlModule
        } else {
            DocumentFormat::Expression
        }
    }
}

/// State for a single open document.
#[derive(Debug, Clone)]
pub struct DocumentState {
    /// Line index over the full host text.
    pub line_index: LineIndex,
    /// Every expression in the document, in source order.
    pub regions: Vec<RegionState>,
    pub format: DocumentFormat,
    /// Document version from the client.
    pub version: i32,
}

impl DocumentState {
    pub fn new(source: String, version: i32, format: DocumentFormat) -> Self {
        let regions = match format {
            DocumentFormat::Expression => vec![RegionState::new(
                ExpressionRegion {
                    source: source.clone(),
                },
                OffsetMapper::identity(),
                HostEncoding::Raw,
            )],
            DocumentFormat::JsonModule => extract_json_regions(&source)
                .into_iter()
                .map(|r| r.into_region_state())
                .collect(),
            DocumentFormat::XmlModule => extract_xml_regions(&source)
                .into_iter()
                .map(|r| r.into_region_state())
                .collect(),
        };

        Self {
            line_index: LineIndex::new(source),
            regions,
            format,
            version,
        }
    }

    /// Full host text.
    pub fn source(&self) -> &str {
        self.line_index.source()
    }

    /// Find the expression under an LSP position.
    pub fn expression_at(&self, position: Position) -> Option<ExpressionAt<'_>> {
        let host_offset = self.line_index.position_to_offset(position)?;
        let region = self
            .regions
            .iter()
            .find(|r| r.contains_host_offset(host_offset))?;
        let offset = region.host_to_local(host_offset)?;
        Some(ExpressionAt::new(&self.line_index, region, offset))
    }
}

/// One expression and a cursor offset within it.
#[derive(Debug, Clone, Copy)]
pub struct ExpressionAt<'a> {
    line_index: &'a LineIndex,
    pub region: &'a RegionState,
    /// Cursor as a byte offset into the decoded expression.
    pub offset: usize,
}

impl<'a> ExpressionAt<'a> {
    pub fn new(line_index: &'a LineIndex, region: &'a RegionState, offset: usize) -> Self {
        Self {
            line_index,
            region,
            offset,
        }
    }

    /// Decoded expression text.
    pub fn source(&self) -> &'a str {
        &self.region.region.source
    }

    /// Convert an expression-local offset to a host byte offset.
    pub fn to_host(&self, local: usize) -> usize {
        self.region.mapper.to_host(local)
    }

    /// Convert an expression-local span to an LSP range in the host document.
    pub fn range_of(&self, span: &Range<usize>) -> tower_lsp::lsp_types::Range {
        self.line_index
            .span_to_range(&self.region.mapper.span_to_host(span))
    }

    /// Encode expression text for the host document.
    pub fn encode(&self, text: &str) -> String {
        self.region.encoding.encode(text)
    }
}

/// Thread-safe storage for open documents.
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: DashMap<Url, Arc<DocumentState>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
        }
    }

    /// Open or replace a document, detecting its format from the URI.
    pub fn open(&self, uri: Url, source: String, version: i32) -> Arc<DocumentState> {
        let format = DocumentFormat::from_uri(&uri);
        let state = Arc::new(DocumentState::new(source, version, format));
        self.documents.insert(uri, Arc::clone(&state));
        state
    }

    pub fn close(&self, uri: &Url) {
        self.documents.remove(uri);
    }

    pub fn get(&self, uri: &Url) -> Option<Arc<DocumentState>> {
        self.documents.get(uri).map(|r| Arc::clone(&r))
    }

    /// Snapshot of every open document.
    pub fn all(&self) -> Vec<(Url, Arc<DocumentState>)> {
        self.documents
            .iter()
            .map(|entry| (entry.key().clone(), Arc::clone(entry.value())))
            .collect()
    }
}
