//! Document state management and text utilities.
//!
//! This module provides:
//! - `LineIndex` for byte offset <-> LSP position conversion
//! - `RegionState` and `OffsetMapper` for expressions embedded in LogicModule exports
//! - `DocumentState` and `DocumentStore` for document lifecycle management

mod region;
mod state;
mod text;

pub use region::{ExpressionRegion, HostEncoding, OffsetMapper, RegionState};
pub use state::{DocumentFormat, DocumentState, DocumentStore, ExpressionAt};
pub use text::LineIndex;
