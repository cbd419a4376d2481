//! LogicModule export support.
//!
//! This module provides extraction of AppliesTo expressions embedded in
//! LogicModule JSON and XML exports, with offset mapping back to the file.

mod extract;

pub use extract::{extract_json_regions, extract_xml_regions};
