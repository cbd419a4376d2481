//! Function descriptors for AppliesTo expressions.
//!
//! A `FunctionDescriptor` documents one callable usable in an expression, either
//! shipped with the server or defined by the user on the monitoring platform.
//! Evaluation happens remotely; these records only drive completion and hover.

use serde::Deserialize;

/// Where a function definition came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Provenance {
    /// Shipped in the static catalog.
    #[default]
    Builtin,
    /// User-defined on the platform, identified by its numeric id.
    Custom { id: u64 },
}

/// A built-in or user-defined function reference.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FunctionDescriptor {
    /// Function name (e.g., "hasCategory")
    pub name: String,
    /// Full call text with placeholders (e.g., `hasCategory("<string>")`)
    #[serde(default)]
    pub syntax: Option<String>,
    /// Free-form parameter description, or "None"
    #[serde(default)]
    pub parameters: Option<String>,
    /// Description of what the function matches
    #[serde(default)]
    pub description: String,
    /// Optional example usage
    #[serde(default)]
    pub example: Option<String>,
    /// Underlying expression of a custom function
    #[serde(default)]
    pub code: Option<String>,
    #[serde(skip)]
    pub provenance: Provenance,
}

impl FunctionDescriptor {
    /// Text inserted when the function is accepted: the syntax if present, else the name.
    pub fn insert_text(&self) -> &str {
        match self.syntax.as_deref() {
            Some(syntax) if !syntax.is_empty() => syntax,
            _ => &self.name,
        }
    }

    /// Whether the function declares any parameters.
    pub fn takes_parameters(&self) -> bool {
        match self.parameters.as_deref().map(str::trim) {
            None | Some("") => false,
            Some(p) => {
                !(p.eq_ignore_ascii_case("none") || p.eq_ignore_ascii_case("no parameters"))
            }
        }
    }

    /// Whether this descriptor is user-defined.
    pub fn is_custom(&self) -> bool {
        matches!(self.provenance, Provenance::Custom { .. })
    }
}
