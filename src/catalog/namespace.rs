//! The merged function namespace used for completion and hover.

use serde::Deserialize;

use super::builtins::builtin_functions;
use super::function::{FunctionDescriptor, Provenance};
use crate::error::SettingsError;

/// A user-defined function as supplied by the platform.
///
/// Only `id` and `name` are required; everything else is treated as absent
/// when missing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CustomFunction {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub syntax: Option<String>,
    #[serde(default)]
    pub parameters: Option<String>,
    #[serde(default)]
    pub example: Option<String>,
}

impl CustomFunction {
    /// Convert into a descriptor tagged with custom provenance.
    ///
    /// Custom functions take no arguments unless the record says otherwise, so a
    /// missing syntax becomes `name()`.
    pub fn into_descriptor(self) -> Result<FunctionDescriptor, SettingsError> {
        let name = self.name.trim().to_string();
        if name.is_empty() {
            return Err(SettingsError::InvalidFunction {
                id: self.id,
                reason: "name is empty".to_string(),
            });
        }

        let syntax = self.syntax.unwrap_or_else(|| format!("{name}()"));
        Ok(FunctionDescriptor {
            syntax: Some(syntax),
            parameters: Some(self.parameters.unwrap_or_else(|| "None".to_string())),
            description: self.description.unwrap_or_default(),
            example: self.example,
            code: self.code,
            provenance: Provenance::Custom { id: self.id },
            name,
        })
    }
}

/// Built-in functions followed by custom functions, in supplied order.
///
/// Rebuilt from scratch whenever the custom corpus changes.
#[derive(Debug, Clone)]
pub struct FunctionNamespace {
    functions: Vec<FunctionDescriptor>,
}

impl Default for FunctionNamespace {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

impl FunctionNamespace {
    /// Merge the built-in catalog with already-converted custom functions.
    pub fn new(custom: Vec<FunctionDescriptor>) -> Self {
        let mut functions = builtin_functions().to_vec();
        functions.extend(custom);
        Self { functions }
    }

    /// Merge raw custom records, skipping (and logging) invalid ones.
    pub fn from_custom_records(records: impl IntoIterator<Item = CustomFunction>) -> Self {
        let custom = records
            .into_iter()
            .filter_map(|record| match record.into_descriptor() {
                Ok(descriptor) => Some(descriptor),
                Err(e) => {
                    tracing::warn!("skipping custom function: {}", e);
                    None
                }
            })
            .collect();
        Self::new(custom)
    }

    /// All functions in ranking order.
    pub fn functions(&self) -> &[FunctionDescriptor] {
        &self.functions
    }

    /// Every function with exactly this name; a custom function may share a
    /// name with a built-in.
    pub fn lookup<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a FunctionDescriptor> {
        self.functions.iter().filter(move |f| f.name == name)
    }

    /// Whether any function carries this name.
    pub fn contains(&self, name: &str) -> bool {
        self.lookup(name).next().is_some()
    }

    /// Number of custom functions merged in.
    pub fn custom_count(&self) -> usize {
        self.functions.iter().filter(|f| f.is_custom()).count()
    }
}
