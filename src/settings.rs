//! Settings infrastructure for appliesto-lsp.
//!
//! This module provides support for loading settings.toml files and the
//! custom function exports they reference, plus the configuration payload
//! clients send through `workspace/didChangeConfiguration`.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::catalog::CustomFunction;
use crate::error::SettingsError;

/// Root settings structure loaded from settings.toml.
#[derive(Debug, Default, Deserialize)]
pub struct Settings {
    /// Custom function configuration.
    pub functions: Option<FunctionSettings>,
}

/// Where custom functions come from.
#[derive(Debug, Default, Deserialize)]
pub struct FunctionSettings {
    /// Function export files (JSON), relative to the settings directory.
    #[serde(default)]
    pub files: Vec<PathBuf>,

    /// Functions declared inline.
    #[serde(default)]
    pub custom: Vec<CustomFunction>,
}

/// Shapes accepted for a function export file.
#[derive(Deserialize)]
#[serde(untagged)]
enum FunctionExport {
    Bare(Vec<CustomFunction>),
    Items { items: Vec<CustomFunction> },
    Data { data: ExportData },
}

#[derive(Deserialize)]
struct ExportData {
    items: Vec<CustomFunction>,
}

impl FunctionExport {
    fn into_records(self) -> Vec<CustomFunction> {
        match self {
            FunctionExport::Bare(items) => items,
            FunctionExport::Items { items } => items,
            FunctionExport::Data { data } => data.items,
        }
    }
}

/// Configuration sent by the client, e.g.
/// `{ "appliesTo": { "customFunctions": [...] } }`.
#[derive(Debug, Default, Deserialize)]
pub struct ClientConfiguration {
    #[serde(rename = "appliesTo", default)]
    pub applies_to: Option<ClientFunctionSettings>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ClientFunctionSettings {
    #[serde(rename = "customFunctions", default)]
    pub custom_functions: Option<Vec<CustomFunction>>,
}

impl ClientConfiguration {
    /// Parse a `didChangeConfiguration` payload.
    pub fn from_value(value: serde_json::Value) -> Result<Self, SettingsError> {
        Ok(serde_json::from_value(value)?)
    }

    /// The new custom corpus, if the payload carries one.
    pub fn custom_functions(self) -> Option<Vec<CustomFunction>> {
        self.applies_to?.custom_functions
    }
}

/// Load settings from a settings.toml file.
pub fn try_load_settings(path: &Path) -> Result<Settings, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&content).map_err(|source| SettingsError::Toml {
        path: path.to_path_buf(),
        source,
    })
}

/// Load settings from a settings.toml file.
///
/// Returns default settings if the file doesn't exist or can't be parsed.
pub fn load_settings(path: &Path) -> Settings {
    match try_load_settings(path) {
        Ok(settings) => settings,
        Err(SettingsError::Io { .. }) => Settings::default(),
        Err(e) => {
            warn!("{}", e);
            Settings::default()
        }
    }
}

/// Discover settings.toml by searching up the directory tree, then direct children.
///
/// Search order:
/// 1. Walk up from `start_dir` to filesystem root
/// 2. If not found, check immediate child directories of `start_dir`
///
/// Returns `(settings, settings_dir)` where `settings_dir` is the directory
/// containing the found settings.toml (used for resolving relative paths).
/// If not found, returns `(Settings::default(), start_dir)`.
pub fn discover_settings(start_dir: &Path) -> (Settings, PathBuf) {
    let mut current = Some(start_dir);
    while let Some(dir) = current {
        let candidate = dir.join("settings.toml");
        if candidate.is_file() {
            info!("using settings from {}", candidate.display());
            return (load_settings(&candidate), dir.to_path_buf());
        }
        current = dir.parent();
    }

    if let Ok(entries) = std::fs::read_dir(start_dir) {
        for entry in entries.flatten() {
            if entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false) {
                let candidate = entry.path().join("settings.toml");
                if candidate.is_file() {
                    info!("using settings from {}", candidate.display());
                    return (load_settings(&candidate), entry.path());
                }
            }
        }
    }

    (Settings::default(), start_dir.to_path_buf())
}

/// Read custom function records from a JSON export.
pub fn load_function_file(path: &Path) -> Result<Vec<CustomFunction>, SettingsError> {
    let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let export: FunctionExport =
        serde_json::from_str(&content).map_err(|source| SettingsError::Json {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(export.into_records())
}

/// Collect every custom function the settings point at.
///
/// Export files come first in the order listed, then inline declarations.
/// Unreadable files are logged and skipped.
pub fn custom_functions(settings: &Settings, settings_dir: &Path) -> Vec<CustomFunction> {
    let Some(functions) = settings.functions.as_ref() else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for path in &functions.files {
        let full_path = if path.is_absolute() {
            path.clone()
        } else {
            settings_dir.join(path)
        };

        match load_function_file(&full_path) {
            Ok(loaded) => records.extend(loaded),
            Err(e) => warn!("{}", e),
        }
    }
    records.extend(functions.custom.iter().cloned());
    records
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Create a unique temp directory for test isolation.
    fn make_test_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir()
            .join("appliesto-lsp-test")
            .join(name)
            .join(format!("{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn cleanup_test_dir(dir: &Path) {
        let _ = std::fs::remove_dir_all(dir);
    }

    const INLINE_SETTINGS: &str = r#"
[[functions.custom]]
id = 7
name = "isProdWeb"
code = "isLinux() && hasCategory(\"web\")"
"#;

    #[test]
    fn parse_inline_functions() {
        let settings: Settings = toml::from_str(INLINE_SETTINGS).unwrap();
        let functions = settings.functions.unwrap();
        assert!(functions.files.is_empty());
        assert_eq!(functions.custom.len(), 1);
        assert_eq!(functions.custom[0].name, "isProdWeb");
        assert_eq!(functions.custom[0].syntax, None);
    }

    #[test]
    fn try_load_reports_toml_errors() {
        let dir = make_test_dir("bad-toml");
        let path = dir.join("settings.toml");
        std::fs::write(&path, "[functions\n").unwrap();

        let err = try_load_settings(&path).unwrap_err();
        assert!(matches!(err, SettingsError::Toml { .. }));
        assert!(load_settings(&path).functions.is_none());

        cleanup_test_dir(&dir);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings = load_settings(Path::new("/nonexistent/settings.toml"));
        assert!(settings.functions.is_none());
    }

    #[test]
    fn function_export_shapes() {
        let dir = make_test_dir("export-shapes");
        let bare = dir.join("bare.json");
        let items = dir.join("items.json");
        let data = dir.join("data.json");
        std::fs::write(&bare, r#"[{"id": 1, "name": "a"}]"#).unwrap();
        std::fs::write(&items, r#"{"total": 1, "items": [{"id": 2, "name": "b"}]}"#).unwrap();
        std::fs::write(&data, r#"{"data": {"items": [{"id": 3, "name": "c"}]}}"#).unwrap();

        assert_eq!(load_function_file(&bare).unwrap()[0].name, "a");
        assert_eq!(load_function_file(&items).unwrap()[0].name, "b");
        assert_eq!(load_function_file(&data).unwrap()[0].name, "c");

        cleanup_test_dir(&dir);
    }

    #[test]
    fn function_export_errors() {
        let dir = make_test_dir("export-errors");
        let bad = dir.join("bad.json");
        std::fs::write(&bad, r#"{"items": "nope"}"#).unwrap();

        assert!(matches!(
            load_function_file(&bad).unwrap_err(),
            SettingsError::Json { .. }
        ));
        assert!(matches!(
            load_function_file(&dir.join("missing.json")).unwrap_err(),
            SettingsError::Io { .. }
        ));

        cleanup_test_dir(&dir);
    }

    #[test]
    fn custom_functions_from_files_then_inline() {
        let dir = make_test_dir("custom-merge");
        std::fs::write(dir.join("functions.json"), r#"[{"id": 1, "name": "fromFile"}]"#).unwrap();
        let content = format!("[functions]\nfiles = [\"functions.json\", \"missing.json\"]\n{INLINE_SETTINGS}");
        std::fs::write(dir.join("settings.toml"), content).unwrap();

        let (settings, settings_dir) = discover_settings(&dir);
        let names: Vec<_> = custom_functions(&settings, &settings_dir)
            .into_iter()
            .map(|f| f.name)
            .collect();
        assert_eq!(names, vec!["fromFile", "isProdWeb"]);

        cleanup_test_dir(&dir);
    }

    #[test]
    fn client_configuration_payload() {
        let value = serde_json::json!({
            "appliesTo": { "customFunctions": [{ "id": 4, "name": "isEdge" }] }
        });
        let functions = ClientConfiguration::from_value(value)
            .unwrap()
            .custom_functions()
            .unwrap();
        assert_eq!(functions[0].id, 4);

        let unrelated = ClientConfiguration::from_value(serde_json::json!({ "other": 1 })).unwrap();
        assert!(unrelated.custom_functions().is_none());

        let malformed = ClientConfiguration::from_value(serde_json::json!({
            "appliesTo": { "customFunctions": "x" }
        }));
        assert!(matches!(malformed, Err(SettingsError::Configuration(_))));
    }

    #[test]
    fn discover_settings_in_parent_dir() {
        let parent = make_test_dir("discover-parent");
        let child = parent.join("subdir");
        std::fs::create_dir_all(&child).unwrap();
        std::fs::write(parent.join("settings.toml"), INLINE_SETTINGS).unwrap();

        let (settings, settings_dir) = discover_settings(&child);
        assert_eq!(settings_dir, parent);
        assert!(settings.functions.is_some());

        cleanup_test_dir(&parent);
    }

    #[test]
    fn discover_settings_in_child_dir() {
        let parent = make_test_dir("discover-child");
        let child = parent.join("config");
        std::fs::create_dir_all(&child).unwrap();
        std::fs::write(child.join("settings.toml"), INLINE_SETTINGS).unwrap();

        let (settings, settings_dir) = discover_settings(&parent);
        assert_eq!(settings_dir, child);
        assert_eq!(settings.functions.unwrap().custom[0].id, 7);

        cleanup_test_dir(&parent);
    }

    #[test]
    fn discover_settings_not_found() {
        let dir = make_test_dir("discover-none");

        let (settings, settings_dir) = discover_settings(&dir);
        assert_eq!(settings_dir, dir);
        assert!(settings.functions.is_none());

        cleanup_test_dir(&dir);
    }
}
