//! YAML run configuration.
//!
//! # Lookup order
//!
//! ```text
//! --config <path>            (explicit; must exist)
//! ./recite.yaml
//! ~/.recite/config.yaml
//! ```
//!
//! # API pattern
//!
//! As with the rest of the workspace, functions that touch the home directory
//! come in two forms:
//! - `fn_at(cwd: &Path, home: &Path, …)`: explicit roots, used in tests
//! - `fn(…)`: derives roots from the process, delegates to `_at`

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::types::{SheetRange, SynthesisSettings};

// ---------------------------------------------------------------------------
// 1. Config shape
// ---------------------------------------------------------------------------

/// Root of `recite.yaml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub source: SourceSection,
    #[serde(default)]
    pub history: HistorySection,
    #[serde(flatten)]
    pub synthesis: SynthesisSettings,
    /// Side effects require an explicit opt-out.
    #[serde(default = "default_true")]
    pub dry_run: bool,
    #[serde(default)]
    pub force_reprocess: bool,
    #[serde(default)]
    pub backend: BackendConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            source: SourceSection::default(),
            history: HistorySection::default(),
            synthesis: SynthesisSettings::default(),
            dry_run: true,
            force_reprocess: false,
            backend: BackendConfig::default(),
        }
    }
}

/// Where the text rows are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSection {
    #[serde(default)]
    pub sheet_id: String,
    #[serde(default = "default_tab")]
    pub tab: String,
    #[serde(default = "default_source_cell")]
    pub start_cell: String,
}

impl Default for SourceSection {
    fn default() -> Self {
        Self {
            sheet_id: String::new(),
            tab: default_tab(),
            start_cell: default_source_cell(),
        }
    }
}

/// Where fingerprints are read from and written back to.
///
/// `sheet_id` falls back to the source sheet when omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sheet_id: Option<String>,
    #[serde(default = "default_tab")]
    pub tab: String,
    #[serde(default = "default_history_cell")]
    pub start_cell: String,
}

impl Default for HistorySection {
    fn default() -> Self {
        Self {
            sheet_id: None,
            tab: default_tab(),
            start_cell: default_history_cell(),
        }
    }
}

/// Backend selection for the two storage collaborators plus Google settings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    #[serde(default)]
    pub tabular: TabularBackend,
    #[serde(default)]
    pub storage: StorageBackend,
    #[serde(default)]
    pub google: GoogleSettings,
}

/// Tabular store implementation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TabularBackend {
    /// Google Sheets v4.
    #[default]
    Google,
    /// JSON workbook file on disk.
    Local { path: PathBuf },
}

/// Blob storage implementation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StorageBackend {
    /// Google Drive v3; run folders are created under `parent_folder_id`
    /// when set, otherwise in the drive root.
    GoogleDrive {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        parent_folder_id: Option<String>,
    },
    /// One sub-directory of `dir` per run.
    Local { dir: PathBuf },
}

impl Default for StorageBackend {
    fn default() -> Self {
        StorageBackend::GoogleDrive {
            parent_folder_id: None,
        }
    }
}

/// Settings shared by all Google REST clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSettings {
    /// Environment variable holding an OAuth2 bearer token. Read at call
    /// time, so dry runs never need it.
    #[serde(default = "default_token_env")]
    pub access_token_env: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            access_token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_tab() -> String {
    "Sheet1".to_string()
}

fn default_source_cell() -> String {
    "A1".to_string()
}

fn default_history_cell() -> String {
    "L1".to_string()
}

fn default_token_env() -> String {
    "GOOGLE_OAUTH_ACCESS_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

// ---------------------------------------------------------------------------
// 2. Derived ranges + validation
// ---------------------------------------------------------------------------

impl RunConfig {
    /// Column holding the text rows.
    pub fn source_range(&self) -> SheetRange {
        SheetRange::new(
            &self.source.sheet_id,
            &self.source.tab,
            &self.source.start_cell,
        )
    }

    /// Column holding the fingerprint history.
    pub fn history_range(&self) -> SheetRange {
        let sheet_id = self
            .history
            .sheet_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .unwrap_or(self.source.sheet_id.as_str());
        SheetRange::new(sheet_id, &self.history.tab, &self.history.start_cell)
    }

    /// Reject configs that could only fail later against a backend.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.sheet_id.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "source.sheet_id",
                reason: "must not be empty".to_string(),
            });
        }
        check_cell("source.start_cell", &self.source_range())?;
        check_cell("history.start_cell", &self.history_range())?;
        if self.source.tab.is_empty() {
            return Err(ConfigError::Invalid {
                field: "source.tab",
                reason: "must not be empty".to_string(),
            });
        }
        if self.history.tab.is_empty() {
            return Err(ConfigError::Invalid {
                field: "history.tab",
                reason: "must not be empty".to_string(),
            });
        }
        if self.backend.google.timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                field: "backend.google.timeout_secs",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Resolve relative local-backend paths against `base` (the directory the
    /// config file lives in).
    pub fn resolve_paths(&mut self, base: &Path) {
        if let TabularBackend::Local { path } = &mut self.backend.tabular {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        if let StorageBackend::Local { dir } = &mut self.backend.storage {
            if dir.is_relative() {
                *dir = base.join(&*dir);
            }
        }
    }
}

fn check_cell(field: &'static str, range: &SheetRange) -> Result<(), ConfigError> {
    if range.start_row().is_none() {
        return Err(ConfigError::Invalid {
            field,
            reason: format!(
                "`{}` is not an A1 cell (expected column letters then a row, e.g. A1)",
                range.start_cell
            ),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// 3. Load
// ---------------------------------------------------------------------------

/// Candidate default locations, in lookup order.
pub fn default_paths_at(cwd: &Path, home: &Path) -> Vec<PathBuf> {
    vec![
        cwd.join("recite.yaml"),
        home.join(".recite").join("config.yaml"),
    ]
}

/// First existing default config path.
pub fn find_default_at(cwd: &Path, home: &Path) -> Result<PathBuf, ConfigError> {
    let candidates = default_paths_at(cwd, home);
    if let Some(found) = candidates.iter().find(|p| p.exists()) {
        return Ok(found.clone());
    }
    Err(ConfigError::NoDefault {
        searched: candidates
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", "),
    })
}

/// Load a config file.
///
/// Returns `ConfigError::NotFound` if absent, `ConfigError::Parse` (with path
/// + line context) if malformed YAML. Relative local-backend paths are
/// resolved against the file's directory.
pub fn load_at(path: &Path) -> Result<RunConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut config: RunConfig =
        serde_yaml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    if let Some(base) = path.parent() {
        config.resolve_paths(base);
    }
    Ok(config)
}

/// Load `explicit` if given, otherwise the first default location that exists.
pub fn load(explicit: Option<&Path>) -> Result<RunConfig, ConfigError> {
    match explicit {
        Some(path) => load_at(path),
        None => {
            let cwd = std::env::current_dir().map_err(|source| ConfigError::Io {
                path: PathBuf::from("."),
                source,
            })?;
            let home = dirs::home_dir().unwrap_or_else(|| cwd.clone());
            load_at(&find_default_at(&cwd, &home)?)
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AudioEncoding, SsmlGender};

    #[test]
    fn empty_document_takes_defaults() {
        let config: RunConfig = serde_yaml::from_str("{}").expect("parse");
        assert!(config.dry_run, "dry run must default to enabled");
        assert!(!config.force_reprocess);
        assert_eq!(config.source.tab, "Sheet1");
        assert_eq!(config.source.start_cell, "A1");
        assert_eq!(config.history.start_cell, "L1");
        assert_eq!(config.synthesis.voice.language_code, "ja-JP");
        assert_eq!(config.synthesis.voice.ssml_gender, SsmlGender::Male);
        assert_eq!(config.synthesis.encoding, AudioEncoding::Mp3);
        assert_eq!(config.backend.tabular, TabularBackend::Google);
    }

    #[test]
    fn history_sheet_falls_back_to_source_sheet() {
        let mut config = RunConfig::default();
        config.source.sheet_id = "src".to_string();
        assert_eq!(config.history_range().sheet_id, "src");
        assert_eq!(config.history_range().a1_notation(), "Sheet1!L1:L");

        config.history.sheet_id = Some("sums".to_string());
        assert_eq!(config.history_range().sheet_id, "sums");
    }

    #[test]
    fn validate_rejects_missing_sheet_id() {
        let err = RunConfig::default().validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                field: "source.sheet_id",
                ..
            }
        ));
    }

    #[test]
    fn validate_rejects_bad_start_cell() {
        let mut config = RunConfig::default();
        config.source.sheet_id = "src".to_string();
        config.history.start_cell = "L".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("history.start_cell"), "got: {err}");
    }

    #[test]
    fn tagged_backends_parse() {
        let yaml = r#"
source: { sheet_id: abc }
encoding: OGG_OPUS
voice: { language_code: en-US, name: en-US-Wavenet-D, ssml_gender: FEMALE }
backend:
  tabular: { kind: local, path: book.json }
  storage: { kind: google_drive, parent_folder_id: root123 }
"#;
        let config: RunConfig = serde_yaml::from_str(yaml).expect("parse");
        assert_eq!(config.synthesis.encoding, AudioEncoding::OggOpus);
        assert_eq!(config.synthesis.voice.name, "en-US-Wavenet-D");
        assert_eq!(
            config.backend.tabular,
            TabularBackend::Local {
                path: PathBuf::from("book.json")
            }
        );
        assert_eq!(
            config.backend.storage,
            StorageBackend::GoogleDrive {
                parent_folder_id: Some("root123".to_string())
            }
        );
    }

    #[test]
    fn resolve_paths_only_touches_relative_paths() {
        let mut config = RunConfig::default();
        config.backend.tabular = TabularBackend::Local {
            path: PathBuf::from("book.json"),
        };
        config.backend.storage = StorageBackend::Local {
            dir: PathBuf::from("/abs/out"),
        };
        config.resolve_paths(Path::new("/etc/recite"));
        assert_eq!(
            config.backend.tabular,
            TabularBackend::Local {
                path: PathBuf::from("/etc/recite/book.json")
            }
        );
        assert_eq!(
            config.backend.storage,
            StorageBackend::Local {
                dir: PathBuf::from("/abs/out")
            }
        );
    }
}
