//! Filesystem backends: a JSON workbook standing in for Sheets and a
//! directory tree standing in for Drive.
//!
//! Workbook layout:
//!
//! ```text
//! { "sheets": { "<sheet_id>": { "<tab>": { "<COLUMN>": ["row 1", "row 2", …] } } } }
//! ```
//!
//! Saves use the `.tmp` + rename pattern, so a crashed write never leaves a
//! half-written workbook or artifact behind.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use recite_core::types::{ContainerId, SheetRange};
use recite_sync::{error::io_err, BackendError, BlobStore, TabularStore};

// ---------------------------------------------------------------------------
// Workbook
// ---------------------------------------------------------------------------

/// Column letters → cells, top to bottom from row 1.
pub type Tab = BTreeMap<String, Vec<String>>;

/// On-disk workbook payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkbookFile {
    #[serde(default)]
    pub sheets: BTreeMap<String, BTreeMap<String, Tab>>,
}

/// A JSON workbook file with Sheets read/write semantics.
#[derive(Debug, Clone)]
pub struct LocalWorkbook {
    path: PathBuf,
}

impl LocalWorkbook {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&self) -> Result<WorkbookFile, BackendError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                return Err(BackendError::NotFound(format!(
                    "workbook {}",
                    self.path.display()
                )))
            }
            Err(err) => return Err(io_err(&self.path, err)),
        };
        serde_json::from_str(&contents).map_err(|e| {
            BackendError::Malformed(format!("workbook {}: {e}", self.path.display()))
        })
    }

    /// Save atomically: write `<path>.tmp`, then rename over `<path>`.
    pub fn save(&self, workbook: &WorkbookFile) -> Result<(), BackendError> {
        let json = serde_json::to_string_pretty(workbook)
            .map_err(|e| BackendError::Malformed(format!("workbook: {e}")))?;
        atomic_write(&self.path, json.as_bytes())
    }
}

fn tab<'a>(workbook: &'a WorkbookFile, range: &SheetRange) -> Result<&'a Tab, BackendError> {
    workbook
        .sheets
        .get(&range.sheet_id)
        .ok_or_else(|| BackendError::NotFound(format!("spreadsheet {}", range.sheet_id)))?
        .get(&range.tab)
        .ok_or_else(|| unknown_tab(range))
}

fn tab_mut<'a>(
    workbook: &'a mut WorkbookFile,
    range: &SheetRange,
) -> Result<&'a mut Tab, BackendError> {
    workbook
        .sheets
        .get_mut(&range.sheet_id)
        .ok_or_else(|| BackendError::NotFound(format!("spreadsheet {}", range.sheet_id)))?
        .get_mut(&range.tab)
        .ok_or_else(|| unknown_tab(range))
}

fn unknown_tab(range: &SheetRange) -> BackendError {
    BackendError::Rejected {
        status: 400,
        message: format!("Unable to parse range: {}", range.a1_notation()),
    }
}

fn start_index(range: &SheetRange) -> Result<usize, BackendError> {
    range
        .start_row()
        .map(|row| row as usize - 1)
        .ok_or_else(|| BackendError::Rejected {
            status: 400,
            message: format!("Unable to parse range: {}", range.a1_notation()),
        })
}

impl TabularStore for LocalWorkbook {
    fn read(&self, range: &SheetRange) -> Result<Vec<String>, BackendError> {
        let workbook = self.load()?;
        let start = start_index(range)?;
        let cells = tab(&workbook, range)?
            .get(range.column())
            .map(|column| column.iter().skip(start).cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        // Like the Sheets API, trailing blank cells are not returned.
        let len = cells
            .iter()
            .rposition(|cell| !cell.is_empty())
            .map_or(0, |last| last + 1);
        Ok(cells.into_iter().take(len).collect())
    }

    fn write(&self, range: &SheetRange, values: &[String]) -> Result<usize, BackendError> {
        let mut workbook = self.load()?;
        let start = start_index(range)?;
        let column = tab_mut(&mut workbook, range)?
            .entry(range.column().to_string())
            .or_default();
        if column.len() < start + values.len() {
            column.resize(start + values.len(), String::new());
        }
        column[start..start + values.len()].clone_from_slice(values);
        self.save(&workbook)?;
        tracing::debug!(
            "wrote {} cell(s) to {} in {}",
            values.len(),
            range.a1_notation(),
            self.path.display()
        );
        Ok(values.len())
    }
}

// ---------------------------------------------------------------------------
// Folder store
// ---------------------------------------------------------------------------

/// Artifacts stored as `<root>/<container>/<object>`.
#[derive(Debug, Clone)]
pub struct LocalFolderStore {
    root: PathBuf,
}

impl LocalFolderStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl BlobStore for LocalFolderStore {
    /// Creating a folder that already exists reuses it.
    fn create_container(&self, name: &str) -> Result<ContainerId, BackendError> {
        let dir = self.root.join(name);
        std::fs::create_dir_all(&dir).map_err(|e| io_err(&dir, e))?;
        Ok(ContainerId(dir.to_string_lossy().into_owned()))
    }

    fn upload(
        &self,
        container: &ContainerId,
        object_name: &str,
        bytes: &[u8],
        _mime_type: &str,
    ) -> Result<(), BackendError> {
        if object_name.is_empty() || object_name.contains(['/', '\\']) || object_name == ".." {
            return Err(BackendError::Rejected {
                status: 400,
                message: format!("invalid object name {object_name:?}"),
            });
        }
        let dir = PathBuf::from(&container.0);
        if !dir.is_dir() {
            return Err(BackendError::NotFound(format!("folder {}", dir.display())));
        }
        atomic_write(&dir.join(object_name), bytes)
    }
}

fn atomic_write(path: &Path, bytes: &[u8]) -> Result<(), BackendError> {
    let Some(file_name) = path.file_name() else {
        return Err(io_err(path, std::io::Error::other("invalid target path")));
    };
    let tmp = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));
    std::fs::write(&tmp, bytes).map_err(|e| io_err(&tmp, e))?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workbook_with(dir: &TempDir, column: &str, cells: &[&str]) -> LocalWorkbook {
        let mut tab = Tab::new();
        tab.insert(
            column.to_string(),
            cells.iter().map(|c| c.to_string()).collect(),
        );
        let mut tabs = BTreeMap::new();
        tabs.insert("Sheet1".to_string(), tab);
        let mut file = WorkbookFile::default();
        file.sheets.insert("book".to_string(), tabs);

        let workbook = LocalWorkbook::new(dir.path().join("workbook.json"));
        workbook.save(&file).expect("save");
        workbook
    }

    #[test]
    fn read_starts_at_start_row_and_drops_trailing_blanks() {
        let dir = TempDir::new().unwrap();
        let workbook = workbook_with(&dir, "A", &["header", "one", "", "three", "", ""]);

        let all = workbook
            .read(&SheetRange::new("book", "Sheet1", "A1"))
            .expect("read");
        assert_eq!(all, vec!["header", "one", "", "three"]);

        let body = workbook
            .read(&SheetRange::new("book", "Sheet1", "A2"))
            .expect("read");
        assert_eq!(body, vec!["one", "", "three"]);
    }

    #[test]
    fn missing_column_reads_as_empty() {
        let dir = TempDir::new().unwrap();
        let workbook = workbook_with(&dir, "A", &["one"]);
        let values = workbook
            .read(&SheetRange::new("book", "Sheet1", "L1"))
            .expect("read");
        assert!(values.is_empty());
    }

    #[test]
    fn unknown_sheet_and_tab_are_errors() {
        let dir = TempDir::new().unwrap();
        let workbook = workbook_with(&dir, "A", &["one"]);

        let err = workbook
            .read(&SheetRange::new("other", "Sheet1", "A1"))
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)), "got {err:?}");

        let err = workbook
            .read(&SheetRange::new("book", "Sheet9", "A1"))
            .unwrap_err();
        assert!(matches!(err, BackendError::Rejected { status: 400, .. }), "got {err:?}");
    }

    #[test]
    fn missing_workbook_file_is_not_found() {
        let dir = TempDir::new().unwrap();
        let workbook = LocalWorkbook::new(dir.path().join("absent.json"));
        let err = workbook
            .read(&SheetRange::new("book", "Sheet1", "A1"))
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }

    #[test]
    fn write_overwrites_positionally_and_leaves_tail() {
        let dir = TempDir::new().unwrap();
        let workbook = workbook_with(&dir, "L", &["old0", "old1", "old2", "old3"]);
        let range = SheetRange::new("book", "Sheet1", "L1");

        let updated = workbook
            .write(&range, &["new0".to_string(), String::new()])
            .expect("write");
        assert_eq!(updated, 2);

        let file = workbook.load().expect("load");
        assert_eq!(
            file.sheets["book"]["Sheet1"]["L"],
            vec!["new0", "", "old2", "old3"]
        );
    }

    #[test]
    fn write_extends_column_from_offset_start() {
        let dir = TempDir::new().unwrap();
        let workbook = workbook_with(&dir, "A", &["text"]);
        let range = SheetRange::new("book", "Sheet1", "L3");

        workbook
            .write(&range, &["aaaaaaaa".to_string(), "bbbbbbbb".to_string()])
            .expect("write");

        let file = workbook.load().expect("load");
        assert_eq!(
            file.sheets["book"]["Sheet1"]["L"],
            vec!["", "", "aaaaaaaa", "bbbbbbbb"]
        );
        assert_eq!(
            workbook.read(&range).expect("read"),
            vec!["aaaaaaaa", "bbbbbbbb"]
        );
    }

    #[test]
    fn tmp_file_cleaned_up_after_save() {
        let dir = TempDir::new().unwrap();
        let workbook = workbook_with(&dir, "A", &["one"]);
        assert!(!dir.path().join("workbook.json.tmp").exists());
        assert!(workbook.path().exists());
    }

    #[test]
    fn folder_store_creates_and_reuses_container() {
        let dir = TempDir::new().unwrap();
        let store = LocalFolderStore::new(dir.path().join("out"));

        let first = store.create_container("20240109-0704").expect("create");
        let again = store.create_container("20240109-0704").expect("reuse");
        assert_eq!(first, again);

        store
            .upload(&first, "32955b2a.mp3", b"ID3", "audio/mp3")
            .expect("upload");
        let written = std::fs::read(dir.path().join("out/20240109-0704/32955b2a.mp3")).unwrap();
        assert_eq!(written, b"ID3");
        assert!(!dir.path().join("out/20240109-0704/32955b2a.mp3.tmp").exists());
    }

    #[test]
    fn upload_rejects_path_like_names_and_missing_folders() {
        let dir = TempDir::new().unwrap();
        let store = LocalFolderStore::new(dir.path());
        let container = store.create_container("run").expect("create");

        let err = store
            .upload(&container, "../escape.mp3", b"x", "audio/mp3")
            .unwrap_err();
        assert!(matches!(err, BackendError::Rejected { .. }));

        let missing = ContainerId::from(dir.path().join("nope").to_string_lossy().into_owned());
        let err = store
            .upload(&missing, "a.mp3", b"x", "audio/mp3")
            .unwrap_err();
        assert!(matches!(err, BackendError::NotFound(_)));
    }
}
