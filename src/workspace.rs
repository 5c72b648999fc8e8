//! Workspace discovery and scaffolding
//!
//! A workspace is a named directory under the collection root holding a
//! `notes/` subdirectory for note files and an `index/` subdirectory.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Subdirectory of every workspace where the notes are stored.
pub const NOTES_DIR_NAME: &str = "notes";
/// Subdirectory of every workspace where index files are stored.
pub const INDEX_DIR_NAME: &str = "index";

/// A named note directory under the collection root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workspace {
    root: PathBuf,
    name: String,
}

impl Workspace {
    /// Absolute path of the notes directory, ready for a note store.
    pub fn notes_path(&self) -> PathBuf {
        self.root.join(&self.name).join(NOTES_DIR_NAME)
    }

    /// Absolute path of the workspace itself.
    pub fn workspace_path(&self) -> PathBuf {
        self.root.join(&self.name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Validation outcome for a would-be workspace directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkspaceState {
    /// Exists and conforms to the expected layout
    Ok,
    /// Does not exist
    Missing,
    /// Exists but lacks the expected subdirectories
    Malformed,
}

/// Check whether a workspace with the given name exists under `root` and
/// contains the expected directories.
pub fn check_workspace(root: &Path, name: &str) -> Result<WorkspaceState> {
    let workspace_path = root.join(name);
    if !exists(&workspace_path)? {
        return Ok(WorkspaceState::Missing);
    }
    if !exists(&workspace_path.join(NOTES_DIR_NAME))? {
        return Ok(WorkspaceState::Malformed);
    }
    Ok(WorkspaceState::Ok)
}

/// All conforming workspaces under `root`, sorted by name.
pub fn get_workspaces(root: &Path) -> Result<Vec<Workspace>> {
    let entries = fs::read_dir(root).map_err(|e| Error::Io {
        message: format!("cannot list workspaces in '{}'", root.display()),
        source: e,
    })?;

    let mut found = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| Error::Io {
            message: format!("cannot list workspaces in '{}'", root.display()),
            source: e,
        })?;
        if !entry.path().is_dir() {
            continue;
        }
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        if check_workspace(root, name)? == WorkspaceState::Ok {
            found.push(Workspace {
                root: root.to_path_buf(),
                name: name.to_string(),
            });
        }
    }
    found.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(found)
}

/// Create the directory tree for a workspace with the given name. Creating
/// an already conforming workspace is a no-op.
pub fn create_workspace(root: &Path, name: &str) -> Result<()> {
    if check_workspace(root, name)? == WorkspaceState::Ok {
        return Ok(());
    }
    for subdir in [NOTES_DIR_NAME, INDEX_DIR_NAME] {
        let dir = root.join(name).join(subdir);
        fs::create_dir_all(&dir).map_err(|e| Error::Write {
            path: dir.display().to_string(),
            source: e,
        })?;
    }
    Ok(())
}

fn exists(path: &Path) -> Result<bool> {
    match fs::metadata(path) {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Io {
            message: format!("cannot read '{}'", path.display()),
            source: e,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_create_then_check() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(
            check_workspace(tmp.path(), "main").unwrap(),
            WorkspaceState::Missing
        );

        create_workspace(tmp.path(), "main").unwrap();
        assert_eq!(
            check_workspace(tmp.path(), "main").unwrap(),
            WorkspaceState::Ok
        );
        assert!(tmp.path().join("main").join(NOTES_DIR_NAME).is_dir());
        assert!(tmp.path().join("main").join(INDEX_DIR_NAME).is_dir());
    }

    #[test]
    fn test_create_existing_workspace_is_noop() {
        let tmp = TempDir::new().unwrap();
        create_workspace(tmp.path(), "main").unwrap();
        create_workspace(tmp.path(), "main").unwrap();
        assert_eq!(
            check_workspace(tmp.path(), "main").unwrap(),
            WorkspaceState::Ok
        );
    }

    #[test]
    fn test_directory_without_notes_is_malformed() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("broken")).unwrap();
        assert_eq!(
            check_workspace(tmp.path(), "broken").unwrap(),
            WorkspaceState::Malformed
        );
    }

    #[test]
    fn test_get_workspaces_skips_nonconforming_entries() {
        let tmp = TempDir::new().unwrap();
        create_workspace(tmp.path(), "work").unwrap();
        create_workspace(tmp.path(), "home").unwrap();
        fs::create_dir(tmp.path().join("broken")).unwrap();
        fs::write(tmp.path().join("stray.md"), "not a workspace").unwrap();

        let found = get_workspaces(tmp.path()).unwrap();
        let names: Vec<&str> = found.iter().map(Workspace::name).collect();
        assert_eq!(names, vec!["home", "work"]);
    }

    #[test]
    fn test_notes_path_layout() {
        let tmp = TempDir::new().unwrap();
        create_workspace(tmp.path(), "main").unwrap();
        let found = get_workspaces(tmp.path()).unwrap();
        assert_eq!(
            found[0].notes_path(),
            tmp.path().join("main").join("notes")
        );
    }
}
