//! Durable note storage
//!
//! [`NoteStore`] is the only seam through which notes reach a backend. The
//! filesystem implementation is the production one; the in-memory one exists
//! for debugging and tests.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

use crate::error::{Error, Result, ResultExt};
use crate::note::{uid_exact_regex, Note};

/// Storage capability for notes, keyed by UID.
pub trait NoteStore {
    /// Load the note with the given UID.
    fn get(&self, uid: &str) -> Result<Note>;

    /// Write or overwrite the note keyed by its header UID. Returns a
    /// location token callers can print, e.g. the file path.
    fn put(&mut self, note: Note) -> Result<String>;

    /// UIDs of all stored notes. Entries whose key does not conform to the
    /// UID grammar are silently excluded so stray files never break
    /// enumeration. No ordering guarantee.
    fn list(&self) -> Result<Vec<String>>;
}

/// Notes saved as `<uid>.md` files in one directory.
pub struct FilesystemNoteStore {
    root: PathBuf,
}

impl FilesystemNoteStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FilesystemNoteStore { root: root.into() }
    }

    /// Absolute path of the file backing a UID.
    pub fn note_path(&self, uid: &str) -> PathBuf {
        self.root.join(format!("{}.md", uid))
    }
}

impl NoteStore for FilesystemNoteStore {
    fn get(&self, uid: &str) -> Result<Note> {
        let path = self.note_path(uid);
        let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => Error::NotFound {
                uid: uid.to_string(),
            },
            _ => Error::Io {
                message: format!("cannot read '{}'", path.display()),
                source: e,
            },
        })?;
        Note::decode(&content).context(format!("cannot decode note '{}'", uid))
    }

    fn put(&mut self, note: Note) -> Result<String> {
        let encoded = note.encode()?;
        let path = self.note_path(&note.header.uid);
        fs::write(&path, encoded).map_err(|e| Error::Write {
            path: path.display().to_string(),
            source: e,
        })?;
        Ok(path.display().to_string())
    }

    fn list(&self) -> Result<Vec<String>> {
        let entries = fs::read_dir(&self.root).map_err(|e| Error::Io {
            message: format!("cannot list notes in '{}'", self.root.display()),
            source: e,
        })?;

        let mut uids = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| Error::Io {
                message: format!("cannot list notes in '{}'", self.root.display()),
                source: e,
            })?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(stem) = name.strip_suffix(".md") else { continue };
            if uid_exact_regex().is_match(stem) {
                uids.push(stem.to_string());
            }
        }
        Ok(uids)
    }
}

/// In-memory note storage for debugging and tests.
#[derive(Default)]
pub struct InMemoryNoteStore {
    notes: HashMap<String, Note>,
}

impl InMemoryNoteStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl NoteStore for InMemoryNoteStore {
    fn get(&self, uid: &str) -> Result<Note> {
        self.notes.get(uid).cloned().ok_or_else(|| Error::NotFound {
            uid: uid.to_string(),
        })
    }

    fn put(&mut self, note: Note) -> Result<String> {
        let location = format!("{}.md", note.header.uid);
        self.notes.insert(note.header.uid.clone(), note);
        Ok(location)
    }

    fn list(&self) -> Result<Vec<String>> {
        Ok(self.notes.keys().cloned().collect())
    }
}
