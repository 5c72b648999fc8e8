//! Command runners behind the CLI surface
//!
//! Each command is a small struct carrying the parameters it needs plus a
//! `run()`. The binary builds them from parsed arguments and loaded config;
//! tests can build them directly.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;

use crate::config::{expand_home, Config};
use crate::error::{Error, Result, ResultExt};
use crate::note::{uid_exact_regex, Note};
use crate::refs::link_notes;
use crate::store::{FilesystemNoteStore, NoteStore};
use crate::workspace::{
    check_workspace, create_workspace, get_workspaces, WorkspaceState, NOTES_DIR_NAME,
};

/// Create the configuration file and required directories.
pub struct CmdInit<'a> {
    pub config_path: &'a str,
    pub workspace: Option<&'a str>,
}

impl CmdInit<'_> {
    pub fn run(&self) -> Result<()> {
        let config_path = PathBuf::from(expand_home(self.config_path));

        if !config_path.exists() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent).map_err(|e| Error::Write {
                    path: parent.display().to_string(),
                    source: e,
                })?;
            }
            Config::default().save(&config_path)?;
            println!("Created configuration file in {}.", config_path.display());
            println!(
                "Review the default values and modify them as you wish. \
                 When done, run init once again to finalize."
            );
            return Ok(());
        }

        let config = Config::load(&config_path)?;
        let root = config.expanded_root();
        fs::create_dir_all(&root).map_err(|e| Error::Write {
            path: root.display().to_string(),
            source: e,
        })?;

        let workspace = match self.workspace {
            Some(name) if !name.is_empty() => name,
            _ => &config.default_workspace,
        };

        match check_workspace(&root, workspace)? {
            WorkspaceState::Ok => Ok(()),
            WorkspaceState::Malformed => Err(Error::config(format!(
                "workspace '{}' exists, but does not conform to the expected layout",
                root.join(workspace).display()
            ))),
            WorkspaceState::Missing => {
                println!("Creating workspace {}.", root.join(workspace).display());
                create_workspace(&root, workspace)
            }
        }
    }
}

/// Create a new empty note and print where it went.
pub struct CmdNew<'a> {
    pub root: &'a Path,
    pub workspace: &'a str,
    pub to_stdout: bool,
}

impl CmdNew<'_> {
    pub fn run(&self) -> Result<()> {
        let note = Note::new(Local::now().fixed_offset());

        if self.to_stdout {
            print!("{}", note.encode()?);
            return Ok(());
        }

        if check_workspace(self.root, self.workspace)? != WorkspaceState::Ok {
            return Err(Error::config(format!(
                "cannot create note in invalid workspace '{}'; run init first",
                self.workspace
            )));
        }

        let notes_dir = self.root.join(self.workspace).join(NOTES_DIR_NAME);
        let mut store = FilesystemNoteStore::new(notes_dir);
        let location = store.put(note).context("cannot save note")?;
        println!("{}", location);
        Ok(())
    }
}

/// Seek references between notes in every workspace and update headers.
pub struct CmdLink<'a> {
    pub root: &'a Path,
}

impl CmdLink<'_> {
    pub fn run(&self) -> Result<()> {
        let found = get_workspaces(self.root)
            .context("cannot link because no workspaces were found")?;

        for workspace in found {
            let mut store = FilesystemNoteStore::new(workspace.notes_path());
            link_notes(&mut store)
                .context(format!("linking failed in workspace '{}'", workspace.name()))?;
        }
        Ok(())
    }
}

/// Read and print config keys, notes by UID, or workspaces.
pub struct CmdGet<'a> {
    pub config_path: &'a str,
    pub query: &'a [String],
    pub provide_path: bool,
}

impl CmdGet<'_> {
    pub fn run(&self) -> Result<()> {
        let config = Config::load(Path::new(&expand_home(self.config_path)))?;

        let Some(resource) = self.query.first() else {
            return Err(Error::config(
                "query must name a resource: config, note or workspace",
            ));
        };

        match resource.as_str() {
            "config" => self.print_config_key(&config),
            "note" => self.print_note(&config),
            "workspace" => self.print_workspaces(&config),
            other => Err(Error::config(format!(
                "resource '{}' is not supported",
                other
            ))),
        }
    }

    fn print_config_key(&self, config: &Config) -> Result<()> {
        let Some(key) = self.query.get(1) else {
            return Err(Error::config("seeking configuration requires a key"));
        };
        match key.as_str() {
            "root_dir" => println!("{}", config.root_dir),
            "default_workspace" => println!("{}", config.default_workspace),
            "index_dir" => println!("{}", config.index_dir.as_deref().unwrap_or_default()),
            other => return Err(Error::config(format!("no key with name '{}'", other))),
        }
        Ok(())
    }

    fn print_note(&self, config: &Config) -> Result<()> {
        let Some(uid) = self.query.get(1) else {
            return Err(Error::config("missing note UID"));
        };
        if !uid_exact_regex().is_match(uid) {
            return Err(Error::config(format!("'{}' is not a valid note UID", uid)));
        }

        let root = config.expanded_root();
        for workspace in get_workspaces(&root)? {
            let store = FilesystemNoteStore::new(workspace.notes_path());
            let Ok(note) = store.get(uid) else { continue };
            if self.provide_path {
                println!("{}", store.note_path(&note.header.uid).display());
            } else {
                print!("{}", note.encode()?);
            }
            return Ok(());
        }

        Err(Error::NotFound {
            uid: uid.to_string(),
        })
    }

    fn print_workspaces(&self, config: &Config) -> Result<()> {
        let root = config.expanded_root();
        for workspace in get_workspaces(&root)? {
            if self.provide_path {
                println!("{}", workspace.workspace_path().display());
            } else {
                println!("{}", workspace.name());
            }
        }
        Ok(())
    }
}

/// Try to decode every note and report the ones that fail.
pub struct CmdHealth<'a> {
    pub root: &'a Path,
}

impl CmdHealth<'_> {
    pub fn run(&self) -> Result<()> {
        let mut unhealthy = 0usize;

        for workspace in get_workspaces(self.root)? {
            let store = FilesystemNoteStore::new(workspace.notes_path());
            for uid in store.list()? {
                if let Err(error) = store.get(&uid) {
                    println!("{}/{}: {}", workspace.name(), uid, error.root_cause());
                    unhealthy += 1;
                }
            }
        }

        if unhealthy > 0 {
            return Err(Error::parse(format!("found {} unhealthy notes", unhealthy)));
        }
        Ok(())
    }
}
