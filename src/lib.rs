//! Zettel - plain-text notes with TOML front matter
//!
//! Notes live as `<uid>.md` files inside workspace directories under one
//! collection root. Each file carries a fenced TOML header followed by a
//! free-form body. Two subsystems do the real work:
//!
//! * the cross-reference engine, which scans bodies for UID-shaped tokens
//!   and keeps the bidirectional `refers_to`/`referred_from` header fields
//!   in sync across the collection, and
//! * the commit orchestrator, which stages changed files (skipping those
//!   modified within a cooldown window), aggregates the staged changes and
//!   commits them with a deterministic `auto: ...` message.
//!
//! # Quick Start
//!
//! ```
//! use chrono::{FixedOffset, TimeZone};
//! use zettel::{link_notes, InMemoryNoteStore, Note, NoteStore};
//!
//! let when = FixedOffset::east_opt(0)
//!     .unwrap()
//!     .with_ymd_and_hms(2024, 1, 1, 1, 1, 1)
//!     .unwrap();
//!
//! let mut store = InMemoryNoteStore::new();
//! let mut note = Note::new(when);
//! note.body = "See [[20240202T020202Z]].".to_string();
//! let uid = note.header.uid.clone();
//! store.put(note).unwrap();
//!
//! link_notes(&mut store).unwrap();
//! assert_eq!(
//!     store.get(&uid).unwrap().header.refers_to,
//!     vec!["20240202T020202Z"]
//! );
//! ```

pub mod commands;
pub mod commit;
pub mod config;
pub mod error;
pub mod git;
pub mod note;
pub mod refs;
pub mod store;
pub mod workspace;

pub use commit::{compose_commit_message, count_staged, Aggregation, CommitCmd};
pub use config::Config;
pub use error::{Error, Result, ResultExt};
pub use git::{parse_porcelain, FileStatus, Git, ShellGit, Status};
pub use note::{Header, Note};
pub use refs::{find_references, find_uids, link_notes, reverse_references, ReferenceMap};
pub use store::{FilesystemNoteStore, InMemoryNoteStore, NoteStore};
pub use workspace::{get_workspaces, Workspace};
