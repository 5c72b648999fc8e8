//! Just enough git integration
//!
//! [`Git`] is the capability set the commit orchestrator needs from a
//! working tree. [`ShellGit`] is the production implementation, shelling out
//! to the `git` binary; tests swap in a mock. The porcelain v1 status text
//! is parsed into structured [`FileStatus`] records.

use std::path::PathBuf;
use std::process::Command;

use crate::error::{Error, Result};

/// One axis of a porcelain status record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Added,
    Copied,
    Deleted,
    Ignored,
    Modified,
    Renamed,
    TypeChanged,
    Unmodified,
    Untracked,
    UpdatedButUnmerged,
}

impl Status {
    fn from_code(code: char) -> Option<Status> {
        match code {
            'A' => Some(Status::Added),
            'C' => Some(Status::Copied),
            'D' => Some(Status::Deleted),
            '!' => Some(Status::Ignored),
            'M' => Some(Status::Modified),
            'R' => Some(Status::Renamed),
            'T' => Some(Status::TypeChanged),
            ' ' => Some(Status::Unmodified),
            '?' => Some(Status::Untracked),
            'U' => Some(Status::UpdatedButUnmerged),
            _ => None,
        }
    }
}

/// Git status of one path in the working tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileStatus {
    pub path: String,
    pub staged: Status,
    pub unstaged: Status,
}

/// Version control capabilities required by the commit orchestrator.
pub trait Git {
    /// Stage the given paths. A directory stages recursively; `:!` pathspec
    /// tokens exclude paths from the sweep.
    fn add(&self, paths: &[String]) -> Result<()>;

    /// Create a commit with exactly the given message.
    fn commit(&self, message: &str) -> Result<()>;

    /// Statuses of all paths in the working tree.
    fn status(&self) -> Result<Vec<FileStatus>>;

    /// Absolute top-level path of the working tree. Joining it with paths
    /// from [`Git::status`] yields absolute paths.
    fn root_dir(&self) -> Result<PathBuf>;
}

/// Parse `git status --porcelain=1` output.
///
/// Each non-empty line carries the staged and unstaged code characters at
/// offsets 0-1 and the path from offset 3. Rename records (`->` in the path)
/// are not supported and rejected outright rather than mis-parsed.
pub fn parse_porcelain(data: &str) -> Result<Vec<FileStatus>> {
    let mut files = Vec::new();

    for line in data.lines() {
        if line.is_empty() {
            continue;
        }
        let bytes = line.as_bytes();
        if bytes.len() < 4 {
            return Err(Error::parse(format!("malformed status line: '{}'", line)));
        }
        let staged = status_from_code(bytes[0] as char, line)?;
        let unstaged = status_from_code(bytes[1] as char, line)?;
        let path = &line[3..];
        if path.contains("->") {
            return Err(Error::parse(format!(
                "rename is not supported (invalid line: '{}')",
                line
            )));
        }
        files.push(FileStatus {
            path: path.to_string(),
            staged,
            unstaged,
        });
    }

    Ok(files)
}

fn status_from_code(code: char, line: &str) -> Result<Status> {
    Status::from_code(code).ok_or_else(|| {
        Error::parse(format!(
            "unknown status code '{}' (invalid line: '{}')",
            code, line
        ))
    })
}

/// Git backend spawning the `git` binary against a fixed working tree.
pub struct ShellGit {
    worktree: PathBuf,
}

impl ShellGit {
    pub fn new(worktree: impl Into<PathBuf>) -> Self {
        ShellGit {
            worktree: worktree.into(),
        }
    }

    fn git(&self) -> Command {
        let mut cmd = Command::new("git");
        cmd.arg("-C").arg(&self.worktree);
        cmd
    }

    fn run(&self, command: &str, args: &[&str]) -> Result<Vec<u8>> {
        let output = self
            .git()
            .arg(command)
            .args(args)
            .output()
            .map_err(|e| Error::Io {
                message: format!("cannot spawn git {}", command),
                source: e,
            })?;

        if !output.status.success() {
            return Err(Error::Vcs {
                command: format!("git {}", command),
                detail: collect_diagnostics(&output.stdout, &output.stderr),
            });
        }
        Ok(output.stdout)
    }
}

fn collect_diagnostics(stdout: &[u8], stderr: &[u8]) -> String {
    let mut diagnostics = String::from_utf8_lossy(stderr).trim().to_string();
    let out = String::from_utf8_lossy(stdout);
    let out = out.trim();
    if !out.is_empty() {
        if !diagnostics.is_empty() {
            diagnostics.push('\n');
        }
        diagnostics.push_str(out);
    }
    diagnostics
}

impl Git for ShellGit {
    fn add(&self, paths: &[String]) -> Result<()> {
        let args: Vec<&str> = paths.iter().map(String::as_str).collect();
        self.run("add", &args)?;
        Ok(())
    }

    fn commit(&self, message: &str) -> Result<()> {
        self.run("commit", &["-m", message])?;
        Ok(())
    }

    fn status(&self) -> Result<Vec<FileStatus>> {
        let stdout = self.run("status", &["--porcelain=1"])?;
        parse_porcelain(&String::from_utf8_lossy(&stdout))
    }

    fn root_dir(&self) -> Result<PathBuf> {
        let stdout = self.run("rev-parse", &["--show-toplevel"])?;
        Ok(PathBuf::from(
            String::from_utf8_lossy(&stdout).trim().to_string(),
        ))
    }
}
