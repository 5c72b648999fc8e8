//! Change staging and commit orchestration
//!
//! For every tracked directory: query status, drop paths still inside the
//! modification-time cooldown from the stage set, stage, re-query, aggregate
//! the staged changes and commit with a synthesized message. The two status
//! queries are not redundant: the cooldown filter needs pre-staging paths and
//! their real mtimes, while the message must reflect what actually got staged
//! after the exclusions.

use std::path::Path;

use chrono::{DateTime, Duration, Utc};

use crate::error::{Error, Result, ResultExt};
use crate::git::{FileStatus, Git, Status};

/// Produces a [`Git`] handle bound to one working tree.
pub type GitFactory = Box<dyn Fn(&str) -> Box<dyn Git>>;
/// Current-time source.
pub type NowFn = Box<dyn Fn() -> DateTime<Utc>>;
/// Modification-time lookup for an absolute path.
pub type ModtimeFn = Box<dyn Fn(&Path) -> Result<DateTime<Utc>>>;

/// Current UTC time; production [`NowFn`].
pub fn system_now() -> DateTime<Utc> {
    Utc::now()
}

/// Last modification time of a path; production [`ModtimeFn`].
pub fn modification_time(path: &Path) -> Result<DateTime<Utc>> {
    let metadata = std::fs::metadata(path).map_err(|e| Error::Io {
        message: format!("cannot stat '{}'", path.display()),
        source: e,
    })?;
    let modified = metadata.modified().map_err(|e| Error::Io {
        message: format!("cannot read mod time of '{}'", path.display()),
        source: e,
    })?;
    Ok(DateTime::<Utc>::from(modified))
}

/// Stages and commits changes in a list of tracked directories, one full
/// stage/status/commit sequence per directory, in list order.
pub struct CommitCmd {
    pub dirs: Vec<String>,
    pub git_factory: GitFactory,
    pub now: NowFn,
    pub modtime: ModtimeFn,
    /// Minimum time since last modification before a file may be staged.
    /// Zero disables the filter.
    pub cooldown: Duration,
}

impl CommitCmd {
    /// Run the commit sequence for every tracked directory. Aborts at the
    /// first failure; directories already committed are not rolled back.
    pub fn run(&self) -> Result<()> {
        for dir in &self.dirs {
            self.run_one(dir)
                .context(format!("commit failed in '{}'", dir))?;
        }
        Ok(())
    }

    fn run_one(&self, workdir: &str) -> Result<()> {
        let git = (self.git_factory)(workdir);

        if self.cooldown > Duration::zero() {
            let hot_paths = self.paths_still_in_cooldown(git.as_ref())?;
            let mut stage_set = vec![workdir.to_string()];
            stage_set.extend(wrap_with_ignore(&hot_paths));
            git.add(&stage_set)?;
        } else {
            git.add(&[workdir.to_string()])?;
        }

        let statuses = git.status().context("cannot obtain git status")?;
        let aggregated = count_staged(&statuses);
        if !aggregated.any() {
            // Nothing staged. Success, not an error.
            return Ok(());
        }

        git.commit(&compose_commit_message(&aggregated))?;
        Ok(())
    }

    /// Repo-relative paths whose files were modified within the cooldown
    /// window, measured against the injected clock. The threshold is
    /// inclusive: a file modified exactly `cooldown` ago is still hot.
    fn paths_still_in_cooldown(&self, git: &dyn Git) -> Result<Vec<String>> {
        let statuses = git.status().context("cannot obtain git status")?;
        let root = git.root_dir().context("cannot obtain git root dir")?;

        let now = (self.now)();
        let mut hot_paths = Vec::new();
        for status in statuses {
            let absolute = root.join(&status.path);
            let modified = (self.modtime)(&absolute)
                .context(format!("cannot get mod time of '{}'", absolute.display()))?;
            if now - modified <= self.cooldown {
                hot_paths.push(status.path);
            }
        }
        Ok(hot_paths)
    }
}

/// Turn repo-relative paths into `:!` pathspec exclusion tokens.
fn wrap_with_ignore(paths: &[String]) -> Vec<String> {
    paths.iter().map(|path| format!(":!{}", path)).collect()
}

/// Counts of staged changes, one bucket per commit-message category.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Aggregation {
    pub added: usize,
    pub copied: usize,
    pub deleted: usize,
    pub modified: usize,
    pub renamed: usize,
}

impl Aggregation {
    fn any(&self) -> bool {
        self.added != 0
            || self.copied != 0
            || self.deleted != 0
            || self.modified != 0
            || self.renamed != 0
    }
}

/// Count staged-axis occurrences of the committable categories.
pub fn count_staged(statuses: &[FileStatus]) -> Aggregation {
    let mut aggregated = Aggregation::default();
    for status in statuses {
        match status.staged {
            Status::Added => aggregated.added += 1,
            Status::Copied => aggregated.copied += 1,
            Status::Deleted => aggregated.deleted += 1,
            Status::Modified => aggregated.modified += 1,
            Status::Renamed => aggregated.renamed += 1,
            _ => {}
        }
    }
    aggregated
}

/// Build the deterministic commit message: `auto: ` plus one clause per
/// nonzero category, in fixed order.
pub fn compose_commit_message(changes: &Aggregation) -> String {
    let categories = [
        (changes.added, "added"),
        (changes.copied, "copied"),
        (changes.deleted, "deleted"),
        (changes.modified, "modified"),
        (changes.renamed, "renamed"),
    ];
    let clauses: Vec<String> = categories
        .iter()
        .filter(|(count, _)| *count > 0)
        .map(|(count, adjective)| format!("{} {}", count, adjective))
        .collect();
    format!("auto: {}", clauses.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::{HashMap, VecDeque};
    use std::path::PathBuf;
    use std::rc::Rc;

    use chrono::TimeZone;

    #[derive(Default)]
    struct MockGit {
        status_returns: RefCell<VecDeque<Vec<FileStatus>>>,
        add_calls: RefCell<Vec<Vec<String>>>,
        commit_messages: RefCell<Vec<String>>,
        root: PathBuf,
    }

    impl MockGit {
        fn with_root(root: &str) -> Rc<MockGit> {
            Rc::new(MockGit {
                root: PathBuf::from(root),
                ..MockGit::default()
            })
        }

        fn enqueue_status(&self, statuses: Vec<FileStatus>) {
            self.status_returns.borrow_mut().push_back(statuses);
        }
    }

    impl Git for Rc<MockGit> {
        fn add(&self, paths: &[String]) -> Result<()> {
            self.add_calls.borrow_mut().push(paths.to_vec());
            Ok(())
        }

        fn commit(&self, message: &str) -> Result<()> {
            self.commit_messages.borrow_mut().push(message.to_string());
            Ok(())
        }

        fn status(&self) -> Result<Vec<FileStatus>> {
            Ok(self
                .status_returns
                .borrow_mut()
                .pop_front()
                .unwrap_or_default())
        }

        fn root_dir(&self) -> Result<PathBuf> {
            Ok(self.root.clone())
        }
    }

    fn factory_for(mock: &Rc<MockGit>) -> GitFactory {
        let mock = Rc::clone(mock);
        Box::new(move |_workdir| Box::new(Rc::clone(&mock)))
    }

    fn frozen_now(now: DateTime<Utc>) -> NowFn {
        Box::new(move || now)
    }

    fn modtime_table(times: HashMap<PathBuf, DateTime<Utc>>) -> ModtimeFn {
        Box::new(move |path| {
            times.get(path).copied().ok_or_else(|| {
                Error::parse(format!("no modtime for '{}'", path.display()))
            })
        })
    }

    fn file(path: &str, staged: Status, unstaged: Status) -> FileStatus {
        FileStatus {
            path: path.to_string(),
            staged,
            unstaged,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_no_changes_means_no_commit() {
        let mock = MockGit::with_root("/root");
        mock.enqueue_status(vec![]);

        let cmd = CommitCmd {
            dirs: vec!["/tmp".to_string()],
            git_factory: factory_for(&mock),
            now: frozen_now(t0()),
            modtime: modtime_table(HashMap::new()),
            cooldown: Duration::zero(),
        };

        cmd.run().unwrap();
        assert!(mock.commit_messages.borrow().is_empty());
    }

    #[test]
    fn test_commit_message_aggregates_staged_changes() {
        let mock = MockGit::with_root("/root");
        mock.enqueue_status(vec![
            file("a1.txt", Status::Added, Status::Unmodified),
            file("a2.txt", Status::Added, Status::Unmodified),
            file("m1.txt", Status::Modified, Status::Unmodified),
            file("d1.txt", Status::Deleted, Status::Unmodified),
        ]);

        let cmd = CommitCmd {
            dirs: vec!["/tmp".to_string()],
            git_factory: factory_for(&mock),
            now: frozen_now(t0()),
            modtime: modtime_table(HashMap::new()),
            cooldown: Duration::zero(),
        };

        cmd.run().unwrap();
        assert_eq!(
            mock.commit_messages.borrow().as_slice(),
            ["auto: 2 added, 1 deleted, 1 modified"]
        );
    }

    #[test]
    fn test_cooldown_excludes_recently_touched_paths() {
        let mock = MockGit::with_root("/virtual");

        // First status call runs before add, so both paths are unstaged.
        mock.enqueue_status(vec![
            file("zettel/old.txt", Status::Unmodified, Status::Modified),
            file("zettel/new.txt", Status::Unmodified, Status::Modified),
        ]);
        // Second status call runs after add; only old.txt got staged.
        mock.enqueue_status(vec![
            file("zettel/old.txt", Status::Modified, Status::Unmodified),
            file("zettel/new.txt", Status::Unmodified, Status::Modified),
        ]);

        let mut modtimes = HashMap::new();
        modtimes.insert(PathBuf::from("/virtual/zettel/old.txt"), t0());
        modtimes.insert(
            PathBuf::from("/virtual/zettel/new.txt"),
            t0() + Duration::seconds(60),
        );

        let cmd = CommitCmd {
            dirs: vec!["/virtual/zettel".to_string()],
            git_factory: factory_for(&mock),
            now: frozen_now(t0() + Duration::seconds(61)),
            modtime: modtime_table(modtimes),
            cooldown: Duration::seconds(60),
        };

        cmd.run().unwrap();
        assert_eq!(
            mock.add_calls.borrow().as_slice(),
            [vec![
                "/virtual/zettel".to_string(),
                ":!zettel/new.txt".to_string()
            ]]
        );
        assert_eq!(mock.commit_messages.borrow().as_slice(), ["auto: 1 modified"]);
    }

    #[test]
    fn test_cooldown_threshold_is_inclusive() {
        // A file modified exactly `cooldown` ago is still hot...
        let mock = MockGit::with_root("/virtual");
        mock.enqueue_status(vec![file("a.txt", Status::Unmodified, Status::Modified)]);
        mock.enqueue_status(vec![]);

        let mut modtimes = HashMap::new();
        modtimes.insert(PathBuf::from("/virtual/a.txt"), t0());

        let cmd = CommitCmd {
            dirs: vec!["/virtual".to_string()],
            git_factory: factory_for(&mock),
            now: frozen_now(t0() + Duration::seconds(60)),
            modtime: modtime_table(modtimes),
            cooldown: Duration::seconds(60),
        };
        cmd.run().unwrap();
        assert_eq!(
            mock.add_calls.borrow().as_slice(),
            [vec!["/virtual".to_string(), ":!a.txt".to_string()]]
        );

        // ...and one second later it must stage.
        let mock = MockGit::with_root("/virtual");
        mock.enqueue_status(vec![file("a.txt", Status::Unmodified, Status::Modified)]);
        mock.enqueue_status(vec![]);

        let mut modtimes = HashMap::new();
        modtimes.insert(PathBuf::from("/virtual/a.txt"), t0());

        let cmd = CommitCmd {
            dirs: vec!["/virtual".to_string()],
            git_factory: factory_for(&mock),
            now: frozen_now(t0() + Duration::seconds(61)),
            modtime: modtime_table(modtimes),
            cooldown: Duration::seconds(60),
        };
        cmd.run().unwrap();
        assert_eq!(
            mock.add_calls.borrow().as_slice(),
            [vec!["/virtual".to_string()]]
        );
    }

    #[test]
    fn test_zero_cooldown_skips_the_prefilter_status_query() {
        let mock = MockGit::with_root("/root");
        mock.enqueue_status(vec![file("a.txt", Status::Added, Status::Unmodified)]);

        let cmd = CommitCmd {
            dirs: vec!["/tmp".to_string()],
            git_factory: factory_for(&mock),
            now: frozen_now(t0()),
            modtime: modtime_table(HashMap::new()),
            cooldown: Duration::zero(),
        };

        cmd.run().unwrap();
        // The single queued status response fed the post-staging query.
        assert_eq!(mock.add_calls.borrow().as_slice(), [vec!["/tmp".to_string()]]);
        assert_eq!(mock.commit_messages.borrow().as_slice(), ["auto: 1 added"]);
    }

    #[test]
    fn test_compose_commit_message_fixed_order() {
        let message = compose_commit_message(&Aggregation {
            added: 1,
            copied: 2,
            deleted: 3,
            modified: 4,
            renamed: 5,
        });
        assert_eq!(message, "auto: 1 added, 2 copied, 3 deleted, 4 modified, 5 renamed");
    }

    #[test]
    fn test_count_staged_ignores_unstaged_axis() {
        let counts = count_staged(&[
            file("a.txt", Status::Unmodified, Status::Modified),
            file("b.txt", Status::Untracked, Status::Untracked),
        ]);
        assert!(!counts.any());
    }
}
