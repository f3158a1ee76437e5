//! Version-control metadata via the `git` CLI. Every query is best-effort:
//! an individual failing command only blanks its own field.

use std::path::{Path, PathBuf};
use std::process::Command;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitInfo {
    pub branch: Option<String>,
    pub remote: Option<String>,
    pub last_commit: Option<String>,
    pub recent_commits: Option<String>,
    /// Uncommitted entries from `git status --porcelain`.
    pub changed_files: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VcsUnavailable {
    #[error("not a git repository")]
    NotARepository,
    #[error("git is not installed")]
    GitMissing,
}

pub struct GitCli {
    root: PathBuf,
    /// Repo-relative paths left out of the uncommitted-changes count.
    ignored: Vec<String>,
}

impl GitCli {
    pub fn new(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ignored: Vec::new(),
        }
    }

    pub fn ignoring(mut self, path: &Path) -> Self {
        if let Ok(rel) = path.strip_prefix(&self.root) {
            self.ignored.push(rel.to_string_lossy().replace('\\', "/"));
        }
        self
    }

    fn run(&self, args: &[&str]) -> Option<String> {
        let out = Command::new("git").args(args).current_dir(&self.root).output().ok()?;
        if !out.status.success() {
            return None;
        }
        let text = String::from_utf8_lossy(&out.stdout).trim_end().to_string();
        Some(text)
    }

    fn non_empty(&self, args: &[&str]) -> Option<String> {
        self.run(args).filter(|s| !s.trim().is_empty())
    }

    pub fn probe(&self) -> Result<GitInfo, VcsUnavailable> {
        match Command::new("git").arg("rev-parse").current_dir(&self.root).output() {
            Err(_) => return Err(VcsUnavailable::GitMissing),
            Ok(out) if !out.status.success() => return Err(VcsUnavailable::NotARepository),
            Ok(_) => {}
        }

        // Porcelain paths are relative to the top level, not to `root`.
        let prefix = self.run(&["rev-parse", "--show-prefix"]).unwrap_or_default();
        let ignored: Vec<String> = self.ignored.iter().map(|rel| format!("{prefix}{rel}")).collect();
        let changed_files = self
            .run(&["status", "--porcelain"])
            .map(|s| count_changes(&s, &ignored))
            .unwrap_or(0);

        Ok(GitInfo {
            branch: self.non_empty(&["branch", "--show-current"]),
            remote: self.non_empty(&["remote", "get-url", "origin"]),
            last_commit: self.non_empty(&["log", "-1", "--oneline"]),
            recent_commits: self.non_empty(&["log", "--oneline", "-10"]),
            changed_files,
        })
    }
}

/// Porcelain lines are `XY path` (or `XY old -> new` for renames).
fn count_changes(porcelain: &str, ignored: &[String]) -> usize {
    porcelain
        .lines()
        .filter(|l| !l.trim().is_empty())
        .filter(|l| {
            let path = l.get(3..).unwrap_or("").trim().trim_matches('"');
            !ignored.iter().any(|i| i == path)
        })
        .count()
}

/// Markdown body for the git section; `None` when there is nothing to show.
pub fn render_git_info(info: &GitInfo) -> Option<String> {
    let mut lines: Vec<String> = Vec::new();
    if let Some(b) = &info.branch {
        lines.push(format!("**Current Branch:** {b}"));
    }
    if let Some(r) = &info.remote {
        lines.push(format!("**Remote:** {r}"));
    }
    if let Some(c) = &info.last_commit {
        lines.push(format!("**Last Commit:** {c}"));
    }
    if info.changed_files > 0 {
        lines.push(format!("**Uncommitted Changes:** {} files", info.changed_files));
    }
    if let Some(log) = &info.recent_commits {
        lines.push(format!("\n### Recent Commits\n```\n{log}\n```"));
    }

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}
