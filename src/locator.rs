use crate::config::ScanConfig;
use crate::document::CandidateArtifact;
use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use ignore::overrides::{Override, OverrideBuilder};
use ignore::WalkBuilder;
use std::cell::OnceCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Directory names skipped anywhere in the tree.
pub const DEFAULT_SKIP_DIRS: &[&str] = &[
    ".git",
    ".svn",
    ".hg",
    "node_modules",
    "vendor",
    "venv",
    "env",
    ".env",
    "__pycache__",
    ".pytest_cache",
    "target",
    "build",
    "dist",
    "out",
    ".terraform",
    ".terragrunt-cache",
    "coverage",
    ".next",
    ".nuxt",
    ".idea",
    ".vscode",
    "logs",
    "tmp",
    "temp",
];

/// Binary, media, archive and generated-file suffixes.
pub const DEFAULT_SKIP_EXTENSIONS: &[&str] = &[
    ".pyc", ".pyo", ".pyd", ".so", ".dll", ".dylib", ".class", ".jar", ".war", ".exe", ".bin", ".jpg", ".jpeg",
    ".png", ".gif", ".ico", ".svg", ".mp3", ".mp4", ".avi", ".mov", ".pdf", ".zip", ".tar", ".gz", ".rar", ".7z",
    ".log", ".bak", ".swp", ".tmp", ".cache", ".min.js", ".min.css", ".map",
];

/// Resolves include patterns to files under a fixed root.
pub trait Locate {
    /// Exact names resolve in the order given; glob matches come back in
    /// lexicographic order. Deduplicated by path across all `patterns`.
    fn locate(&self, patterns: &[&str]) -> Vec<CandidateArtifact>;
}

const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    // '*' stays within one directory; only '**' recurses.
    require_literal_separator: true,
    require_literal_leading_dot: true,
};

pub fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

fn build_exclusions(repo_root: &Path, scan: &ScanConfig) -> Result<Override> {
    let mut ob = OverrideBuilder::new(repo_root);

    // '!' globs ignore what they match. Directories need both the entry and its
    // descendants, otherwise nested files still match.
    let extra_dirs = scan.exclude_dir_names.iter().map(String::as_str);
    for d in DEFAULT_SKIP_DIRS.iter().copied().chain(extra_dirs) {
        let d = d.trim().trim_matches('/');
        if d.is_empty() {
            continue;
        }
        ob.add(&format!("!**/{d}"))?;
        ob.add(&format!("!**/{d}/**"))?;
    }

    let extra_exts = scan.exclude_extensions.iter().map(String::as_str);
    for ext in DEFAULT_SKIP_EXTENSIONS.iter().copied().chain(extra_exts) {
        let ext = ext.trim();
        if ext.is_empty() {
            continue;
        }
        let ext = if ext.starts_with('.') { ext.to_string() } else { format!(".{ext}") };
        ob.add(&format!("!**/*{ext}"))?;
    }

    Ok(ob.build()?)
}

pub struct FsLocator {
    root: PathBuf,
    exclusions: Override,
    /// Repo-relative paths that must never be picked up (e.g. our own output file).
    excluded_paths: HashSet<String>,
    /// Every file under the root outside excluded directories, filled on the
    /// first recursive pattern and shared by all later ones.
    walked: OnceCell<Vec<PathBuf>>,
}

impl FsLocator {
    pub fn new(repo_root: &Path, scan: &ScanConfig) -> Result<Self> {
        let exclusions = build_exclusions(repo_root, scan)
            .with_context(|| format!("Invalid exclusion pattern in scan config for {}", repo_root.display()))?;
        Ok(Self {
            root: repo_root.to_path_buf(),
            exclusions,
            excluded_paths: HashSet::new(),
            walked: OnceCell::new(),
        })
    }

    /// Exclude one specific path. Paths outside the root are ignored.
    pub fn excluding_path(mut self, path: &Path) -> Self {
        if let Ok(rel) = path.strip_prefix(&self.root) {
            self.excluded_paths.insert(normalize_rel(rel));
        }
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `rel` is relative to the root.
    pub fn is_excluded(&self, rel: &Path, is_dir: bool) -> bool {
        if self.exclusions.matched(rel, is_dir).is_ignore() {
            return true;
        }
        !is_dir && self.excluded_paths.contains(&normalize_rel(rel))
    }

    fn artifact(&self, abs_path: PathBuf) -> Option<CandidateArtifact> {
        let meta = std::fs::metadata(&abs_path).ok()?;
        if !meta.is_file() {
            return None;
        }
        let rel = abs_path.strip_prefix(&self.root).ok()?;
        if self.is_excluded(rel, false) {
            return None;
        }
        let rel_path = normalize_rel(rel);
        Some(CandidateArtifact {
            abs_path,
            rel_path,
            bytes: meta.len(),
        })
    }

    fn walked_files(&self) -> &[PathBuf] {
        self.walked.get_or_init(|| {
            // Excluded directories are pruned by the overrides, never descended into.
            let walker = WalkBuilder::new(&self.root)
                .standard_filters(false)
                .overrides(self.exclusions.clone())
                .sort_by_file_name(|a, b| a.cmp(b))
                .build();

            walker
                // Unreadable subtrees surface as per-entry errors; skip them.
                .flatten()
                .filter(|dent| dent.file_type().is_some_and(|ft| ft.is_file() || ft.is_symlink()))
                .map(|dent| dent.into_path())
                .collect()
        })
    }

    fn expand(&self, pattern: &str) -> Vec<PathBuf> {
        let pattern = pattern.trim_start_matches("./");
        if !is_glob(pattern) {
            return vec![self.root.join(pattern)];
        }
        if pattern.contains("**") {
            return self.expand_recursive(pattern);
        }

        let root = Pattern::escape(&self.root.to_string_lossy());
        let full = format!("{}/{}", root.trim_end_matches('/'), pattern);
        match glob::glob_with(&full, GLOB_OPTIONS) {
            Ok(paths) => paths.flatten().collect(),
            Err(e) => {
                tracing::debug!(pattern, error = %e, "invalid glob pattern");
                Vec::new()
            }
        }
    }

    fn expand_recursive(&self, pattern: &str) -> Vec<PathBuf> {
        let compiled = match Pattern::new(pattern) {
            Ok(p) => p,
            Err(e) => {
                tracing::debug!(pattern, error = %e, "invalid glob pattern");
                return Vec::new();
            }
        };

        let mut hits: Vec<(String, PathBuf)> = self
            .walked_files()
            .iter()
            .filter_map(|abs| {
                let rel = abs.strip_prefix(&self.root).ok()?;
                compiled
                    .matches_path_with(rel, GLOB_OPTIONS)
                    .then(|| (normalize_rel(rel), abs.clone()))
            })
            .collect();
        hits.sort_by(|a, b| a.0.cmp(&b.0));
        hits.into_iter().map(|(_, abs)| abs).collect()
    }
}

impl Locate for FsLocator {
    fn locate(&self, patterns: &[&str]) -> Vec<CandidateArtifact> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut out = Vec::new();

        for pattern in patterns {
            for abs in self.expand(pattern) {
                if seen.contains(&abs) {
                    continue;
                }
                if let Some(artifact) = self.artifact(abs.clone()) {
                    seen.insert(abs);
                    out.push(artifact);
                }
            }
        }

        out
    }
}

fn normalize_rel(rel: &Path) -> String {
    rel.to_string_lossy().replace('\\', "/")
}
