//! Repository-level facts that are not individual files: detected project kinds,
//! the directory tree, git metadata and package manifests.

use crate::locator::FsLocator;
use crate::package_info::{extract_package_info, PackageInfo};
use crate::project::{detect_project_kinds, ProjectKind};
use crate::tree::{render_tree, TREE_MAX_DEPTH, TREE_MAX_LINES};
use crate::vcs::{GitCli, GitInfo, VcsUnavailable};

pub trait RepoFacts {
    fn project_kinds(&self) -> Vec<ProjectKind>;
    fn directory_tree(&self) -> String;
    fn git_info(&self) -> Result<GitInfo, VcsUnavailable>;
    fn package_info(&self) -> PackageInfo;
}

/// Facts read from the real filesystem and `git`.
pub struct FsRepo<'a> {
    locator: &'a FsLocator,
    git: GitCli,
}

impl<'a> FsRepo<'a> {
    pub fn new(locator: &'a FsLocator, git: GitCli) -> Self {
        Self { locator, git }
    }
}

impl RepoFacts for FsRepo<'_> {
    fn project_kinds(&self) -> Vec<ProjectKind> {
        detect_project_kinds(self.locator.root())
    }

    fn directory_tree(&self) -> String {
        render_tree(self.locator, TREE_MAX_DEPTH, TREE_MAX_LINES)
    }

    fn git_info(&self) -> Result<GitInfo, VcsUnavailable> {
        self.git.probe()
    }

    fn package_info(&self) -> PackageInfo {
        extract_package_info(self.locator.root())
    }
}
