//! One complete run: validate the root, assemble, render, write.

use crate::assembler::Assembler;
use crate::config::{Config, OutputFormat};
use crate::document::{Document, DocumentHeader};
use crate::error::ContextError;
use crate::facts::{FsRepo, RepoFacts};
use crate::loader::FsLoader;
use crate::locator::FsLocator;
use crate::render::render_markdown;
use crate::vcs::GitCli;
use crate::xml_builder::build_context_xml;
use anyhow::Result;
use std::path::{Component, Path, PathBuf};
use tracing::info;

pub const GENERATOR_NAME: &str = "repo-context";

pub fn generator_identity() -> String {
    format!("{GENERATOR_NAME} v{}", env!("CARGO_PKG_VERSION"))
}

pub fn now_timestamp() -> String {
    chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string()
}

/// Canonical absolute path of an existing directory.
pub fn resolve_root(path: &Path) -> Result<PathBuf, ContextError> {
    let abs = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let meta = std::fs::metadata(&abs).map_err(|_| ContextError::RootNotFound(abs.clone()))?;
    if !meta.is_dir() {
        return Err(ContextError::NotADirectory(abs));
    }
    Ok(abs.canonicalize().unwrap_or(abs))
}

/// Output location with `.` and `..` folded away, so it compares equal to the
/// paths the locator sees under `root`.
pub fn output_path(root: &Path, cfg: &Config) -> PathBuf {
    normalize_lexically(&root.join(&cfg.output_file))
}

fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

#[derive(Debug, Clone)]
pub struct Generated {
    pub text: String,
    pub document: Document,
}

impl Generated {
    pub fn project_types(&self) -> &[String] {
        &self.document.header.project_types
    }
}

/// Assemble and render the document for `root`. Nothing is written.
pub fn generate(root: &Path, cfg: &Config, generated_at: String) -> Result<Generated> {
    let out_path = output_path(root, cfg);
    let locator = FsLocator::new(root, &cfg.scan)?.excluding_path(&out_path);
    let facts = FsRepo::new(&locator, GitCli::new(root).ignoring(&out_path));

    let kinds = facts.project_kinds();
    let header = DocumentHeader {
        generator: generator_identity(),
        generated_at,
        repo_name: root
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| root.display().to_string()),
        repo_path: root.to_path_buf(),
        project_types: kinds.iter().map(|k| k.tag().to_string()).collect(),
    };

    let document = Assembler::new(&facts, &locator, &FsLoader, &cfg.budget).assemble(header, &kinds);
    info!(
        sections = document.sections.len(),
        emitted = document.emitted_size,
        omitted = document.omitted,
        "document assembled"
    );

    let text = match cfg.format {
        OutputFormat::Markdown => render_markdown(&document),
        OutputFormat::Xml => build_context_xml(&document).map_err(|e| ContextError::Render(e.to_string()))?,
    };

    Ok(Generated { text, document })
}

/// The only write of a run; the document is complete before this is called.
pub fn write_output(path: &Path, text: &str) -> Result<(), ContextError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| ContextError::WriteOutput {
                path: path.to_path_buf(),
                source,
            })?;
        }
    }
    std::fs::write(path, text).map_err(|source| ContextError::WriteOutput {
        path: path.to_path_buf(),
        source,
    })
}
