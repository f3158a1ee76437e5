use std::path::PathBuf;

/// Failures that abort a run. Everything below this level (unreadable files,
/// oversized files, missing git) is absorbed into placeholder content instead.
#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("repository path does not exist: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("path is not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    #[error("failed to write {}: {source}", path.display())]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to render document: {0}")]
    Render(String),
}
