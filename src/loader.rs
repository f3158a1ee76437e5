//! Bounded text rendering of a single file. Never fails: every error becomes
//! placeholder text.

use crate::document::{format_count, CandidateArtifact, FragmentKind, RenderedFragment};
use crate::language::language_for;
use std::path::Path;
use tracing::debug;

pub trait Load {
    fn load(&self, artifact: &CandidateArtifact, max_fragment_size: u64, max_lines: usize) -> RenderedFragment;
}

/// Reads straight from disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsLoader;

impl Load for FsLoader {
    fn load(&self, artifact: &CandidateArtifact, max_fragment_size: u64, max_lines: usize) -> RenderedFragment {
        let (text, kind) = load_text(&artifact.abs_path, max_fragment_size, max_lines);
        RenderedFragment::file(&artifact.rel_path, language_for(&artifact.abs_path), text, kind)
    }
}

pub fn too_large_placeholder(bytes: u64) -> String {
    format!("(File too large: {} bytes)", format_count(bytes))
}

pub fn truncation_trailer(omitted_lines: usize) -> String {
    format!("\n\n... (truncated, {omitted_lines} more lines)")
}

/// Size check first (no read), then lossy decode, then line truncation.
pub fn load_text(path: &Path, max_fragment_size: u64, max_lines: usize) -> (String, FragmentKind) {
    let bytes = match std::fs::metadata(path) {
        Ok(m) => m.len(),
        Err(e) => return read_error(path, &e),
    };
    if bytes > max_fragment_size {
        debug!(path = %path.display(), bytes, "file exceeds fragment ceiling");
        return (too_large_placeholder(bytes), FragmentKind::Placeholder);
    }

    let raw = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => return read_error(path, &e),
    };
    let content = String::from_utf8(raw).unwrap_or_else(|err| String::from_utf8_lossy(err.as_bytes()).into_owned());

    truncate_lines(content, max_lines)
}

pub fn truncate_lines(content: String, max_lines: usize) -> (String, FragmentKind) {
    let total = content.lines().count();
    if total <= max_lines {
        return (content, FragmentKind::Full);
    }

    let omitted_lines = total - max_lines;
    let mut out = content.lines().take(max_lines).collect::<Vec<_>>().join("\n");
    out.push_str(&truncation_trailer(omitted_lines));
    (out, FragmentKind::Truncated { omitted_lines })
}

fn read_error(path: &Path, err: &std::io::Error) -> (String, FragmentKind) {
    debug!(path = %path.display(), error = %err, "unreadable file");
    (format!("(Error reading file: {err})"), FragmentKind::Placeholder)
}
