use crate::locator::FsLocator;
use std::path::Path;

pub const TREE_MAX_DEPTH: usize = 4;
pub const TREE_MAX_LINES: usize = 150;
pub const TREE_TRUNCATED_MARKER: &str = "... (truncated)";

/// Hidden entries that are still worth showing.
const VISIBLE_DOTFILES: &[&str] = &[".github", ".gitlab-ci.yml", ".env.example"];

/// ASCII-art tree of the repository, directories before files, each group by name.
/// Entries deeper than `max_depth` are not listed; output beyond `max_lines`
/// lines is cut and marked.
pub fn render_tree(locator: &FsLocator, max_depth: usize, max_lines: usize) -> String {
    let root = locator.root();
    let root_name = root
        .file_name()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| root.to_string_lossy().to_string());

    let mut lines = vec![format!("{root_name}/")];
    walk(locator, root, Path::new(""), "", 0, max_depth, &mut lines);

    if lines.len() > max_lines {
        lines.truncate(max_lines);
        lines.push(TREE_TRUNCATED_MARKER.to_string());
    }
    lines.join("\n")
}

fn walk(
    locator: &FsLocator,
    dir: &Path,
    rel_dir: &Path,
    prefix: &str,
    depth: usize,
    max_depth: usize,
    lines: &mut Vec<String>,
) {
    let read_dir = match std::fs::read_dir(dir) {
        Ok(rd) => rd,
        Err(_) => return,
    };

    let mut items: Vec<(bool, String)> = read_dir
        .flatten()
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with('.') && !VISIBLE_DOTFILES.contains(&name.as_str()) {
                return None;
            }
            let is_dir = entry.file_type().map(|ft| ft.is_dir()).unwrap_or(false);
            if locator.is_excluded(&rel_dir.join(&name), is_dir) {
                return None;
            }
            Some((is_dir, name))
        })
        .collect();
    // Directories first, then files; by name within each group.
    items.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.cmp(&b.1)));

    let count = items.len();
    for (i, (is_dir, name)) in items.into_iter().enumerate() {
        let is_last = i + 1 == count;
        let branch = if is_last { "└── " } else { "├── " };
        lines.push(format!("{prefix}{branch}{name}"));

        if is_dir && depth < max_depth {
            let extension = if is_last { "    " } else { "│   " };
            walk(
                locator,
                &dir.join(&name),
                &rel_dir.join(&name),
                &format!("{prefix}{extension}"),
                depth + 1,
                max_depth,
                lines,
            );
        }
    }
}
