use std::path::Path;

/// Fence label for a file, by well-known file name first, then by extension.
/// Unknown files are labelled `text`.
pub fn language_for(path: &Path) -> &'static str {
    let name = path.file_name().and_then(|s| s.to_str()).unwrap_or("");

    match name {
        "Dockerfile" => return "dockerfile",
        "Makefile" | "makefile" | "GNUmakefile" => return "makefile",
        "Jenkinsfile" => return "groovy",
        "CMakeLists.txt" => return "cmake",
        _ => {}
    }

    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "py" => "python",
        "js" | "jsx" | "mjs" | "cjs" => "javascript",
        "ts" | "tsx" => "typescript",
        "java" => "java",
        "go" => "go",
        "rs" => "rust",
        "rb" => "ruby",
        "php" => "php",
        "cs" => "csharp",
        "cpp" | "cc" | "cxx" | "hpp" => "cpp",
        "c" | "h" => "c",
        "swift" => "swift",
        "kt" | "kts" => "kotlin",
        "r" => "r",
        "sql" => "sql",
        "sh" | "bash" => "bash",
        "yml" | "yaml" => "yaml",
        "json" => "json",
        "toml" => "toml",
        "xml" => "xml",
        "html" => "html",
        "css" => "css",
        "md" => "markdown",
        "rst" => "rst",
        "tex" => "latex",
        "tf" | "tfvars" | "hcl" => "hcl",
        "rego" => "rego",
        "dockerfile" => "dockerfile",
        "gradle" => "gradle",
        "makefile" => "makefile",
        "ini" | "cfg" | "conf" => "ini",
        _ => "text",
    }
}
