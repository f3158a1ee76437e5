use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Name of the optional per-repository config file, looked up at the repo root.
pub const CONFIG_FILE_NAME: &str = ".repo-context.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetConfig {
    /// Per-file byte ceiling. Larger files are never read; a placeholder is emitted instead.
    pub max_fragment_size: u64,
    /// Global character ceiling for the whole document.
    pub max_document_size: usize,
    /// Files with more lines than this are head-truncated.
    pub max_lines: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_fragment_size: 10_000,
            max_document_size: 100_000,
            max_lines: 50,
        }
    }
}

/// Extra exclusions on top of the built-in skip lists in `locator`.
///
/// Directory names are compared against path components, not full paths.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub exclude_dir_names: Vec<String>,
    /// Extensions with the leading dot, e.g. ".snap" or ".min.js".
    pub exclude_extensions: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Markdown,
    Xml,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Output path; relative paths are resolved against the repository root.
    pub output_file: PathBuf,
    pub format: OutputFormat,
    pub budget: BudgetConfig,
    pub scan: ScanConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_file: PathBuf::from("CONTEXT.md"),
            format: OutputFormat::default(),
            budget: BudgetConfig::default(),
            scan: ScanConfig::default(),
        }
    }
}

/// Load `.repo-context.json` from the repo root, falling back to defaults when
/// the file is missing or unparseable.
pub fn load_config(repo_root: &Path) -> Config {
    let primary = repo_root.join(CONFIG_FILE_NAME);

    let Ok(text) = std::fs::read_to_string(&primary) else {
        return Config::default();
    };

    serde_json::from_str::<Config>(&text).unwrap_or_else(|e| {
        warn!(path = %primary.display(), error = %e, "ignoring unparseable config");
        Config::default()
    })
}
