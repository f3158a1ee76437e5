//! The assembled document: what survived the budget, in priority order.

use std::path::PathBuf;

/// Output sections, declared in priority order. Earlier sections are filled first
/// and a later section is never attempted once an earlier checkpoint has been crossed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SectionCategory {
    Structure,
    VersionControlInfo,
    PackageInfo,
    EntryPoints,
    KeyFiles,
    DomainSpecificFiles,
    ConfigFiles,
    SourceSamples,
}

impl SectionCategory {
    pub const ALL: [SectionCategory; 8] = [
        SectionCategory::Structure,
        SectionCategory::VersionControlInfo,
        SectionCategory::PackageInfo,
        SectionCategory::EntryPoints,
        SectionCategory::KeyFiles,
        SectionCategory::DomainSpecificFiles,
        SectionCategory::ConfigFiles,
        SectionCategory::SourceSamples,
    ];

    /// Fraction of the document ceiling above which this section (and everything
    /// after it) is skipped. These are tuned constants, not derived from a formula.
    pub const fn checkpoint(self) -> f64 {
        match self {
            SectionCategory::Structure
            | SectionCategory::VersionControlInfo
            | SectionCategory::PackageInfo
            | SectionCategory::EntryPoints => 1.0,
            SectionCategory::KeyFiles => 0.80,
            SectionCategory::DomainSpecificFiles => 0.85,
            SectionCategory::ConfigFiles => 0.90,
            SectionCategory::SourceSamples => 0.95,
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            SectionCategory::Structure => "Project Structure",
            SectionCategory::VersionControlInfo => "Git Information",
            SectionCategory::PackageInfo => "Package Information",
            SectionCategory::EntryPoints => "Entry Points",
            SectionCategory::KeyFiles => "Key Files",
            SectionCategory::DomainSpecificFiles => "Infrastructure & Policy Files",
            SectionCategory::ConfigFiles => "Configuration Files",
            SectionCategory::SourceSamples => "Source Code Samples",
        }
    }

    pub const fn slug(self) -> &'static str {
        match self {
            SectionCategory::Structure => "structure",
            SectionCategory::VersionControlInfo => "version_control",
            SectionCategory::PackageInfo => "package_info",
            SectionCategory::EntryPoints => "entry_points",
            SectionCategory::KeyFiles => "key_files",
            SectionCategory::DomainSpecificFiles => "domain_specific_files",
            SectionCategory::ConfigFiles => "config_files",
            SectionCategory::SourceSamples => "source_samples",
        }
    }
}

/// A file found by the locator. Never mutated after discovery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateArtifact {
    pub abs_path: PathBuf,
    /// Repo-relative, '/'-separated.
    pub rel_path: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentKind {
    Full,
    Truncated { omitted_lines: usize },
    /// Fixed-text stand-in for an oversized or unreadable file.
    Placeholder,
}

impl FragmentKind {
    pub fn label(self) -> &'static str {
        match self {
            FragmentKind::Full => "full",
            FragmentKind::Truncated { .. } => "truncated",
            FragmentKind::Placeholder => "placeholder",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedFragment {
    /// `### heading` line; the repo-relative path for file fragments.
    pub heading: Option<String>,
    /// Fence label. `None` means the text is emitted as plain markdown, unfenced.
    pub language: Option<String>,
    pub text: String,
    pub kind: FragmentKind,
}

impl RenderedFragment {
    pub fn file(rel_path: &str, language: &str, text: String, kind: FragmentKind) -> Self {
        Self {
            heading: Some(rel_path.to_string()),
            language: Some(language.to_string()),
            text,
            kind,
        }
    }

    /// Unheaded fenced block, e.g. the directory tree (`language = ""`) or package JSON.
    pub fn block(language: &str, text: String) -> Self {
        Self {
            heading: None,
            language: Some(language.to_string()),
            text,
            kind: FragmentKind::Full,
        }
    }

    pub fn prose(text: String) -> Self {
        Self {
            heading: None,
            language: None,
            text,
            kind: FragmentKind::Full,
        }
    }

    /// Length charged against the budget: characters, not bytes.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub category: SectionCategory,
    pub fragments: Vec<RenderedFragment>,
    /// Set when a candidate was rejected for lack of budget.
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentHeader {
    pub generator: String,
    pub generated_at: String,
    pub repo_name: String,
    pub repo_path: PathBuf,
    pub project_types: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub header: DocumentHeader,
    pub sections: Vec<Section>,
    /// Assembly stopped at a checkpoint; the renderer appends one omission notice.
    pub omitted: bool,
    pub emitted_size: usize,
}

pub const OMITTED_NOTICE: &str = "*(Reached size limit, some files omitted)*";
pub const SECTION_TRUNCATED_NOTICE: &str = "*(Size limit reached, remaining files in this section omitted)*";

/// `1234567` -> `"1,234,567"`.
pub fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
