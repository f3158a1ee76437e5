//! Budget-gated assembly of the context document.
//!
//! Sections are visited in `SectionCategory::ALL` order. Before a section (and
//! before each of its files) the section's checkpoint is checked; once it has
//! been crossed nothing further is attempted and the document is marked as
//! omitted. Within a section, the first candidate that does not fit closes the
//! section and assembly moves on to the next one.

use crate::budget::BudgetTracker;
use crate::config::BudgetConfig;
use crate::document::{CandidateArtifact, Document, DocumentHeader, RenderedFragment, Section, SectionCategory};
use crate::facts::RepoFacts;
use crate::loader::Load;
use crate::locator::{is_glob, Locate};
use crate::project::ProjectKind;
use crate::vcs::render_git_info;
use std::collections::HashSet;
use tracing::{debug, info};

pub const KEY_FILE_PATTERNS: &[&str] = &[
    "README.md",
    "README.rst",
    "README.txt",
    "README",
    "LICENSE",
    "LICENSE.md",
    "LICENSE.txt",
    "CONTRIBUTING.md",
    "CHANGELOG.md",
    "CHANGELOG",
    ".env.example",
    ".env.sample",
    "Makefile",
    "makefile",
    ".github/workflows/*.yml",
    ".gitlab-ci.yml",
    "Jenkinsfile",
    "azure-pipelines.yml",
];

pub const ENTRY_POINT_PATTERNS: &[(&str, &[&str])] = &[
    ("Python", &["main.py", "app.py", "run.py", "manage.py", "__main__.py", "cli.py"]),
    ("JavaScript", &["index.js", "app.js", "server.js", "main.js", "index.ts"]),
    ("Java", &["**/Main.java", "**/Application.java", "src/main/java/**/*Application.java"]),
    ("Go", &["main.go", "cmd/*/main.go"]),
    ("Rust", &["src/main.rs", "main.rs"]),
    ("C#", &["Program.cs", "**/Program.cs"]),
    ("PHP", &["index.php", "app.php"]),
];

pub const TERRAFORM_PATTERNS: &[&str] = &["**/*.tf", "**/*.tfvars", "**/terragrunt.hcl"];

pub const POLICY_PATTERNS: &[&str] = &[
    "**/*.rego",
    "**/*.sentinel",
    "**/*policy*.json",
    "**/*policy*.yaml",
    "**/*policy*.yml",
];

pub const CONFIG_PATTERNS: &[&str] = &[
    "*.config",
    "*.conf",
    "config.*",
    "settings.*",
    ".eslintrc*",
    ".prettierrc*",
    "tsconfig.json",
    "webpack.config.js",
    "babel.config.js",
    "jest.config.js",
    ".flake8",
    "setup.cfg",
    "tox.ini",
    "pytest.ini",
];

/// Each glob in the key-file and entry-point lists contributes at most this many matches.
pub const PER_GLOB_CAP: usize = 3;
pub const MAX_TERRAFORM_FILES: usize = 30;
pub const MAX_POLICY_FILES: usize = 15;
pub const MAX_CONFIG_FILES: usize = 20;
pub const MAX_SAMPLED_PROJECT_KINDS: usize = 2;
pub const SAMPLES_PER_PATTERN: usize = 3;
pub const MAX_SAMPLE_BYTES: u64 = 50_000;
/// Paths containing any of these are never sampled.
pub const SAMPLE_SKIP_MARKERS: &[&str] = &["test", "vendor", "node_modules", "__pycache__"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    /// A checkpoint was crossed; no later section may be attempted.
    Stop,
}

pub struct Assembler<'a> {
    facts: &'a dyn RepoFacts,
    locator: &'a dyn Locate,
    loader: &'a dyn Load,
    max_lines: usize,
    budget: BudgetTracker,
}

impl<'a> Assembler<'a> {
    pub fn new(facts: &'a dyn RepoFacts, locator: &'a dyn Locate, loader: &'a dyn Load, limits: &BudgetConfig) -> Self {
        Self {
            facts,
            locator,
            loader,
            max_lines: limits.max_lines,
            budget: BudgetTracker::new(limits.max_fragment_size, limits.max_document_size),
        }
    }

    pub fn assemble(mut self, header: DocumentHeader, kinds: &[ProjectKind]) -> Document {
        let mut sections = Vec::new();
        let mut omitted = false;

        for category in SectionCategory::ALL {
            if self.budget.checkpoint_reached(category.checkpoint()) {
                info!(
                    section = category.slug(),
                    emitted = self.budget.emitted_size(),
                    "checkpoint crossed, remaining sections omitted"
                );
                omitted = true;
                break;
            }

            let mut section = Section {
                category,
                fragments: Vec::new(),
                truncated: false,
            };
            let flow = self.fill(&mut section, kinds);

            if !section.fragments.is_empty() || section.truncated {
                sections.push(section);
            }
            if flow == Flow::Stop {
                omitted = true;
                break;
            }
        }

        Document {
            header,
            sections,
            omitted,
            emitted_size: self.budget.emitted_size(),
        }
    }

    fn fill(&mut self, section: &mut Section, kinds: &[ProjectKind]) -> Flow {
        match section.category {
            SectionCategory::Structure => {
                let tree = self.facts.directory_tree();
                self.offer(section, RenderedFragment::block("", tree));
                Flow::Continue
            }
            SectionCategory::VersionControlInfo => {
                match self.facts.git_info() {
                    Ok(info) => {
                        if let Some(text) = render_git_info(&info) {
                            self.offer(section, RenderedFragment::prose(text));
                        }
                    }
                    Err(reason) => debug!(%reason, "git information unavailable"),
                }
                Flow::Continue
            }
            SectionCategory::PackageInfo => {
                let info = self.facts.package_info();
                if !info.is_empty() {
                    match info.to_pretty_json() {
                        Ok(json) => {
                            self.offer(section, RenderedFragment::block("json", json));
                        }
                        Err(e) => debug!(error = %e, "package info not serializable"),
                    }
                }
                Flow::Continue
            }
            SectionCategory::EntryPoints => {
                if let Some(list) = self.entry_point_list() {
                    self.offer(section, RenderedFragment::prose(list));
                }
                Flow::Continue
            }
            SectionCategory::KeyFiles => {
                let candidates = self.collect(KEY_FILE_PATTERNS, PER_GLOB_CAP);
                self.offer_files(section, candidates)
            }
            SectionCategory::DomainSpecificFiles => {
                let mut candidates: Vec<CandidateArtifact> =
                    self.locator.locate(TERRAFORM_PATTERNS).into_iter().take(MAX_TERRAFORM_FILES).collect();
                candidates.extend(self.locator.locate(POLICY_PATTERNS).into_iter().take(MAX_POLICY_FILES));
                self.offer_files(section, candidates)
            }
            SectionCategory::ConfigFiles => {
                let candidates = self.locator.locate(CONFIG_PATTERNS).into_iter().take(MAX_CONFIG_FILES).collect();
                self.offer_files(section, candidates)
            }
            SectionCategory::SourceSamples => {
                let candidates = self.source_samples(kinds);
                self.offer_files(section, candidates)
            }
        }
    }

    /// Check-then-commit. Returns false when the fragment was rejected for size,
    /// which also closes the section.
    fn offer(&mut self, section: &mut Section, fragment: RenderedFragment) -> bool {
        if fragment.is_empty() {
            return true;
        }
        let len = fragment.len();
        if !self.budget.would_fit(len) {
            debug!(
                section = section.category.slug(),
                heading = fragment.heading.as_deref().unwrap_or(""),
                len,
                remaining = self.budget.remaining(),
                "fragment does not fit"
            );
            section.truncated = true;
            return false;
        }
        self.budget.commit(len);
        section.fragments.push(fragment);
        true
    }

    fn offer_files(&mut self, section: &mut Section, candidates: Vec<CandidateArtifact>) -> Flow {
        for artifact in candidates {
            if self.budget.checkpoint_reached(section.category.checkpoint()) {
                return Flow::Stop;
            }
            let fragment = self.loader.load(&artifact, self.budget.max_fragment_size(), self.max_lines);
            if !self.offer(section, fragment) {
                break;
            }
        }
        Flow::Continue
    }

    /// Resolves patterns one at a time so each glob can be capped on its own.
    fn collect(&self, patterns: &[&str], per_glob_cap: usize) -> Vec<CandidateArtifact> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for pattern in patterns {
            let cap = if is_glob(pattern) { per_glob_cap } else { usize::MAX };
            for artifact in self.locator.locate(&[*pattern]).into_iter().take(cap) {
                if seen.insert(artifact.abs_path.clone()) {
                    out.push(artifact);
                }
            }
        }
        out
    }

    fn entry_point_list(&self) -> Option<String> {
        let mut items = Vec::new();
        for (lang, patterns) in ENTRY_POINT_PATTERNS {
            for artifact in self.collect(patterns, PER_GLOB_CAP) {
                items.push(format!("- **{lang}:** `{}`", artifact.rel_path));
            }
        }
        if items.is_empty() {
            None
        } else {
            Some(items.join("\n"))
        }
    }

    fn source_samples(&self, kinds: &[ProjectKind]) -> Vec<CandidateArtifact> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for kind in kinds.iter().take(MAX_SAMPLED_PROJECT_KINDS) {
            for pattern in kind.source_patterns() {
                let mut files: Vec<CandidateArtifact> = self
                    .locator
                    .locate(&[*pattern])
                    .into_iter()
                    .filter(|a| !SAMPLE_SKIP_MARKERS.iter().any(|m| a.rel_path.contains(m)))
                    .filter(|a| a.bytes < MAX_SAMPLE_BYTES)
                    .collect();
                files.sort_by(|a, b| a.rel_path.cmp(&b.rel_path));

                for artifact in files.into_iter().take(SAMPLES_PER_PATTERN) {
                    if seen.insert(artifact.abs_path.clone()) {
                        out.push(artifact);
                    }
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budget::FRAGMENT_OVERHEAD;
    use crate::document::FragmentKind;
    use crate::package_info::PackageInfo;
    use crate::vcs::{GitInfo, VcsUnavailable};
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    /// In-memory repository: path -> content. Patterns match by exact name,
    /// `*.ext` (root only) or `**/*.ext` (anywhere).
    #[derive(Default)]
    struct Fixture {
        files: BTreeMap<String, String>,
        tree: String,
        git: Option<GitInfo>,
        package: PackageInfo,
    }

    impl Fixture {
        fn with(mut self, path: &str, content: &str) -> Self {
            self.files.insert(path.to_string(), content.to_string());
            self
        }

        fn matches(pattern: &str, path: &str) -> bool {
            if let Some(ext) = pattern.strip_prefix("**/*") {
                return path.ends_with(ext);
            }
            if let Some(ext) = pattern.strip_prefix('*') {
                return !path.contains('/') && path.ends_with(ext);
            }
            pattern == path
        }
    }

    impl Locate for Fixture {
        fn locate(&self, patterns: &[&str]) -> Vec<CandidateArtifact> {
            let mut out: Vec<CandidateArtifact> = Vec::new();
            for p in patterns {
                for (path, content) in &self.files {
                    if Self::matches(p, path) && !out.iter().any(|a| &a.rel_path == path) {
                        out.push(CandidateArtifact {
                            abs_path: PathBuf::from("/repo").join(path),
                            rel_path: path.clone(),
                            bytes: content.len() as u64,
                        });
                    }
                }
            }
            out
        }
    }

    impl Load for Fixture {
        fn load(&self, artifact: &CandidateArtifact, max_fragment_size: u64, max_lines: usize) -> RenderedFragment {
            let content = self.files[&artifact.rel_path].clone();
            if artifact.bytes > max_fragment_size {
                return RenderedFragment::file(
                    &artifact.rel_path,
                    "text",
                    crate::loader::too_large_placeholder(artifact.bytes),
                    FragmentKind::Placeholder,
                );
            }
            let (text, kind) = crate::loader::truncate_lines(content, max_lines);
            RenderedFragment::file(&artifact.rel_path, "text", text, kind)
        }
    }

    impl RepoFacts for Fixture {
        fn project_kinds(&self) -> Vec<ProjectKind> {
            Vec::new()
        }
        fn directory_tree(&self) -> String {
            self.tree.clone()
        }
        fn git_info(&self) -> Result<GitInfo, VcsUnavailable> {
            self.git.clone().ok_or(VcsUnavailable::NotARepository)
        }
        fn package_info(&self) -> PackageInfo {
            self.package.clone()
        }
    }

    fn header() -> DocumentHeader {
        DocumentHeader {
            generator: "test".into(),
            generated_at: "2024-01-01 00:00:00".into(),
            repo_name: "repo".into(),
            repo_path: PathBuf::from("/repo"),
            project_types: Vec::new(),
        }
    }

    fn limits(max_document_size: usize) -> BudgetConfig {
        BudgetConfig {
            max_fragment_size: 10_000,
            max_document_size,
            max_lines: 50,
        }
    }

    fn run(fx: &Fixture, max_document_size: usize, kinds: &[ProjectKind]) -> Document {
        Assembler::new(fx, fx, fx, &limits(max_document_size)).assemble(header(), kinds)
    }

    fn categories(doc: &Document) -> Vec<SectionCategory> {
        doc.sections.iter().map(|s| s.category).collect()
    }

    fn headings(section: &Section) -> Vec<&str> {
        section.fragments.iter().filter_map(|f| f.heading.as_deref()).collect()
    }

    #[test]
    fn oversized_first_fragment_is_rejected_and_budget_untouched() {
        let fx = Fixture::default().with("README.md", &"x".repeat(150));
        let doc = run(&fx, 100, &[]);

        assert_eq!(doc.emitted_size, 0);
        let key = doc.sections.iter().find(|s| s.category == SectionCategory::KeyFiles).unwrap();
        assert!(key.truncated);
        assert!(key.fragments.is_empty());
        assert!(!doc.omitted);
    }

    #[test]
    fn every_accepted_fragment_is_charged_with_overhead() {
        let fx = Fixture {
            tree: "repo/\n└── README.md".into(),
            ..Fixture::default()
        }
        .with("README.md", "hello");
        let doc = run(&fx, 100_000, &[]);

        let tree_len = "repo/\n└── README.md".chars().count();
        assert_eq!(doc.emitted_size, tree_len + FRAGMENT_OVERHEAD + 5 + FRAGMENT_OVERHEAD);
        assert_eq!(categories(&doc), vec![SectionCategory::Structure, SectionCategory::KeyFiles]);
    }

    #[test]
    fn crossing_a_checkpoint_stops_all_later_sections() {
        let fx = Fixture::default()
            .with("README.md", &"r".repeat(700))
            .with("LICENSE", &"l".repeat(250))
            .with("main.tf", "resource {}")
            .with("tox.ini", "[tox]");
        let doc = run(&fx, 1_000, &[]);

        // README leaves 800 emitted; LICENSE would reach 1050 and is rejected.
        let key = &doc.sections[0];
        assert_eq!(key.category, SectionCategory::KeyFiles);
        assert_eq!(headings(key), vec!["README.md"]);
        assert!(key.truncated);

        // 800 is not past 85%, so the terraform file still goes in (911 emitted).
        assert_eq!(doc.sections[1].category, SectionCategory::DomainSpecificFiles);
        assert_eq!(headings(&doc.sections[1]), vec!["main.tf"]);
        assert_eq!(doc.emitted_size, 800 + 11 + FRAGMENT_OVERHEAD);

        // 911 is past 90%: config files and samples are never attempted.
        assert!(doc.omitted);
        assert_eq!(doc.sections.len(), 2);
        assert!(!categories(&doc).contains(&SectionCategory::ConfigFiles));
    }

    #[test]
    fn checkpoint_is_rechecked_between_files() {
        let fx = Fixture::default()
            .with("README.md", &"r".repeat(750))
            .with("LICENSE", "short")
            .with("tox.ini", "[tox]");
        let doc = run(&fx, 1_000, &[]);

        // README leaves 850 emitted (> 80%): LICENSE is never loaded and the run stops.
        assert_eq!(doc.sections.len(), 1);
        assert_eq!(headings(&doc.sections[0]), vec!["README.md"]);
        assert!(!doc.sections[0].truncated);
        assert!(doc.omitted);
    }

    #[test]
    fn rejected_fragment_closes_only_its_section() {
        let fx = Fixture::default()
            .with("README.md", &"r".repeat(600))
            .with("LICENSE", "tiny")
            .with("tox.ini", "[tox]");
        let doc = run(&fx, 550, &[]);

        let key = &doc.sections[0];
        assert!(key.truncated);
        assert!(key.fragments.is_empty());
        // LICENSE would have fitted but the section was already closed.
        let config = doc.sections.iter().find(|s| s.category == SectionCategory::ConfigFiles).unwrap();
        assert_eq!(headings(config), vec!["tox.ini"]);
        assert!(!doc.omitted);
    }

    #[test]
    fn glob_key_files_capped_per_pattern() {
        let fx = Fixture::default()
            .with(".github/workflows/a.yml", "a")
            .with(".github/workflows/b.yml", "b")
            .with(".github/workflows/c.yml", "c")
            .with(".github/workflows/d.yml", "d");
        let assembler = Assembler::new(&fx, &fx, &fx, &limits(100_000));
        let found = assembler.collect(&["**/*.yml", "README.md"], PER_GLOB_CAP);
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn entry_points_render_as_list() {
        let fx = Fixture::default().with("main.py", "").with("src/main.rs", "");
        let doc = run(&fx, 100_000, &[]);
        let ep = doc.sections.iter().find(|s| s.category == SectionCategory::EntryPoints).unwrap();
        assert_eq!(ep.fragments[0].text, "- **Python:** `main.py`\n- **Rust:** `src/main.rs`");
        assert_eq!(ep.fragments[0].language, None);
    }

    #[test]
    fn samples_limit_kinds_and_files_and_skip_tests() {
        let fx = Fixture::default()
            .with("a.py", "a")
            .with("b.py", "b")
            .with("c.py", "c")
            .with("d.py", "d")
            .with("test_e.py", "e")
            .with("lib.rs", "r")
            .with("main.go", "g");
        let kinds = [ProjectKind::Python, ProjectKind::Rust, ProjectKind::Go];
        let doc = run(&fx, 100_000, &kinds);

        let samples = doc.sections.iter().find(|s| s.category == SectionCategory::SourceSamples).unwrap();
        assert_eq!(headings(samples), vec!["a.py", "b.py", "c.py", "lib.rs"]);
    }

    #[test]
    fn unavailable_git_omits_section() {
        let fx = Fixture::default().with("README.md", "hi");
        let doc = run(&fx, 100_000, &[]);
        assert!(!categories(&doc).contains(&SectionCategory::VersionControlInfo));

        let fx = Fixture {
            git: Some(GitInfo {
                branch: Some("main".into()),
                ..GitInfo::default()
            }),
            ..Fixture::default()
        };
        let doc = run(&fx, 100_000, &[]);
        assert_eq!(categories(&doc), vec![SectionCategory::VersionControlInfo]);
    }

    #[test]
    fn empty_files_are_skipped_without_charge() {
        let fx = Fixture::default().with("README.md", "");
        let doc = run(&fx, 100_000, &[]);
        assert!(doc.sections.is_empty());
        assert_eq!(doc.emitted_size, 0);
    }

    #[test]
    fn emitted_size_never_exceeds_ceiling_by_more_than_overhead() {
        let mut fx = Fixture::default();
        for i in 0..40 {
            fx = fx.with(&format!("m{i:02}.tf"), &"t".repeat(37 * (i + 1)));
        }
        for ceiling in [200, 1_000, 5_000, 20_000] {
            let doc = run(&fx, ceiling, &[]);
            assert!(doc.emitted_size < ceiling + FRAGMENT_OVERHEAD, "ceiling {ceiling}: {}", doc.emitted_size);
        }
    }

    #[test]
    fn domain_files_cap_terraform_then_policy() {
        let mut fx = Fixture::default();
        for i in 0..31 {
            fx = fx.with(&format!("infra/m{i:02}.tf"), "t");
        }
        for i in 0..16 {
            fx = fx.with(&format!("policies/p{i:02}.rego"), "p");
        }
        let doc = run(&fx, 100_000, &[]);

        let domain = doc
            .sections
            .iter()
            .find(|s| s.category == SectionCategory::DomainSpecificFiles)
            .unwrap();
        let names = headings(domain);
        assert_eq!(names.len(), MAX_TERRAFORM_FILES + MAX_POLICY_FILES);
        assert!(names[..MAX_TERRAFORM_FILES].iter().all(|n| n.ends_with(".tf")));
        assert!(names[MAX_TERRAFORM_FILES..].iter().all(|n| n.ends_with(".rego")));
        assert_eq!(names[MAX_TERRAFORM_FILES - 1], "infra/m29.tf");
        assert_eq!(names.last().copied(), Some("policies/p14.rego"));
        assert!(!domain.truncated);
    }

    #[test]
    fn config_files_capped() {
        let mut fx = Fixture::default();
        for i in 0..21 {
            fx = fx.with(&format!("c{i:02}.conf"), "k = v");
        }
        let doc = run(&fx, 100_000, &[]);

        let config = doc.sections.iter().find(|s| s.category == SectionCategory::ConfigFiles).unwrap();
        let names = headings(config);
        assert_eq!(names.len(), MAX_CONFIG_FILES);
        assert_eq!(names.last().copied(), Some("c19.conf"));
    }
}
