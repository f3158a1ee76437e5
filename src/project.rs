//! Heuristic project-type detection from characteristic files at the repo root.

use crate::locator::is_glob;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProjectKind {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Go,
    Rust,
    Ruby,
    Php,
    CSharp,
    Cpp,
    Terraform,
    Kubernetes,
    Docker,
    Ansible,
}

impl ProjectKind {
    /// Detection order; also the order types are reported and sampled in.
    pub const ALL: [ProjectKind; 14] = [
        ProjectKind::Python,
        ProjectKind::JavaScript,
        ProjectKind::TypeScript,
        ProjectKind::Java,
        ProjectKind::Go,
        ProjectKind::Rust,
        ProjectKind::Ruby,
        ProjectKind::Php,
        ProjectKind::CSharp,
        ProjectKind::Cpp,
        ProjectKind::Terraform,
        ProjectKind::Kubernetes,
        ProjectKind::Docker,
        ProjectKind::Ansible,
    ];

    pub fn indicators(self) -> &'static [&'static str] {
        match self {
            ProjectKind::Python => &["requirements.txt", "setup.py", "pyproject.toml", "Pipfile", "poetry.lock"],
            ProjectKind::JavaScript => &["package.json", "yarn.lock", "package-lock.json"],
            ProjectKind::TypeScript => &["tsconfig.json", "package.json"],
            ProjectKind::Java => &["pom.xml", "build.gradle", "build.gradle.kts", "settings.gradle"],
            ProjectKind::Go => &["go.mod", "go.sum"],
            ProjectKind::Rust => &["Cargo.toml", "Cargo.lock"],
            ProjectKind::Ruby => &["Gemfile", "Gemfile.lock", ".ruby-version"],
            ProjectKind::Php => &["composer.json", "composer.lock"],
            ProjectKind::CSharp => &["*.csproj", "*.sln", "packages.config"],
            ProjectKind::Cpp => &["CMakeLists.txt", "Makefile", "*.cpp", "*.h"],
            ProjectKind::Terraform => &["*.tf", "terragrunt.hcl", "*.tfvars"],
            ProjectKind::Kubernetes => &["k8s/*.yaml", "k8s/*.yml", "kubernetes/*.yaml"],
            ProjectKind::Docker => &["Dockerfile", "docker-compose.yml", "docker-compose.yaml"],
            ProjectKind::Ansible => &["ansible.cfg", "playbook.yml", "requirements.yml"],
        }
    }

    /// Source globs sampled for this kind. Kinds without source of their own
    /// (infrastructure, containers) have none.
    pub fn source_patterns(self) -> &'static [&'static str] {
        match self {
            ProjectKind::Python => &["**/*.py"],
            ProjectKind::JavaScript => &["**/*.js", "**/*.jsx"],
            ProjectKind::TypeScript => &["**/*.ts", "**/*.tsx"],
            ProjectKind::Java => &["**/*.java"],
            ProjectKind::Go => &["**/*.go"],
            ProjectKind::Rust => &["**/*.rs"],
            ProjectKind::CSharp => &["**/*.cs"],
            ProjectKind::Cpp => &["**/*.cpp", "**/*.h"],
            _ => &[],
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ProjectKind::Python => "python",
            ProjectKind::JavaScript => "javascript",
            ProjectKind::TypeScript => "typescript",
            ProjectKind::Java => "java",
            ProjectKind::Go => "go",
            ProjectKind::Rust => "rust",
            ProjectKind::Ruby => "ruby",
            ProjectKind::Php => "php",
            ProjectKind::CSharp => "csharp",
            ProjectKind::Cpp => "cpp",
            ProjectKind::Terraform => "terraform",
            ProjectKind::Kubernetes => "kubernetes",
            ProjectKind::Docker => "docker",
            ProjectKind::Ansible => "ansible",
        }
    }
}

impl std::fmt::Display for ProjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

fn indicator_present(root: &Path, indicator: &str) -> bool {
    if !is_glob(indicator) {
        return root.join(indicator).exists();
    }
    let pattern = format!("{}/{}", glob::Pattern::escape(&root.to_string_lossy()), indicator);
    glob::glob(&pattern)
        .map(|mut paths| paths.any(|p| p.is_ok()))
        .unwrap_or(false)
}

/// Every kind with at least one indicator present, in `ProjectKind::ALL` order.
pub fn detect_project_kinds(root: &Path) -> Vec<ProjectKind> {
    ProjectKind::ALL
        .into_iter()
        .filter(|kind| kind.indicators().iter().any(|i| indicator_present(root, i)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn detects_in_declaration_order() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("Cargo.toml"), "[package]\nname = \"x\"\n").unwrap();
        std::fs::write(tmp.path().join("package.json"), "{}").unwrap();
        std::fs::write(tmp.path().join("Dockerfile"), "FROM scratch\n").unwrap();

        let kinds = detect_project_kinds(tmp.path());
        assert_eq!(
            kinds,
            vec![
                ProjectKind::JavaScript,
                ProjectKind::TypeScript,
                ProjectKind::Rust,
                ProjectKind::Docker
            ]
        );
    }

    #[test]
    fn glob_indicators_are_expanded() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join("main.tf"), "").unwrap();
        std::fs::create_dir_all(tmp.path().join("k8s")).unwrap();
        std::fs::write(tmp.path().join("k8s/deploy.yaml"), "").unwrap();

        let kinds = detect_project_kinds(tmp.path());
        assert_eq!(kinds, vec![ProjectKind::Terraform, ProjectKind::Kubernetes]);
    }

    #[test]
    fn empty_repo_detects_nothing() {
        let tmp = TempDir::new().unwrap();
        assert!(detect_project_kinds(tmp.path()).is_empty());
    }

    #[test]
    fn infrastructure_kinds_have_no_source_patterns() {
        assert!(ProjectKind::Terraform.source_patterns().is_empty());
        assert_eq!(ProjectKind::Rust.source_patterns(), &["**/*.rs"]);
        assert_eq!(ProjectKind::CSharp.to_string(), "csharp");
    }
}
