use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct NodePackage {
    pub name: String,
    pub version: String,
    pub description: String,
    pub scripts: Vec<String>,
    pub dependencies: Vec<String>,
    #[serde(rename = "devDependencies")]
    pub dev_dependencies: Vec<String>,
}

/// Either the parsed summary or a note that the manifest exists but could not be read.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Manifest<T> {
    Parsed(T),
    Unparsed(String),
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct RustCrate {
    pub name: String,
    pub version: String,
    pub dependencies: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct PackageInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_requirements: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_project: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node_package: Option<Manifest<NodePackage>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_maven: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub java_gradle: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub go_module: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rust_crate: Option<Manifest<RustCrate>>,
}

impl PackageInfo {
    pub fn is_empty(&self) -> bool {
        *self == PackageInfo::default()
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

const MAX_REQUIREMENTS: usize = 20;
const MAX_SCRIPTS: usize = 10;
const MAX_DEPENDENCIES: usize = 15;
const MAX_DEV_DEPENDENCIES: usize = 10;

fn read(root: &Path, name: &str) -> Option<String> {
    std::fs::read_to_string(root.join(name)).ok()
}

fn object_keys(v: &serde_json::Value, key: &str, limit: usize) -> Vec<String> {
    v.get(key)
        .and_then(|o| o.as_object())
        .map(|o| o.keys().take(limit).cloned().collect())
        .unwrap_or_default()
}

fn str_field(v: &serde_json::Value, key: &str, fallback: &str) -> String {
    v.get(key).and_then(|s| s.as_str()).unwrap_or(fallback).to_string()
}

fn python_requirements(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .take(MAX_REQUIREMENTS)
        .map(str::to_string)
        .collect()
}

fn node_package(text: &str) -> Manifest<NodePackage> {
    let Ok(v) = serde_json::from_str::<serde_json::Value>(text) else {
        return Manifest::Unparsed("package.json found but couldn't parse".to_string());
    };
    Manifest::Parsed(NodePackage {
        name: str_field(&v, "name", "Unknown"),
        version: str_field(&v, "version", "Unknown"),
        description: str_field(&v, "description", ""),
        scripts: object_keys(&v, "scripts", MAX_SCRIPTS),
        dependencies: object_keys(&v, "dependencies", MAX_DEPENDENCIES),
        dev_dependencies: object_keys(&v, "devDependencies", MAX_DEV_DEPENDENCIES),
    })
}

fn rust_crate(text: &str) -> Manifest<RustCrate> {
    let Ok(value) = text.parse::<toml::Value>() else {
        return Manifest::Unparsed("Cargo.toml found but couldn't parse".to_string());
    };
    let package = value.get("package");
    let field = |k: &str| {
        package
            .and_then(|p| p.get(k))
            .and_then(|v| v.as_str())
            .unwrap_or(if k == "name" { "workspace" } else { "Unknown" })
            .to_string()
    };
    let dependencies = value
        .get("dependencies")
        .or_else(|| value.get("workspace").and_then(|w| w.get("dependencies")))
        .and_then(|d| d.as_table())
        .map(|t| t.keys().take(MAX_DEPENDENCIES).cloned().collect())
        .unwrap_or_default();

    Manifest::Parsed(RustCrate {
        name: field("name"),
        version: field("version"),
        dependencies,
    })
}

/// Summarize the package manifests found at the repo root.
pub fn extract_package_info(root: &Path) -> PackageInfo {
    let mut info = PackageInfo::default();

    if let Some(text) = read(root, "requirements.txt") {
        info.python_requirements = Some(python_requirements(&text));
    }
    if let Some(text) = read(root, "pyproject.toml") {
        if text.contains("[project]") {
            info.python_project = Some("pyproject.toml found".to_string());
        }
    }
    if let Some(text) = read(root, "package.json") {
        info.node_package = Some(node_package(&text));
    }
    if root.join("pom.xml").exists() {
        info.java_maven = Some("pom.xml found".to_string());
    }
    if root.join("build.gradle").exists() {
        info.java_gradle = Some("build.gradle found".to_string());
    }
    if let Some(text) = read(root, "go.mod") {
        let first = text.lines().next().unwrap_or("");
        info.go_module = Some(first.replace("module ", "").trim().to_string());
    }
    if let Some(text) = read(root, "Cargo.toml") {
        info.rust_crate = Some(rust_crate(&text));
    }

    info
}
