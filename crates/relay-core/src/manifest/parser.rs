//! Manifest XML parser.
//!
//! Reads a repo-style manifest (`<manifest>` root with `<remote>`,
//! `<default>` and `<project>` children) into a list of [`Project`]s.
//! Elements and attributes not needed for delivery (`include`, `notice`,
//! `copyfile`, `groups`, ...) are ignored.
//!
//! Manifest files must be UTF-8. A file that is not valid UTF-8 fails with
//! [`RelayError::ManifestRead`] whatever its XML declaration says.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::model::Project;
use crate::error::{RelayError, Result};

/// Remote name used by projects that declare none, when the manifest has
/// no `<default remote="...">` either.
pub const DEFAULT_REMOTE_NAME: &str = "default";

#[derive(Debug, Default, Deserialize)]
struct ManifestDocument {
    #[serde(rename = "remote", default)]
    remotes: Vec<RemoteElement>,
    #[serde(rename = "default", default)]
    default: Option<DefaultElement>,
    #[serde(rename = "project", default)]
    projects: Vec<ProjectElement>,
}

#[derive(Debug, Deserialize)]
struct RemoteElement {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@fetch")]
    fetch: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DefaultElement {
    #[serde(rename = "@revision")]
    revision: Option<String>,
    #[serde(rename = "@remote")]
    remote: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ProjectElement {
    #[serde(rename = "@name")]
    name: String,
    #[serde(rename = "@path")]
    path: Option<String>,
    #[serde(rename = "@revision")]
    revision: Option<String>,
    #[serde(rename = "@remote")]
    remote: Option<String>,
}

impl ManifestDocument {
    fn from_str(content: &str) -> Result<Self> {
        quick_xml::de::from_str(content).map_err(|e| RelayError::ManifestParse(e.to_string()))
    }

    fn default_revision(&self) -> Option<&str> {
        self.default
            .as_ref()
            .and_then(|d| d.revision.as_deref())
            .filter(|r| !r.is_empty())
    }

    fn default_remote(&self) -> Option<&str> {
        self.default
            .as_ref()
            .and_then(|d| d.remote.as_deref())
            .filter(|r| !r.is_empty())
    }

    fn fetch_url(&self, remote_name: &str) -> Option<&str> {
        self.remotes
            .iter()
            .find(|remote| remote.name == remote_name)
            .and_then(|remote| remote.fetch.as_deref())
            .filter(|fetch| !fetch.is_empty())
    }
}

/// Options applied while turning a manifest document into projects.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Remote name assumed when neither the project nor `<default>` names one
    pub default_remote_name: String,
    /// Revision that takes precedence over `<default revision>` for back-filling
    pub default_revision_override: Option<String>,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            default_remote_name: DEFAULT_REMOTE_NAME.to_string(),
            default_revision_override: None,
        }
    }
}

/// Parse manifest content with default options.
pub fn parse_manifest_str(content: &str) -> Result<Vec<Project>> {
    parse_manifest_str_with(content, &ParseOptions::default())
}

/// Parse manifest content.
///
/// Fails on malformed XML, on a project without a `name` attribute and on a
/// project whose name or resolved path is empty. No partial result is
/// returned.
pub fn parse_manifest_str_with(content: &str, options: &ParseOptions) -> Result<Vec<Project>> {
    let document = ManifestDocument::from_str(content)?;
    let fallback_remote = document
        .default_remote()
        .unwrap_or(&options.default_remote_name);

    let mut projects = Vec::with_capacity(document.projects.len());
    for element in &document.projects {
        let path = element.path.clone().unwrap_or_else(|| element.name.clone());
        let mut project = Project::with_path(element.name.clone(), path)?;
        project.revision = element.revision.clone().filter(|r| !r.is_empty());

        let remote_name = element
            .remote
            .as_deref()
            .filter(|r| !r.is_empty())
            .unwrap_or(fallback_remote);
        project.remote = document.fetch_url(remote_name).map(str::to_string);
        if project.remote.is_none() {
            debug!(
                "Remote '{}' of project {} is not declared",
                remote_name, project.name
            );
        }

        projects.push(project);
    }

    let default_revision = options
        .default_revision_override
        .as_deref()
        .filter(|r| !r.is_empty())
        .or_else(|| document.default_revision());
    if let Some(default_revision) = default_revision {
        for project in projects.iter_mut().filter(|p| p.revision.is_none()) {
            project.revision = Some(default_revision.to_string());
        }
    }

    Ok(projects)
}

/// Read the `<default revision>` of manifest content.
pub fn default_revision_str(content: &str) -> Result<Option<String>> {
    let document = ManifestDocument::from_str(content)?;
    Ok(document.default_revision().map(str::to_string))
}

/// Parser bound to a manifest file on disk.
#[derive(Debug, Clone)]
pub struct ManifestParser {
    manifest_path: PathBuf,
    options: ParseOptions,
}

impl ManifestParser {
    /// Create a parser for an existing manifest file.
    pub fn new(manifest_path: impl Into<PathBuf>) -> Result<Self> {
        let manifest_path = manifest_path.into();
        if !manifest_path.is_file() {
            return Err(RelayError::not_found(manifest_path));
        }
        Ok(Self {
            manifest_path,
            options: ParseOptions::default(),
        })
    }

    pub fn with_default_remote_name(mut self, name: impl Into<String>) -> Self {
        self.options.default_remote_name = name.into();
        self
    }

    pub fn with_default_revision(mut self, revision: Option<String>) -> Self {
        self.options.default_revision_override = revision;
        self
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn parse(&self) -> Result<Vec<Project>> {
        let content = self.read()?;
        let projects = parse_manifest_str_with(&content, &self.options)?;
        debug!(
            "Parsed {} projects from {}",
            projects.len(),
            self.manifest_path.display()
        );
        Ok(projects)
    }

    pub fn default_revision(&self) -> Result<Option<String>> {
        default_revision_str(&self.read()?)
    }

    fn read(&self) -> Result<String> {
        std::fs::read_to_string(&self.manifest_path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                RelayError::not_found(&self.manifest_path)
            } else {
                RelayError::manifest_read(&self.manifest_path, e)
            }
        })
    }
}
