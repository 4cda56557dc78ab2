//! Manifest data model.

use serde::Serialize;

use crate::error::{RelayError, Result};

/// A project declared by the manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// Slash-delimited project name (e.g., "platform/build")
    pub name: String,
    /// Local checkout path relative to the work directory
    pub path: String,
    /// Branch, tag, or commit the project is pinned to
    pub revision: Option<String>,
    /// Fetch URL of the project's remote, if it could be resolved
    pub remote: Option<String>,
}

impl Project {
    /// Create a project whose path defaults to its name.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let path = name.clone();
        Self::with_path(name, path)
    }

    /// Create a project with an explicit checkout path.
    pub fn with_path(name: impl Into<String>, path: impl Into<String>) -> Result<Self> {
        let name = name.into();
        let path = path.into();
        if name.is_empty() {
            return Err(RelayError::InvalidProject(
                "Project name cannot be empty".to_string(),
            ));
        }
        if path.is_empty() {
            return Err(RelayError::InvalidProject(format!(
                "Project path cannot be empty ({})",
                name
            )));
        }
        Ok(Self {
            name,
            path,
            revision: None,
            remote: None,
        })
    }

    pub fn with_revision(mut self, revision: impl Into<String>) -> Self {
        self.revision = Some(revision.into());
        self
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = Some(remote.into());
        self
    }

    /// Revision if present and non-empty.
    pub fn revision(&self) -> Option<&str> {
        self.revision.as_deref().filter(|r| !r.is_empty())
    }
}
