//! Error types for delivery operations

use std::path::PathBuf;

use thiserror::Error;

/// Result type for delivery operations
pub type Result<T> = std::result::Result<T, RelayError>;

/// How far an error reaches.
///
/// Configuration and acquisition errors abort a whole run; project-local
/// errors are absorbed into the delivery result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Acquisition,
    ProjectLocal,
}

/// Errors that can occur while delivering manifest projects
#[derive(Debug, Error)]
pub enum RelayError {
    /// Invalid or conflicting configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A required file or directory does not exist
    #[error("Not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// The manifest or its working directory could not be read or created
    #[error("Failed to read manifest at {}: {source}", path.display())]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The manifest document is not well-formed
    #[error("Failed to parse manifest: {0}")]
    ManifestParse(String),

    /// An external tool could not be run or exited with an error
    #[error("{tool} failed: {message}")]
    ToolInvocation { tool: String, message: String },

    /// A manifest entry violates the project invariants
    #[error("Invalid project: {0}")]
    InvalidProject(String),

    /// The revision does not point at any commit in the local checkout
    #[error("Revision '{revision}' not found in {}", path.display())]
    UnresolvedRevision { revision: String, path: PathBuf },

    /// The remote refused a reference update
    #[error("Push of {refname} rejected: {message}")]
    PushRejected { refname: String, message: String },

    /// The destination URL could not be composed
    #[error("Invalid destination URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Git repository error
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RelayError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn not_found(path: impl Into<PathBuf>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub fn manifest_read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ManifestRead {
            path: path.into(),
            source,
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::NotFound { .. }
            | Self::ManifestRead { .. }
            | Self::ManifestParse(_)
            | Self::ToolInvocation { .. }
            | Self::InvalidProject(_) => ErrorCategory::Acquisition,
            Self::UnresolvedRevision { .. }
            | Self::PushRejected { .. }
            | Self::InvalidUrl { .. }
            | Self::Git(_)
            | Self::Io(_) => ErrorCategory::ProjectLocal,
        }
    }

    pub fn is_fatal(&self) -> bool {
        self.category() != ErrorCategory::ProjectLocal
    }
}
