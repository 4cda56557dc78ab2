//! Configuration schema for relay.toml
//!
//! Mirrors the file layout; values are validated into
//! [`ManifestConfig`](super::ManifestConfig) and
//! [`DeliveryConfig`](super::DeliveryConfig) by the parser.

use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration structure for relay.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RelayConfigFile {
    /// Manifest source
    #[serde(default)]
    pub manifest: ManifestSection,

    /// Push target
    #[serde(default)]
    pub delivery: DeliverySection,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManifestSection {
    /// Manifest repository URL passed to `repo init -u`
    #[serde(default)]
    pub repo_url: String,

    /// Manifest branch (exclusive with `tag`)
    #[serde(default)]
    pub branch: Option<String>,

    /// Manifest tag (exclusive with `branch`)
    #[serde(default)]
    pub tag: Option<String>,

    /// Revision for projects the manifest leaves unpinned
    #[serde(default)]
    pub default_revision: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeliverySection {
    /// Base URL of the Gerrit server
    #[serde(default)]
    pub gerrit_url: String,

    /// Append a yymmdd suffix to destination branch names
    #[serde(default)]
    pub branch_transform: bool,

    /// Segment inserted into destination repository paths
    #[serde(default)]
    pub repo_alias: Option<String>,

    #[serde(default)]
    pub auth: AuthSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthSection {
    /// "ssh" or "http"
    #[serde(default = "default_auth_method")]
    pub method: String,

    #[serde(default)]
    pub ssh_key_path: Option<PathBuf>,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            method: default_auth_method(),
            ssh_key_path: None,
            username: None,
            password: None,
        }
    }
}

fn default_auth_method() -> String {
    "ssh".to_string()
}
