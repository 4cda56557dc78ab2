//! Validated delivery settings.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::{RelayError, Result};

/// Where to obtain the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestConfig {
    repo_url: String,
    branch: Option<String>,
    tag: Option<String>,
    default_revision: Option<String>,
}

impl ManifestConfig {
    pub fn new(
        repo_url: impl Into<String>,
        branch: Option<String>,
        tag: Option<String>,
        default_revision: Option<String>,
    ) -> Result<Self> {
        let repo_url = repo_url.into();
        if repo_url.trim().is_empty() {
            return Err(RelayError::config(
                "Manifest repository URL cannot be empty",
            ));
        }
        let branch = non_empty(branch);
        let tag = non_empty(tag);
        if branch.is_some() && tag.is_some() {
            return Err(RelayError::config("Cannot specify both branch and tag"));
        }
        Ok(Self {
            repo_url,
            branch,
            tag,
            default_revision: non_empty(default_revision),
        })
    }

    pub fn repo_url(&self) -> &str {
        &self.repo_url
    }

    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Revision used for projects the manifest leaves unpinned.
    pub fn default_revision(&self) -> Option<&str> {
        self.default_revision.as_deref()
    }
}

/// Authentication mode for the push target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Ssh,
    Http,
}

impl FromStr for AuthMethod {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ssh" => Ok(Self::Ssh),
            "http" => Ok(Self::Http),
            _ => Err(RelayError::config(format!(
                "auth method must be 'ssh' or 'http', got '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for AuthMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssh => write!(f, "ssh"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Credentials for the push target.
#[derive(Clone, PartialEq, Eq)]
pub enum Auth {
    Ssh {
        key_path: PathBuf,
        username: Option<String>,
    },
    Http {
        username: String,
        password: Option<String>,
    },
}

impl Auth {
    pub fn method(&self) -> AuthMethod {
        match self {
            Self::Ssh { .. } => AuthMethod::Ssh,
            Self::Http { .. } => AuthMethod::Http,
        }
    }

    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Ssh { username, .. } => username.as_deref(),
            Self::Http { username, .. } => Some(username),
        }
    }

    pub fn password(&self) -> Option<&str> {
        match self {
            Self::Ssh { .. } => None,
            Self::Http { password, .. } => password.as_deref(),
        }
    }

    pub fn ssh_key_path(&self) -> Option<&Path> {
        match self {
            Self::Ssh { key_path, .. } => Some(key_path),
            Self::Http { .. } => None,
        }
    }
}

// Keeps passwords out of debug logs.
impl fmt::Debug for Auth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ssh { key_path, username } => f
                .debug_struct("Ssh")
                .field("key_path", key_path)
                .field("username", username)
                .finish(),
            Self::Http { username, password } => f
                .debug_struct("Http")
                .field("username", username)
                .field("password", &password.as_ref().map(|_| "***"))
                .finish(),
        }
    }
}

/// Where and how to push.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    gerrit_url: String,
    auth: Auth,
    branch_transform: bool,
    repo_alias: Option<String>,
}

impl DeliveryConfig {
    /// Build a delivery config from raw settings.
    ///
    /// `ssh` requires a key path and `http` requires a username.
    pub fn new(
        gerrit_url: impl Into<String>,
        auth_method: &str,
        ssh_key_path: Option<PathBuf>,
        username: Option<String>,
        password: Option<String>,
    ) -> Result<Self> {
        let username = non_empty(username);
        let password = non_empty(password);
        let auth = match auth_method.parse::<AuthMethod>()? {
            AuthMethod::Ssh => Auth::Ssh {
                key_path: ssh_key_path
                    .filter(|p| !p.as_os_str().is_empty())
                    .ok_or_else(|| {
                        RelayError::config("ssh_key_path is required for SSH authentication")
                    })?,
                username,
            },
            AuthMethod::Http => Auth::Http {
                username: username.ok_or_else(|| {
                    RelayError::config("username is required for HTTP authentication")
                })?,
                password,
            },
        };
        Self::with_auth(gerrit_url, auth)
    }

    pub fn with_auth(gerrit_url: impl Into<String>, auth: Auth) -> Result<Self> {
        let gerrit_url = gerrit_url.into();
        if gerrit_url.trim().is_empty() {
            return Err(RelayError::config("Gerrit URL cannot be empty"));
        }
        Ok(Self {
            gerrit_url,
            auth,
            branch_transform: false,
            repo_alias: None,
        })
    }

    /// Append a `yymmdd` date suffix to destination branches.
    pub fn with_branch_transform(mut self, enabled: bool) -> Self {
        self.branch_transform = enabled;
        self
    }

    /// Insert an alias segment into destination repository paths.
    pub fn with_repo_alias(mut self, alias: Option<String>) -> Self {
        self.repo_alias = non_empty(alias);
        self
    }

    pub fn gerrit_url(&self) -> &str {
        &self.gerrit_url
    }

    pub fn auth(&self) -> &Auth {
        &self.auth
    }

    pub fn auth_method(&self) -> AuthMethod {
        self.auth.method()
    }

    pub fn branch_transform(&self) -> bool {
        self.branch_transform
    }

    pub fn repo_alias(&self) -> Option<&str> {
        self.repo_alias.as_deref()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
