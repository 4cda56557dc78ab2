//! Local checkout operations used by the push step.

use std::path::{Path, PathBuf};

use git2::{BranchType, Commit, PushOptions, RemoteCallbacks, Repository};
use tracing::debug;

use super::credentials::credential_callbacks;
use crate::config::Auth;
use crate::error::{RelayError, Result};

/// A git working copy of one manifest project.
pub struct LocalCheckout {
    repo: Repository,
    path: PathBuf,
}

impl LocalCheckout {
    /// Open the repository at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RelayError::not_found(path));
        }
        let repo = Repository::open(path)?;
        Ok(Self {
            repo,
            path: path.to_path_buf(),
        })
    }

    pub fn has_local_branch(&self, name: &str) -> bool {
        self.repo.find_branch(name, BranchType::Local).is_ok()
    }

    /// Resolve a revision to a commit.
    ///
    /// Tries the revision as given, then remote-tracking references named
    /// `refs/remotes/<remote>/<revision>`.
    pub fn resolve_commit(&self, revision: &str) -> Result<Commit<'_>> {
        if let Ok(object) = self.repo.revparse_single(revision)
            && let Ok(commit) = object.peel_to_commit()
        {
            return Ok(commit);
        }

        let mut candidates = Vec::new();
        for reference in self
            .repo
            .references_glob(&format!("refs/remotes/*/{}", revision))?
        {
            let reference = reference?;
            if let Some(name) = reference.name() {
                candidates.push(name.to_string());
            }
        }
        candidates.sort();
        for name in candidates {
            if let Ok(commit) = self.repo.find_reference(&name)?.peel_to_commit() {
                debug!("Resolved {} via {}", revision, name);
                return Ok(commit);
            }
        }

        Err(RelayError::UnresolvedRevision {
            revision: revision.to_string(),
            path: self.path.clone(),
        })
    }

    /// Return the local branch `branch`, creating it at `revision` if needed.
    pub fn ensure_branch(&self, branch: &str, revision: &str) -> Result<String> {
        if self.has_local_branch(branch) {
            debug!("Using existing branch {} in {}", branch, self.path.display());
            return Ok(branch.to_string());
        }
        let commit = self.resolve_commit(revision)?;
        self.repo.branch(branch, &commit, false)?;
        debug!(
            "Created branch {} at {} in {}",
            branch,
            commit.id(),
            self.path.display()
        );
        Ok(branch.to_string())
    }

    /// Point the remote `name` at `url`, replacing any previous definition.
    pub fn configure_remote(&self, name: &str, url: &str) -> Result<()> {
        if self.repo.find_remote(name).is_ok() {
            self.repo.remote_delete(name)?;
        }
        self.repo.remote(name, url)?;
        Ok(())
    }

    pub fn remote_url(&self, name: &str) -> Option<String> {
        self.repo
            .find_remote(name)
            .ok()
            .and_then(|remote| remote.url().map(str::to_string))
    }

    /// Push `refspec` to the remote `remote_name` without forcing.
    ///
    /// Transport errors and server-side reference rejections are both errors.
    pub fn push(&self, remote_name: &str, refspec: &str, auth: Option<&Auth>) -> Result<()> {
        if refspec.starts_with('+') {
            return Err(RelayError::PushRejected {
                refname: refspec.trim_start_matches('+').to_string(),
                message: "forced pushes are not allowed".to_string(),
            });
        }

        let mut remote = self.repo.find_remote(remote_name)?;
        let mut rejections: Vec<(String, String)> = Vec::new();
        {
            let mut callbacks = match auth {
                Some(auth) => credential_callbacks(auth),
                None => RemoteCallbacks::new(),
            };
            callbacks.push_update_reference(|refname, status| {
                if let Some(message) = status {
                    rejections.push((refname.to_string(), message.to_string()));
                }
                Ok(())
            });
            let mut options = PushOptions::new();
            options.remote_callbacks(callbacks);
            remote.push(&[refspec], Some(&mut options))?;
        }

        match rejections.into_iter().next() {
            Some((refname, message)) => Err(RelayError::PushRejected { refname, message }),
            None => Ok(()),
        }
    }
}
