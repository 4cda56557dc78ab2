//! Push step: deliver one project to Gerrit.

use std::path::Path;

use serde::Serialize;
use tracing::{error, info, warn};

use super::destination::{compose_destination_url, redact_url, strip_password};
use crate::config::DeliveryConfig;
use crate::error::{RelayError, Result};
use crate::git::LocalCheckout;
use crate::manifest::Project;
use crate::transform::{BranchTransformer, RepoTransformer};

/// Name of the remote reconfigured for every push.
pub const PUSH_REMOTE_NAME: &str = "gerrit";

/// Pushes a single project and reports whether it succeeded.
pub trait ProjectPusher {
    /// Never fails past its own boundary; errors are logged and reported
    /// as `false`.
    fn push(&self, project: &Project, local_path: &Path, dry_run: bool) -> bool;
}

/// What a push did (or would do, for a dry run).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PushOutcome {
    /// Local branch that was pushed
    pub local_branch: String,
    /// Destination branch name
    pub branch: String,
    /// Destination URL with any password redacted
    pub destination: String,
    pub refspec: String,
    /// False when the network push was skipped
    pub pushed: bool,
}

/// Pushes projects to Gerrit through a local checkout.
#[derive(Debug, Clone)]
pub struct GerritPusher {
    config: DeliveryConfig,
    branch_transformer: BranchTransformer,
    repo_transformer: RepoTransformer,
    remote_name: String,
}

impl GerritPusher {
    /// Create a pusher with transformers derived from `config`.
    pub fn new(config: DeliveryConfig) -> Self {
        let branch_transformer = BranchTransformer::new(config.branch_transform());
        let repo_transformer = RepoTransformer::new(config.repo_alias().map(str::to_string));
        Self::with_transformers(config, branch_transformer, repo_transformer)
    }

    pub fn with_transformers(
        config: DeliveryConfig,
        branch_transformer: BranchTransformer,
        repo_transformer: RepoTransformer,
    ) -> Self {
        Self {
            config,
            branch_transformer,
            repo_transformer,
            remote_name: PUSH_REMOTE_NAME.to_string(),
        }
    }

    /// Full destination URL of a project, credentials included.
    pub fn destination_url(&self, project_name: &str) -> Result<String> {
        let repo_path = self.repo_transformer.transform(project_name);
        compose_destination_url(self.config.gerrit_url(), &repo_path, self.config.auth())
    }

    /// Run the push step and report what happened.
    pub fn try_push(
        &self,
        project: &Project,
        local_path: &Path,
        dry_run: bool,
    ) -> Result<PushOutcome> {
        if !local_path.exists() {
            return Err(RelayError::not_found(local_path));
        }
        let revision = project.revision().ok_or_else(|| {
            RelayError::InvalidProject(format!("Project {} has no revision", project.name))
        })?;

        let branch = self.branch_transformer.transform(revision);
        let checkout = LocalCheckout::open(local_path)?;
        let local_branch = checkout.ensure_branch(&branch, revision)?;

        let url = self.destination_url(&project.name)?;
        let destination = redact_url(&url);
        checkout.configure_remote(&self.remote_name, &strip_password(&url))?;

        let refspec = format!("refs/heads/{}:refs/heads/{}", local_branch, branch);
        let mut outcome = PushOutcome {
            local_branch,
            branch,
            destination,
            refspec,
            pushed: false,
        };

        if dry_run {
            info!(
                "[DRY RUN] Would push {} branch {} to {}",
                project.name, outcome.branch, outcome.destination
            );
            return Ok(outcome);
        }

        info!(
            "Pushing {} branch {} to {}",
            project.name, outcome.branch, outcome.destination
        );
        checkout.push(&self.remote_name, &outcome.refspec, Some(self.config.auth()))?;
        outcome.pushed = true;
        Ok(outcome)
    }
}

impl ProjectPusher for GerritPusher {
    fn push(&self, project: &Project, local_path: &Path, dry_run: bool) -> bool {
        match self.try_push(project, local_path, dry_run) {
            Ok(outcome) => {
                if outcome.pushed {
                    info!("Successfully pushed {}", project.name);
                }
                true
            }
            Err(err @ RelayError::InvalidProject(_)) => {
                warn!(project = %project.name, "{}, skipping", err);
                false
            }
            Err(err) => {
                error!(
                    project = %project.name,
                    path = %local_path.display(),
                    "Failed to push {}: {}",
                    project.name,
                    err
                );
                false
            }
        }
    }
}
