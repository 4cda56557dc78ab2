//! Delivery workflow: download, parse, filter, push.

use std::collections::HashMap;
use std::path::PathBuf;

use tracing::{error, info, warn};

use super::pusher::{GerritPusher, ProjectPusher};
use super::result::DeliveryResult;
use crate::config::{DeliveryConfig, ManifestConfig};
use crate::error::Result;
use crate::manifest::{
    ManifestParser, ManifestSource, ParseOptions, Project, RepoManifestDownloader,
    filter_projects,
};

/// Runs one delivery from manifest to Gerrit, one project at a time.
pub struct DeliveryOrchestrator {
    source: Box<dyn ManifestSource>,
    pusher: Box<dyn ProjectPusher>,
    work_dir: Option<PathBuf>,
    parse_options: ParseOptions,
}

impl DeliveryOrchestrator {
    /// Create an orchestrator that downloads with `repo` and pushes with git.
    pub fn new(
        manifest_config: ManifestConfig,
        delivery_config: DeliveryConfig,
        work_dir: Option<PathBuf>,
    ) -> Self {
        let parse_options = ParseOptions {
            default_revision_override: manifest_config.default_revision().map(str::to_string),
            ..ParseOptions::default()
        };
        let source = RepoManifestDownloader::new(manifest_config, work_dir.clone());
        let pusher = GerritPusher::new(delivery_config);
        Self::with_collaborators(Box::new(source), Box::new(pusher), work_dir)
            .with_parse_options(parse_options)
    }

    /// Create an orchestrator from explicit collaborators.
    pub fn with_collaborators(
        source: Box<dyn ManifestSource>,
        pusher: Box<dyn ProjectPusher>,
        work_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            source,
            pusher,
            work_dir,
            parse_options: ParseOptions::default(),
        }
    }

    pub fn with_parse_options(mut self, parse_options: ParseOptions) -> Self {
        self.parse_options = parse_options;
        self
    }

    /// Execute the workflow.
    ///
    /// Download and parse failures abort the run. Per-project failures and
    /// skips are recorded in the returned result and never stop the loop.
    pub fn execute(
        &mut self,
        project_paths: Option<&HashMap<String, PathBuf>>,
        dry_run: bool,
    ) -> Result<DeliveryResult> {
        info!("Starting delivery workflow");

        let all_projects = match self.acquire_projects() {
            Ok(projects) => projects,
            Err(err) => {
                error!("Failed to acquire manifest: {}", err);
                self.cleanup();
                return Err(err);
            }
        };

        let eligible = filter_projects(&all_projects);
        info!(
            "Filtered to {} of {} projects with branch/tag revisions",
            eligible.len(),
            all_projects.len()
        );

        let mut result = DeliveryResult::new(all_projects.len(), eligible.len());
        for project in &eligible {
            let Some(local_path) = self.local_path(project, project_paths) else {
                warn!("No path specified for project {}, skipping", project.name);
                result.record_skip(&project.name);
                continue;
            };

            if !local_path.exists() {
                warn!(
                    "Project path does not exist: {}, skipping",
                    local_path.display()
                );
                result.record_skip(&project.name);
                continue;
            }

            if self.pusher.push(project, &local_path, dry_run) {
                result.record_success();
            } else {
                result.record_failure(&project.name);
            }
        }

        self.cleanup();

        info!(
            "Delivery completed: {} successful, {} failed, {} skipped",
            result.successful, result.failed, result.skipped
        );
        Ok(result)
    }

    fn acquire_projects(&mut self) -> Result<Vec<Project>> {
        info!("Downloading manifest...");
        let manifest_path = self.source.download()?;

        info!("Parsing manifest {}", manifest_path.display());
        let projects = ManifestParser::new(manifest_path)?
            .with_default_remote_name(self.parse_options.default_remote_name.clone())
            .with_default_revision(self.parse_options.default_revision_override.clone())
            .parse()?;
        info!("Parsed {} projects from manifest", projects.len());
        Ok(projects)
    }

    /// Per-project override first, then `<work_dir>/<project.path>`.
    fn local_path(
        &self,
        project: &Project,
        project_paths: Option<&HashMap<String, PathBuf>>,
    ) -> Option<PathBuf> {
        project_paths
            .and_then(|paths| paths.get(&project.name).cloned())
            .or_else(|| self.work_dir.as_ref().map(|dir| dir.join(&project.path)))
    }

    fn cleanup(&mut self) {
        if let Err(err) = self.source.cleanup() {
            warn!("Failed to cleanup: {}", err);
        }
    }
}
