//! Revision filter for manifest projects.

use super::model::Project;
use super::revision::is_hash_revision;

/// Keep only projects pinned to a branch or tag, preserving order.
///
/// Projects without a revision and projects pinned to a commit hash are
/// dropped.
pub fn filter_projects(projects: &[Project]) -> Vec<Project> {
    projects
        .iter()
        .filter(|project| is_deliverable(project))
        .cloned()
        .collect()
}

pub fn is_deliverable(project: &Project) -> bool {
    project
        .revision()
        .is_some_and(|revision| !is_hash_revision(revision))
}
