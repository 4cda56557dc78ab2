#![allow(dead_code)]

use std::cell::RefCell;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use git2::{Oid, Repository, Signature};

use relay_core::error::{RelayError, Result};
use relay_core::manifest::{ManifestSource, Project};
use relay_core::delivery::ProjectPusher;

pub const SAMPLE_MANIFEST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<manifest>
  <remote name="default" fetch="https://e/"/>
  <default revision="main" remote="default"/>
  <project name="platform/build" path="build" revision="main"/>
  <project name="platform/system/core" path="system/core" revision="a1b2c3d"/>
  <project name="platform/apps/S" path="apps/S"/>
</manifest>
"#;

/// Commit `content` to `file` on HEAD.
pub fn commit_file(repo: &Repository, file: &str, content: &str, message: &str) -> Oid {
    let workdir = repo.workdir().unwrap();
    std::fs::write(workdir.join(file), content).unwrap();
    let mut index = repo.index().unwrap();
    index.add_path(Path::new(file)).unwrap();
    index.write().unwrap();
    let tree_id = index.write_tree().unwrap();
    let tree = repo.find_tree(tree_id).unwrap();
    let sig = Signature::now("relay", "relay@example.com").unwrap();

    let parents: Vec<git2::Commit<'_>> = match repo.head() {
        Ok(head) => vec![head.peel_to_commit().unwrap()],
        Err(_) => Vec::new(),
    };
    let parent_refs: Vec<&git2::Commit<'_>> = parents.iter().collect();
    repo.commit(Some("HEAD"), &sig, &sig, message, &tree, &parent_refs)
        .unwrap()
}

/// Create a checkout at `path` with one commit and a local branch `branch`.
pub fn init_checkout(path: &Path, branch: &str) -> (Repository, Oid) {
    std::fs::create_dir_all(path).unwrap();
    let repo = Repository::init(path).unwrap();
    let oid = commit_file(&repo, "README", path.display().to_string().as_str(), "initial");
    {
        let commit = repo.find_commit(oid).unwrap();
        if repo.find_branch(branch, git2::BranchType::Local).is_err() {
            repo.branch(branch, &commit, false).unwrap();
        }
    }
    (repo, oid)
}

/// `file://` URL of a local directory.
pub fn file_url(path: &Path) -> String {
    format!("file://{}", path.display())
}

/// Manifest source serving fixed content from a scratch directory.
pub struct StaticManifest {
    dir: PathBuf,
    content: String,
    fail_download: bool,
    fail_cleanup: bool,
    pub cleanups: Rc<RefCell<usize>>,
}

impl StaticManifest {
    pub fn new(dir: &Path, content: &str) -> Self {
        Self {
            dir: dir.to_path_buf(),
            content: content.to_string(),
            fail_download: false,
            fail_cleanup: false,
            cleanups: Rc::new(RefCell::new(0)),
        }
    }

    pub fn failing_download(mut self) -> Self {
        self.fail_download = true;
        self
    }

    pub fn failing_cleanup(mut self) -> Self {
        self.fail_cleanup = true;
        self
    }
}

impl ManifestSource for StaticManifest {
    fn download(&mut self) -> Result<PathBuf> {
        if self.fail_download {
            return Err(RelayError::ToolInvocation {
                tool: "repo init".to_string(),
                message: "fatal: manifest not found".to_string(),
            });
        }
        let path = self.dir.join("default.xml");
        std::fs::write(&path, &self.content)?;
        Ok(path)
    }

    fn cleanup(&mut self) -> Result<()> {
        *self.cleanups.borrow_mut() += 1;
        if self.fail_cleanup {
            return Err(RelayError::Io(std::io::Error::other("busy")));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushCall {
    pub name: String,
    pub path: PathBuf,
    pub dry_run: bool,
}

/// Pusher that records calls and fails for selected project names.
#[derive(Default)]
pub struct RecordingPusher {
    pub calls: Rc<RefCell<Vec<PushCall>>>,
    failing: HashSet<String>,
}

impl RecordingPusher {
    pub fn failing_for(mut self, name: &str) -> Self {
        self.failing.insert(name.to_string());
        self
    }
}

impl ProjectPusher for RecordingPusher {
    fn push(&self, project: &Project, local_path: &Path, dry_run: bool) -> bool {
        self.calls.borrow_mut().push(PushCall {
            name: project.name.clone(),
            path: local_path.to_path_buf(),
            dry_run,
        });
        !self.failing.contains(&project.name)
    }
}
