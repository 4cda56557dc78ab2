//! Manifest download via `repo init`.

use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;
use tracing::{debug, info};

use crate::config::ManifestConfig;
use crate::error::{RelayError, Result};

const REPO_TOOL: &str = "repo";
const REPO_INSTALL_HINT: &str =
    "Please install repo tool: https://source.android.com/setup/develop#installing-repo";

/// Acquires a manifest document on disk and releases whatever it used.
pub trait ManifestSource {
    /// Fetch the manifest and return the path of the document.
    fn download(&mut self) -> Result<PathBuf>;

    /// Remove temporary state created by `download`.
    fn cleanup(&mut self) -> Result<()>;
}

#[derive(Debug)]
enum WorkDir {
    Provided(PathBuf),
    Temporary(TempDir),
}

impl WorkDir {
    fn path(&self) -> &Path {
        match self {
            Self::Provided(path) => path,
            Self::Temporary(temp) => temp.path(),
        }
    }
}

/// Downloads manifests with the `repo` tool.
#[derive(Debug)]
pub struct RepoManifestDownloader {
    config: ManifestConfig,
    work_dir: Option<WorkDir>,
}

impl RepoManifestDownloader {
    /// Create a downloader.
    ///
    /// Without a work directory, a temporary one is created on download and
    /// removed on cleanup. A provided work directory is never removed.
    pub fn new(config: ManifestConfig, work_dir: Option<PathBuf>) -> Self {
        Self {
            config,
            work_dir: work_dir.map(WorkDir::Provided),
        }
    }

    pub fn work_dir(&self) -> Option<&Path> {
        self.work_dir.as_ref().map(WorkDir::path)
    }

    /// Arguments passed to `repo`.
    pub fn init_args(&self) -> Vec<String> {
        let mut args = vec![
            "init".to_string(),
            "-u".to_string(),
            self.config.repo_url().to_string(),
            "--no-clone-bundle".to_string(),
        ];
        if let Some(branch) = self.config.branch() {
            args.push("-b".to_string());
            args.push(branch.to_string());
        } else if let Some(tag) = self.config.tag() {
            args.push("-b".to_string());
            args.push(format!("refs/tags/{}", tag));
        }
        args
    }

    fn ensure_work_dir(&mut self) -> Result<PathBuf> {
        let work_dir = match self.work_dir.take() {
            Some(work_dir) => work_dir,
            None => WorkDir::Temporary(
                tempfile::Builder::new()
                    .prefix("manifest_")
                    .tempdir()
                    .map_err(|e| RelayError::manifest_read(std::env::temp_dir(), e))?,
            ),
        };
        let path = work_dir.path().to_path_buf();
        self.work_dir = Some(work_dir);
        std::fs::create_dir_all(&path).map_err(|e| RelayError::manifest_read(&path, e))?;
        Ok(path)
    }

    fn run_repo_init(&self, cwd: &Path) -> Result<()> {
        let args = self.init_args();
        debug!("Running {} {:?} in {}", REPO_TOOL, args, cwd.display());
        let output = Command::new(REPO_TOOL)
            .args(&args)
            .current_dir(cwd)
            .output()
            .map_err(|e| RelayError::ToolInvocation {
                tool: REPO_TOOL.to_string(),
                message: if e.kind() == std::io::ErrorKind::NotFound {
                    format!("command not found. {}", REPO_INSTALL_HINT)
                } else {
                    e.to_string()
                },
            })?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RelayError::ToolInvocation {
                tool: format!("{} init", REPO_TOOL),
                message: stderr.trim().to_string(),
            });
        }
        Ok(())
    }
}

impl ManifestSource for RepoManifestDownloader {
    fn download(&mut self) -> Result<PathBuf> {
        let work_dir = self.ensure_work_dir()?;
        self.run_repo_init(&work_dir)?;
        let manifest = locate_manifest(&work_dir.join(".repo").join("manifests"))?;
        info!("Manifest downloaded to {}", manifest.display());
        Ok(manifest)
    }

    fn cleanup(&mut self) -> Result<()> {
        match self.work_dir.take() {
            Some(WorkDir::Temporary(temp)) => {
                debug!("Removing {}", temp.path().display());
                temp.close()?;
            }
            Some(provided) => self.work_dir = Some(provided),
            None => {}
        }
        Ok(())
    }
}

/// Find the manifest document in a `.repo/manifests` checkout.
///
/// Prefers `default.xml`, then the first `*.xml` by file name.
pub fn locate_manifest(manifest_dir: &Path) -> Result<PathBuf> {
    let default_xml = manifest_dir.join("default.xml");
    if default_xml.is_file() {
        return Ok(default_xml);
    }
    if !manifest_dir.is_dir() {
        return Err(RelayError::not_found(manifest_dir));
    }

    let read_error = |e: std::io::Error| RelayError::manifest_read(manifest_dir, e);
    let mut candidates = Vec::new();
    for entry in std::fs::read_dir(manifest_dir).map_err(read_error)? {
        let path = entry.map_err(read_error)?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "xml") {
            candidates.push(path);
        }
    }
    candidates.sort();
    candidates
        .into_iter()
        .next()
        .ok_or_else(|| RelayError::not_found(manifest_dir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(branch: Option<&str>, tag: Option<&str>) -> ManifestConfig {
        ManifestConfig::new(
            "https://example.com/manifest",
            branch.map(str::to_string),
            tag.map(str::to_string),
            None,
        )
        .unwrap()
    }

    #[test]
    fn init_args_with_branch() {
        let downloader = RepoManifestDownloader::new(config(Some("main"), None), None);
        assert_eq!(
            downloader.init_args(),
            vec![
                "init",
                "-u",
                "https://example.com/manifest",
                "--no-clone-bundle",
                "-b",
                "main"
            ]
        );
    }

    #[test]
    fn init_args_with_tag() {
        let downloader = RepoManifestDownloader::new(config(None, Some("v1.0")), None);
        let args = downloader.init_args();
        assert_eq!(args[args.len() - 2..], ["-b", "refs/tags/v1.0"]);
    }

    #[test]
    fn init_args_without_revision() {
        let downloader = RepoManifestDownloader::new(config(None, None), None);
        assert_eq!(downloader.init_args().len(), 4);
    }

    #[test]
    fn locate_prefers_default_xml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("a.xml"), "<manifest/>").unwrap();
        std::fs::write(temp.path().join("default.xml"), "<manifest/>").unwrap();
        assert_eq!(
            locate_manifest(temp.path()).unwrap(),
            temp.path().join("default.xml")
        );
    }

    #[test]
    fn locate_falls_back_to_first_xml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join("b.xml"), "<manifest/>").unwrap();
        std::fs::write(temp.path().join("a.xml"), "<manifest/>").unwrap();
        std::fs::write(temp.path().join("README"), "").unwrap();
        assert_eq!(
            locate_manifest(temp.path()).unwrap(),
            temp.path().join("a.xml")
        );
    }

    #[test]
    fn locate_without_xml_is_not_found() {
        let temp = TempDir::new().unwrap();
        let err = locate_manifest(temp.path()).unwrap_err();
        assert!(matches!(err, RelayError::NotFound { .. }));
    }

    #[test]
    fn unusable_work_dir_is_a_fatal_read_error() {
        let temp = TempDir::new().unwrap();
        let blocker = temp.path().join("occupied");
        std::fs::write(&blocker, "not a directory").unwrap();
        let mut downloader =
            RepoManifestDownloader::new(config(None, None), Some(blocker.join("work")));

        let err = downloader.ensure_work_dir().unwrap_err();
        assert!(matches!(err, RelayError::ManifestRead { .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn cleanup_keeps_provided_work_dir() {
        let temp = TempDir::new().unwrap();
        let mut downloader =
            RepoManifestDownloader::new(config(None, None), Some(temp.path().to_path_buf()));
        downloader.cleanup().unwrap();
        assert!(temp.path().exists());
        assert_eq!(downloader.work_dir(), Some(temp.path()));
    }

    #[test]
    fn cleanup_removes_temporary_work_dir() {
        let mut downloader = RepoManifestDownloader::new(config(None, None), None);
        let work_dir = downloader.ensure_work_dir().unwrap();
        assert!(work_dir.exists());
        downloader.cleanup().unwrap();
        assert!(!work_dir.exists());
        assert_eq!(downloader.work_dir(), None);
    }
}
