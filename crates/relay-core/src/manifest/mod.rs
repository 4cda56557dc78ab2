//! Manifest acquisition, parsing and project selection.
//!
//! - Downloading a manifest with the `repo` tool
//! - Parsing the manifest XML into projects
//! - Selecting the projects pinned to a branch or tag

mod downloader;
mod filter;
mod model;
mod parser;
mod revision;

pub use downloader::{ManifestSource, RepoManifestDownloader, locate_manifest};
pub use filter::{filter_projects, is_deliverable};
pub use model::Project;
pub use parser::{
    DEFAULT_REMOTE_NAME, ManifestParser, ParseOptions, default_revision_str, parse_manifest_str,
    parse_manifest_str_with,
};
pub use revision::is_hash_revision;
