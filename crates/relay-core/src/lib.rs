//! Relay Core Library
//!
//! Delivers the projects of a repo manifest from an upstream mirror to a
//! Gerrit server, renaming repositories and branches on the way.

pub mod config;
pub mod delivery;
pub mod error;
pub mod git;
pub mod manifest;
pub mod transform;

/// Re-exports of commonly used types
pub mod prelude {
    // Configuration
    pub use crate::config::{Auth, AuthMethod, DeliveryConfig, ManifestConfig, RelayConfig};

    // Manifest
    pub use crate::manifest::{
        ManifestParser, ManifestSource, Project, filter_projects, is_hash_revision,
    };

    // Transformers
    pub use crate::transform::{BranchTransformer, RepoTransformer};

    // Delivery
    pub use crate::delivery::{
        DeliveryOrchestrator, DeliveryResult, GerritPusher, ProjectPusher, PushOutcome,
    };

    // Errors
    pub use crate::error::{ErrorCategory, RelayError};
}
