//! Configuration loading
//!
//! relay.toml carries two sections:
//! - `[manifest]`: where the manifest comes from
//! - `[delivery]`: the Gerrit target, authentication and name transforms

pub mod parser;
pub mod schema;
pub mod settings;

pub use parser::{RelayConfig, load_config, load_config_with_env, parse_config_str};
pub use schema::{AuthSection, DeliverySection, ManifestSection, RelayConfigFile};
pub use settings::{Auth, AuthMethod, DeliveryConfig, ManifestConfig};

/// Environment variable consulted when no username is configured
pub const USERNAME_ENV: &str = "GERRIT_USERNAME";
/// Environment variable consulted when no password is configured
pub const PASSWORD_ENV: &str = "GERRIT_PASSWORD";
/// SSH user for destination URLs that carry none
pub const DEFAULT_SSH_USER: &str = "git";
