//! TOML parser with helpful error messages

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::schema::RelayConfigFile;
use super::settings::{DeliveryConfig, ManifestConfig};
use super::{PASSWORD_ENV, USERNAME_ENV};
use crate::error::RelayError;

/// Fully validated configuration.
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub manifest: ManifestConfig,
    pub delivery: DeliveryConfig,
}

/// Load relay.toml, reading credential fallbacks from the process environment.
pub fn load_config(path: &Path) -> Result<RelayConfig> {
    load_config_with_env(path, |key| std::env::var(key).ok())
}

/// Load relay.toml with an explicit environment lookup.
pub fn load_config_with_env<F>(path: &Path, env: F) -> Result<RelayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if !path.is_file() {
        return Err(RelayError::not_found(path).into());
    }
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));

    parse_config_str(&content, base_dir, env)
        .with_context(|| format!("Failed to load config file: {}", path.display()))
}

/// Parse relay.toml content.
///
/// Relative `ssh_key_path` values are resolved against `base_dir`.
pub fn parse_config_str<F>(content: &str, base_dir: &Path, env: F) -> Result<RelayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    if content.trim().is_empty() {
        return Err(RelayError::config("Configuration file is empty").into());
    }
    let file: RelayConfigFile =
        toml::from_str(content).map_err(|e| enhance_toml_error(e, content))?;

    let manifest = ManifestConfig::new(
        file.manifest.repo_url,
        file.manifest.branch,
        file.manifest.tag,
        file.manifest.default_revision,
    )?;

    let auth = file.delivery.auth;
    let username = auth.username.or_else(|| env(USERNAME_ENV));
    let password = auth.password.or_else(|| env(PASSWORD_ENV));
    let ssh_key_path = auth
        .ssh_key_path
        .map(|key| resolve_key_path(&key, base_dir));

    let delivery = DeliveryConfig::new(
        file.delivery.gerrit_url,
        &auth.method,
        ssh_key_path,
        username,
        password,
    )?
    .with_branch_transform(file.delivery.branch_transform)
    .with_repo_alias(file.delivery.repo_alias);

    Ok(RelayConfig { manifest, delivery })
}

fn resolve_key_path(key: &Path, base_dir: &Path) -> PathBuf {
    if let Ok(rest) = key.strip_prefix("~")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }
    if key.is_absolute() {
        key.to_path_buf()
    } else {
        base_dir.join(key)
    }
}

/// Enhance TOML parsing errors with helpful context
fn enhance_toml_error(error: toml::de::Error, content: &str) -> anyhow::Error {
    let error_msg = error.message().to_string();

    let line_num = error
        .span()
        .map(|span| content[..span.start.min(content.len())].lines().count().max(1));

    match line_num {
        Some(line_num) => {
            let context = get_line_context(content, line_num);
            anyhow::anyhow!(
                "TOML parsing error at line {}:\n{}\n\nError: {}",
                line_num,
                context,
                error_msg
            )
        }
        None => anyhow::anyhow!("TOML parsing error: {}", error_msg),
    }
}

/// Get context lines around an error
fn get_line_context(content: &str, line_num: usize) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let start = line_num.saturating_sub(2);
    let end = (line_num + 2).min(lines.len());

    lines[start.min(end)..end]
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let num = start + i + 1;
            let marker = if num == line_num { ">>>" } else { "   " };
            format!("{} {:4} | {}", marker, num, line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AuthMethod;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SSH_CONFIG: &str = r#"
[manifest]
repo_url = "https://example.com/manifest"
branch = "main"

[delivery]
gerrit_url = "https://gerrit.example.com"
branch_transform = false

[delivery.auth]
method = "ssh"
ssh_key_path = "keys/id_rsa"
"#;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_parse_valid_config() {
        let config = parse_config_str(SSH_CONFIG, Path::new("/etc/relay"), no_env).unwrap();
        assert_eq!(config.manifest.repo_url(), "https://example.com/manifest");
        assert_eq!(config.manifest.branch(), Some("main"));
        assert_eq!(config.delivery.gerrit_url(), "https://gerrit.example.com");
        assert_eq!(config.delivery.auth_method(), AuthMethod::Ssh);
        assert!(!config.delivery.branch_transform());
        assert_eq!(config.delivery.repo_alias(), None);
    }

    #[test]
    fn test_relative_key_path_resolves_against_config_dir() {
        let config = parse_config_str(SSH_CONFIG, Path::new("/etc/relay"), no_env).unwrap();
        assert_eq!(
            config.delivery.auth().ssh_key_path(),
            Some(Path::new("/etc/relay/keys/id_rsa"))
        );
    }

    #[test]
    fn test_home_key_path_is_expanded() {
        let Some(home) = dirs::home_dir() else {
            return;
        };
        let toml = SSH_CONFIG.replace("keys/id_rsa", "~/.ssh/id_rsa");
        let config = parse_config_str(&toml, Path::new("/etc/relay"), no_env).unwrap();
        assert_eq!(
            config.delivery.auth().ssh_key_path(),
            Some(home.join(".ssh/id_rsa").as_path())
        );
    }

    #[test]
    fn test_credentials_fall_back_to_env() {
        let toml = r#"
[manifest]
repo_url = "https://example.com/manifest"

[delivery]
gerrit_url = "https://gerrit.example.com"
repo_alias = "vendor"

[delivery.auth]
method = "http"
"#;
        let env = |key: &str| match key {
            USERNAME_ENV => Some("testuser".to_string()),
            PASSWORD_ENV => Some("testpass".to_string()),
            _ => None,
        };
        let config = parse_config_str(toml, Path::new("."), env).unwrap();
        assert_eq!(config.delivery.auth().username(), Some("testuser"));
        assert_eq!(config.delivery.auth().password(), Some("testpass"));
        assert_eq!(config.delivery.repo_alias(), Some("vendor"));
    }

    #[test]
    fn test_file_credentials_win_over_env() {
        let toml = r#"
[manifest]
repo_url = "u"

[delivery]
gerrit_url = "https://g"

[delivery.auth]
method = "http"
username = "fromfile"
"#;
        let env = |_: &str| Some("fromenv".to_string());
        let config = parse_config_str(toml, Path::new("."), env).unwrap();
        assert_eq!(config.delivery.auth().username(), Some("fromfile"));
        assert_eq!(config.delivery.auth().password(), Some("fromenv"));
    }

    #[test]
    fn test_auth_method_defaults_to_ssh() {
        let toml = SSH_CONFIG.replace("method = \"ssh\"\n", "");
        let config = parse_config_str(&toml, Path::new("."), no_env).unwrap();
        assert_eq!(config.delivery.auth_method(), AuthMethod::Ssh);
    }

    #[test]
    fn test_branch_and_tag_conflict() {
        let toml = SSH_CONFIG.replace("branch = \"main\"", "branch = \"main\"\ntag = \"v1\"");
        let err = parse_config_str(&toml, Path::new("."), no_env).unwrap_err();
        assert!(format!("{:#}", err).contains("both branch and tag"));
    }

    #[test]
    fn test_empty_config_is_rejected() {
        let err = parse_config_str("  \n", Path::new("."), no_env).unwrap_err();
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn test_parse_invalid_toml() {
        let toml = "[manifest\nrepo_url = \"u\"\n";
        let err = parse_config_str(toml, Path::new("."), no_env).unwrap_err();
        assert!(err.to_string().contains("TOML parsing error"));
    }

    #[test]
    fn test_load_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SSH_CONFIG.as_bytes()).unwrap();
        let config = load_config_with_env(file.path(), no_env).unwrap();
        let expected = file.path().parent().unwrap().join("keys/id_rsa");
        assert_eq!(
            config.delivery.auth().ssh_key_path(),
            Some(expected.as_path())
        );
    }

    #[test]
    fn test_load_missing_file_is_not_found() {
        let err = load_config_with_env(Path::new("/nonexistent/relay.toml"), no_env).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RelayError>(),
            Some(RelayError::NotFound { .. })
        ));
    }
}
