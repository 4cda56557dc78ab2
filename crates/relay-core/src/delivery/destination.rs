//! Destination URL composition and redaction.

use url::Url;

use crate::config::{Auth, DEFAULT_SSH_USER};
use crate::error::{RelayError, Result};

const REDACTED: &str = "***";

/// Compose the push URL for `repo_path` under `gerrit_url`.
///
/// SSH URLs keep any user-info already present in the base URL, otherwise
/// the configured user (or `git`) is used. HTTP URLs embed username and
/// password when both are configured; the result is then a secret and must
/// only be logged through [`redact_url`].
pub fn compose_destination_url(gerrit_url: &str, repo_path: &str, auth: &Auth) -> Result<String> {
    let base = gerrit_url.trim_end_matches('/');
    match auth {
        Auth::Ssh { username, .. } => {
            if base.contains('@') {
                return Ok(format!("{}/{}", base, repo_path));
            }
            let user = username.as_deref().unwrap_or(DEFAULT_SSH_USER);
            Ok(format!("ssh://{}@{}/{}", user, strip_scheme(base), repo_path))
        }
        Auth::Http { username, password } => {
            let plain = format!("{}/{}", base, repo_path);
            match password {
                Some(password) => embed_credentials(&plain, username, password),
                None => Ok(plain),
            }
        }
    }
}

fn strip_scheme(base: &str) -> &str {
    ["ssh://", "http://", "https://"]
        .iter()
        .find_map(|scheme| base.strip_prefix(scheme))
        .unwrap_or(base)
}

fn embed_credentials(plain: &str, username: &str, password: &str) -> Result<String> {
    let invalid = |message: &str| RelayError::InvalidUrl {
        url: plain.to_string(),
        message: message.to_string(),
    };
    let mut url = Url::parse(plain).map_err(|e| invalid(&e.to_string()))?;
    url.set_username(username)
        .map_err(|_| invalid("URL cannot carry a username"))?;
    url.set_password(Some(password))
        .map_err(|_| invalid("URL cannot carry a password"))?;
    Ok(url.into())
}

/// Replace any password in `url` with `***`.
pub fn redact_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(Some(REDACTED)).is_ok() {
                parsed.into()
            } else {
                REDACTED.to_string()
            }
        }
        _ => url.to_string(),
    }
}

/// Remove any password from `url`, keeping the username.
pub fn strip_password(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) if parsed.password().is_some() => {
            if parsed.set_password(None).is_ok() {
                parsed.into()
            } else {
                url.to_string()
            }
        }
        _ => url.to_string(),
    }
}
