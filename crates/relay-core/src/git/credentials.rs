//! Credential injection for pushes.

use git2::{Cred, CredentialType, RemoteCallbacks};
use tracing::debug;

use crate::config::{Auth, DEFAULT_SSH_USER};

/// libgit2 asks again after every rejected credential; stop after a few.
const MAX_CREDENTIAL_ATTEMPTS: usize = 3;

/// Build remote callbacks answering credential requests from `auth`.
pub fn credential_callbacks(auth: &Auth) -> RemoteCallbacks<'_> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0;
    callbacks.credentials(move |url, username_from_url, allowed| {
        attempts += 1;
        if attempts > MAX_CREDENTIAL_ATTEMPTS {
            return Err(git2::Error::from_str(&format!(
                "authentication failed after {} attempts",
                MAX_CREDENTIAL_ATTEMPTS
            )));
        }
        debug!("Credentials requested for {} ({:?})", redact(url), allowed);

        match auth {
            Auth::Ssh { key_path, username } => {
                let user = username_from_url
                    .or(username.as_deref())
                    .unwrap_or(DEFAULT_SSH_USER);
                if allowed.contains(CredentialType::USERNAME) {
                    return Cred::username(user);
                }
                if key_path.is_file() {
                    Cred::ssh_key(user, None, key_path, None)
                } else {
                    Cred::ssh_key_from_agent(user)
                }
            }
            Auth::Http { username, password } => match password {
                Some(password) => Cred::userpass_plaintext(username, password),
                None => Err(git2::Error::from_str(
                    "server requested credentials but no password is configured",
                )),
            },
        }
    });
    callbacks
}

fn redact(url: &str) -> String {
    crate::delivery::redact_url(url)
}
