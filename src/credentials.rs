//! Credential storage for the global personal access token.
//!
//! The token lives in the OS keychain. The settings core never inspects it beyond
//! asking whether one exists; format and live checks are delegated here.

use git2::{Cred, CredentialType, Direction, Remote, RemoteCallbacks};

use crate::error::{Result, SettingsError};

const SERVICE: &str = "rulem";
const ACCOUNT: &str = "github-pat";
const TOKEN_PREFIXES: [&str; 6] = ["ghp_", "gho_", "ghu_", "ghs_", "ghr_", "github_pat_"];
const MIN_TOKEN_LEN: usize = 20;

pub trait CredentialStore: Send + Sync {
    /// The stored secret, or `None` when nothing is stored yet.
    fn get(&self) -> Result<Option<String>>;

    fn store(&self, secret: &str) -> Result<()>;

    fn validate_format(&self, secret: &str) -> Result<()>;

    /// Authenticates against `url` with `secret` without changing anything remotely.
    fn validate_against_remote(&self, secret: &str, url: &str) -> Result<()>;

    fn validate_against_remotes(&self, secret: &str, urls: &[String]) -> Result<()> {
        for url in urls {
            self.validate_against_remote(secret, url)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct KeyringCredentialStore {
    service: String,
    account: String,
}

impl Default for KeyringCredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyringCredentialStore {
    pub fn new() -> Self {
        Self {
            service: SERVICE.into(),
            account: ACCOUNT.into(),
        }
    }

    fn entry(&self) -> Result<keyring::Entry> {
        keyring::Entry::new(&self.service, &self.account)
            .map_err(|e| SettingsError::collaborator("open credential store", e))
    }
}

impl CredentialStore for KeyringCredentialStore {
    fn get(&self) -> Result<Option<String>> {
        match self.entry()?.get_password() {
            Ok(secret) if secret.is_empty() => Ok(None),
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(SettingsError::collaborator("read credential", e)),
        }
    }

    fn store(&self, secret: &str) -> Result<()> {
        self.entry()?
            .set_password(secret)
            .map_err(|e| SettingsError::collaborator("store credential", e))?;
        tracing::info!("stored personal access token");
        Ok(())
    }

    fn validate_format(&self, secret: &str) -> Result<()> {
        check_token_format(secret)
    }

    fn validate_against_remote(&self, secret: &str, url: &str) -> Result<()> {
        if url.starts_with("git@") {
            tracing::debug!(%url, "ssh remote, token not used");
            return Ok(());
        }
        let mut remote = Remote::create_detached(url)
            .map_err(|e| SettingsError::collaborator("validate token", e))?;
        let callbacks = token_callbacks(Some(secret.to_string()));
        let connection = remote
            .connect_auth(Direction::Fetch, Some(callbacks), None)
            .map_err(|e| SettingsError::collaborator("validate token", e))?;
        drop(connection);
        tracing::debug!(%url, "token accepted by remote");
        Ok(())
    }
}

/// GitHub-style token: known prefix, `[A-Za-z0-9_]` only, minimum length.
pub fn check_token_format(secret: &str) -> Result<()> {
    if !TOKEN_PREFIXES.iter().any(|p| secret.starts_with(p)) {
        return Err(SettingsError::validation(
            "token must start with ghp_, gho_, ghu_, ghs_, ghr_ or github_pat_",
        ));
    }
    if secret.len() < MIN_TOKEN_LEN {
        return Err(SettingsError::validation(format!(
            "token is too short (at least {} characters)",
            MIN_TOKEN_LEN
        )));
    }
    if !secret.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(SettingsError::validation(
            "token may only contain letters, digits and '_'",
        ));
    }
    Ok(())
}

/// Credential callback chain: token for HTTPS, then SSH agent, then git defaults.
pub(crate) fn token_callbacks<'a>(token: Option<String>) -> RemoteCallbacks<'a> {
    let mut callbacks = RemoteCallbacks::new();
    let mut attempts = 0u8;
    callbacks.credentials(move |_url, username_from_url, allowed_types| {
        attempts += 1;
        if attempts > 3 {
            return Err(git2::Error::from_str("authentication failed"));
        }
        if allowed_types.contains(CredentialType::USER_PASS_PLAINTEXT) {
            if let Some(token) = token.as_deref() {
                return Cred::userpass_plaintext("x-access-token", token);
            }
        }
        if allowed_types.contains(CredentialType::SSH_KEY) {
            if let Some(username) = username_from_url {
                if let Ok(cred) = Cred::ssh_key_from_agent(username) {
                    return Ok(cred);
                }
            }
        }
        Cred::default()
    });
    callbacks
}
