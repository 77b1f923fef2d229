//! Synchronous input checks shared by the settings flows.
//!
//! Each function takes the raw widget value and returns the normalised value
//! to store in scratch, or a `SettingsError::Validation`.

use crate::credentials::CredentialStore;
use crate::data::Config;
use crate::error::{Result, SettingsError};
use crate::paths::{normalize, PathOps};

pub const MAX_NAME_LEN: usize = 100;

const BRANCH_FORBIDDEN: &[char] = &['~', '^', ':', ' ', '?', '*', '[', '\\', '\t'];

/// Trims, then checks non-empty, length and uniqueness. `exclude_id` is the entry being
/// renamed, whose own current name does not count as a duplicate.
pub fn validate_name(raw: &str, config: &Config, exclude_id: Option<&str>) -> Result<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(SettingsError::validation("repository name cannot be empty"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(SettingsError::validation(format!(
            "repository name must be {} characters or fewer",
            MAX_NAME_LEN
        )));
    }
    if config.name_taken(name, exclude_id) {
        return Err(SettingsError::validation(format!(
            "a repository named \"{}\" already exists",
            name
        )));
    }
    Ok(name.to_string())
}

/// Expands, normalises and validates a local or clone path; returns the normalised form.
pub fn validate_path(
    raw: &str,
    paths: &dyn PathOps,
    config: &Config,
    exclude_id: Option<&str>,
) -> Result<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(SettingsError::validation("path cannot be empty"));
    }
    let expanded = normalize(&paths.expand(raw));
    paths.validate_storage_path(&expanded)?;
    if config.path_taken(&expanded, exclude_id) {
        return Err(SettingsError::validation(format!(
            "another repository already uses {}",
            expanded
        )));
    }
    Ok(expanded)
}

pub fn validate_remote_url(raw: &str) -> Result<String> {
    let url = raw.trim();
    if url.is_empty() {
        return Err(SettingsError::validation("repository URL cannot be empty"));
    }
    if !(url.starts_with("http://") || url.starts_with("https://") || url.starts_with("git@")) {
        return Err(SettingsError::validation(
            "repository URL must start with http://, https:// or git@",
        ));
    }
    Ok(url.to_string())
}

/// Empty means "track the remote's default branch" and yields `None`.
pub fn validate_branch(raw: &str) -> Result<Option<String>> {
    let branch = raw.trim();
    if branch.is_empty() {
        return Ok(None);
    }
    let invalid = |why: &str| {
        Err(SettingsError::validation(format!(
            "invalid branch name \"{}\": {}",
            branch, why
        )))
    };
    if branch.starts_with('/') || branch.ends_with('/') {
        return invalid("cannot start or end with '/'");
    }
    if branch.contains("..") {
        return invalid("cannot contain '..'");
    }
    if branch.contains("//") {
        return invalid("cannot contain '//'");
    }
    if branch.starts_with('-') {
        return invalid("cannot start with '-'");
    }
    if branch.ends_with('.') || branch.ends_with(".lock") {
        return invalid("cannot end with '.' or '.lock'");
    }
    if branch.contains("@{") {
        return invalid("cannot contain '@{'");
    }
    if let Some(c) = branch
        .chars()
        .find(|c| BRANCH_FORBIDDEN.contains(c) || c.is_control())
    {
        return invalid(&format!("character {:?} is not allowed", c));
    }
    Ok(Some(branch.to_string()))
}

/// Non-empty plus the store's own format rule. The live remote check is asynchronous
/// and happens at commit time.
pub fn validate_secret(raw: &str, credentials: &dyn CredentialStore) -> Result<String> {
    let secret = raw.trim();
    if secret.is_empty() {
        return Err(SettingsError::validation("token cannot be empty"));
    }
    credentials.validate_format(secret)?;
    Ok(secret.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RepositoryEntry, RepositoryKind};
    use crate::settings::test_support::{FakeCredentials, FakePaths};

    fn config_with(name: &str, path: &str) -> Config {
        Config {
            repositories: vec![RepositoryEntry {
                id: "existing".into(),
                name: name.into(),
                kind: RepositoryKind::Local,
                path: path.into(),
                remote_url: None,
                branch: None,
                created_at: 0,
            }],
        }
    }

    #[test]
    fn test_name_boundaries() {
        let config = Config::new();
        let exactly = "a".repeat(MAX_NAME_LEN);
        assert_eq!(validate_name(&exactly, &config, None).unwrap(), exactly);
        let over = "a".repeat(MAX_NAME_LEN + 1);
        assert!(validate_name(&over, &config, None).is_err());
    }

    #[test]
    fn test_name_is_trimmed_before_checks() {
        let config = Config::new();
        assert_eq!(validate_name("  My Rules \t", &config, None).unwrap(), "My Rules");
        assert!(validate_name("   ", &config, None).is_err());
    }

    #[test]
    fn test_name_duplicate_and_self_exclusion() {
        let config = config_with("Existing Repo", "/r");
        let err = validate_name("Existing Repo", &config, None).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        assert!(validate_name("Existing Repo", &config, Some("existing")).is_ok());
        assert!(validate_name("existing repo", &config, None).is_ok());
    }

    #[test]
    fn test_remote_url_schemes() {
        assert!(validate_remote_url("https://github.com/a/b.git").is_ok());
        assert!(validate_remote_url("http://host/a/b").is_ok());
        assert!(validate_remote_url("git@github.com:a/b.git").is_ok());
        assert!(validate_remote_url("ftp://host/a").is_err());
        assert!(validate_remote_url("  ").is_err());
    }

    #[test]
    fn test_branch_rules() {
        assert_eq!(validate_branch("").unwrap(), None);
        assert_eq!(validate_branch("  ").unwrap(), None);
        assert_eq!(
            validate_branch("feature/x").unwrap().as_deref(),
            Some("feature/x")
        );
        for bad in ["/main", "main/", "a..b", "a~b", "a^b", "a:b", "a b", "x.lock"] {
            assert!(validate_branch(bad).is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_path_duplicate_after_expansion() {
        let config = config_with("A", "/home/me/rules");
        let paths = FakePaths::with_home("/home/me");
        let err = validate_path("~/rules", &paths, &config, None).unwrap_err();
        assert!(err.to_string().contains("already uses"));
        assert_eq!(
            validate_path("~/rules", &paths, &config, Some("existing")).unwrap(),
            "/home/me/rules"
        );
        assert!(validate_path("", &paths, &config, None).is_err());
    }

    #[test]
    fn test_path_duplicate_ignores_trailing_separator_and_dots() {
        let config = config_with("A", "/tmp/r");
        let paths = FakePaths::with_home("/home/me");
        for spelling in ["/tmp/r/", "/tmp/./r", "/tmp/x/../r"] {
            let err = validate_path(spelling, &paths, &config, None).unwrap_err();
            assert!(err.to_string().contains("already uses"), "{} should clash", spelling);
        }
        assert_eq!(
            validate_path("/tmp/new/", &paths, &config, None).unwrap(),
            "/tmp/new"
        );
    }

    #[test]
    fn test_secret_uses_store_format_rule() {
        let creds = FakeCredentials::default();
        assert!(validate_secret("", &creds).is_err());
        assert!(validate_secret("bad", &creds).is_err());
        assert_eq!(validate_secret(" ghp_valid ", &creds).unwrap(), "ghp_valid");
    }
}
