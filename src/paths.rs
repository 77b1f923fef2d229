//! Path expansion and storage-path validation.

use std::path::{Component, Path, PathBuf};

use crate::error::{Result, SettingsError};

pub trait PathOps: Send + Sync {
    /// Expands a home marker and environment variables, yielding an absolute path.
    fn expand(&self, raw: &str) -> String;

    /// The path must exist as a writable directory, or be creatable under one.
    fn validate_storage_path(&self, expanded: &str) -> Result<()>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SystemPathOps;

impl SystemPathOps {
    pub fn new() -> Self {
        Self
    }
}

impl PathOps for SystemPathOps {
    fn expand(&self, raw: &str) -> String {
        let expanded = match shellexpand::full(raw) {
            Ok(s) => s.into_owned(),
            Err(e) => {
                tracing::debug!(%raw, error = %e, "variable expansion failed, expanding ~ only");
                shellexpand::tilde(raw).into_owned()
            }
        };
        let path = PathBuf::from(&expanded);
        if path.is_absolute() {
            return expanded;
        }
        match std::env::current_dir() {
            Ok(cwd) => cwd.join(path).to_string_lossy().into_owned(),
            Err(_) => expanded,
        }
    }

    fn validate_storage_path(&self, expanded: &str) -> Result<()> {
        let path = Path::new(expanded);
        if path.exists() {
            if !path.is_dir() {
                return Err(SettingsError::validation(format!(
                    "{} is a file, not a directory",
                    expanded
                )));
            }
            return probe_writable(path);
        }

        let ancestor = path
            .ancestors()
            .skip(1)
            .find(|p| p.exists())
            .ok_or_else(|| {
                SettingsError::validation(format!("{} has no existing parent directory", expanded))
            })?;
        if !ancestor.is_dir() {
            return Err(SettingsError::validation(format!(
                "cannot create {}: {} is not a directory",
                expanded,
                ancestor.display()
            )));
        }
        probe_writable(ancestor)
    }
}

fn probe_writable(dir: &Path) -> Result<()> {
    tempfile::tempfile_in(dir).map(|_| ()).map_err(|e| {
        SettingsError::validation(format!("{} is not writable: {}", dir.display(), e))
    })
}

/// Lexically resolves `.` and `..` and drops trailing or repeated separators, so that
/// `/tmp/r`, `/tmp/r/` and `/tmp/./x/../r` compare equal. Symlinks are not followed.
pub fn normalize(path: &str) -> String {
    let mut out = PathBuf::new();
    for component in Path::new(path).components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let at_parent = matches!(out.components().next_back(), Some(Component::ParentDir));
                // `..` above the root stays at the root
                if at_parent || (!out.pop() && !out.has_root()) {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    if out.as_os_str().is_empty() {
        return ".".to_string();
    }
    out.to_string_lossy().into_owned()
}

/// Last path segment of a remote URL, without a trailing `.git`.
///
/// Handles `https://host/owner/repo(.git)` and `git@host:owner/repo(.git)` alike.
pub fn repo_segment(url: &str) -> Option<String> {
    let trimmed = url.trim().trim_end_matches('/');
    let tail = trimmed.rsplit(['/', ':']).next()?;
    let name = tail.strip_suffix(".git").unwrap_or(tail);
    if name.is_empty() || name.contains('@') {
        None
    } else {
        Some(name.to_string())
    }
}

/// Default clone location for a remote repository.
pub fn default_clone_path(url: &str) -> Option<String> {
    let segment = repo_segment(url)?;
    let root = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    Some(
        root.join("rulem")
            .join("repositories")
            .join(segment)
            .to_string_lossy()
            .into_owned(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_expand_tilde() {
        let ops = SystemPathOps::new();
        let home = dirs::home_dir().expect("home dir");
        let expanded = ops.expand("~/rules");
        assert_eq!(PathBuf::from(expanded), home.join("rules"));
    }

    #[test]
    fn test_expand_relative_becomes_absolute() {
        let ops = SystemPathOps::new();
        assert!(Path::new(&ops.expand("some/dir")).is_absolute());
    }

    #[test]
    fn test_expand_undefined_variable_keeps_text() {
        let ops = SystemPathOps::new();
        let out = ops.expand("/tmp/$RULEM_SURELY_UNDEFINED_VAR/x");
        assert!(out.contains("RULEM_SURELY_UNDEFINED_VAR"));
    }

    #[test]
    fn test_validate_existing_dir() {
        let dir = TempDir::new().expect("temp dir");
        let ops = SystemPathOps::new();
        assert!(ops
            .validate_storage_path(dir.path().to_str().unwrap())
            .is_ok());
    }

    #[test]
    fn test_validate_creatable_dir() {
        let dir = TempDir::new().expect("temp dir");
        let target = dir.path().join("a").join("b");
        let ops = SystemPathOps::new();
        assert!(ops.validate_storage_path(target.to_str().unwrap()).is_ok());
    }

    #[test]
    fn test_validate_rejects_file() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").expect("write");
        let ops = SystemPathOps::new();
        let err = ops.validate_storage_path(file.to_str().unwrap()).unwrap_err();
        assert!(err.to_string().contains("is a file"));

        let below = file.join("child");
        assert!(ops.validate_storage_path(below.to_str().unwrap()).is_err());
    }

    #[test]
    fn test_normalize_trailing_separator_and_dots() {
        assert_eq!(normalize("/tmp/r/"), "/tmp/r");
        assert_eq!(normalize("/tmp//r"), "/tmp/r");
        assert_eq!(normalize("/tmp/./x/../r"), "/tmp/r");
        assert_eq!(normalize("/../r"), "/r");
        assert_eq!(normalize("a/.."), ".");
        assert_eq!(normalize("../../a"), "../../a");
    }

    #[test]
    fn test_repo_segment() {
        assert_eq!(
            repo_segment("https://github.com/acme/rules.git").as_deref(),
            Some("rules")
        );
        assert_eq!(
            repo_segment("git@github.com:acme/team-rules.git").as_deref(),
            Some("team-rules")
        );
        assert_eq!(
            repo_segment("http://example.com/acme/rules/").as_deref(),
            Some("rules")
        );
        assert_eq!(repo_segment(""), None);
    }
}
