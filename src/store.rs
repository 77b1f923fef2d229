//! Persistence of the configuration snapshot.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::data::Config;
use crate::error::{Result, SettingsError};

/// Overrides the configuration file location (used by tests and scripted setups).
pub const CONFIG_PATH_ENV: &str = "RULEM_CONFIG_PATH";

pub trait ConfigStore: Send + Sync {
    fn load(&self) -> Result<Config>;

    /// Atomically replaces the persisted snapshot.
    fn save(&self, config: &Config) -> Result<()>;
}

/// JSON document on disk, replaced via write-temp-then-rename.
#[derive(Debug, Clone)]
pub struct JsonConfigStore {
    path: PathBuf,
}

impl JsonConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `RULEM_CONFIG_PATH`, or `<config_dir>/rulem/config.json`.
    pub fn from_env() -> Self {
        let path = std::env::var_os(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(default_config_path);
        Self::new(path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("rulem")
        .join("config.json")
}

impl ConfigStore for JsonConfigStore {
    fn load(&self) -> Result<Config> {
        if !self.path.exists() {
            tracing::debug!(path = %self.path.display(), "no configuration file yet");
            return Ok(Config::default());
        }
        let raw = std::fs::read_to_string(&self.path)
            .map_err(|e| SettingsError::collaborator("load configuration", e))?;
        if raw.trim().is_empty() {
            return Ok(Config::default());
        }
        let config: Config = serde_json::from_str(&raw)
            .map_err(|e| SettingsError::collaborator("parse configuration", e))?;
        config.check_invariants()?;
        Ok(config)
    }

    fn save(&self, config: &Config) -> Result<()> {
        let dir = self
            .path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        std::fs::create_dir_all(dir)
            .map_err(|e| SettingsError::collaborator("save configuration", e))?;

        let json = serde_json::to_string_pretty(config)
            .map_err(|e| SettingsError::collaborator("encode configuration", e))?;
        let mut tmp = NamedTempFile::new_in(dir)
            .map_err(|e| SettingsError::collaborator("save configuration", e))?;
        tmp.write_all(json.as_bytes())
            .and_then(|_| tmp.as_file().sync_all())
            .map_err(|e| SettingsError::collaborator("save configuration", e))?;
        tmp.persist(&self.path)
            .map_err(|e| SettingsError::collaborator("save configuration", e.error))?;

        tracing::info!(
            path = %self.path.display(),
            repositories = config.repositories.len(),
            "saved configuration"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{RepositoryEntry, RepositoryKind};
    use tempfile::TempDir;

    fn sample() -> Config {
        Config {
            repositories: vec![RepositoryEntry {
                id: "rules-1".into(),
                name: "Rules".into(),
                kind: RepositoryKind::Remote,
                path: "/tmp/rules".into(),
                remote_url: Some("https://github.com/acme/rules.git".into()),
                branch: Some("main".into()),
                created_at: 1,
            }],
        }
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = TempDir::new().expect("temp dir");
        let store = JsonConfigStore::new(dir.path().join("config.json"));
        assert_eq!(store.load().unwrap(), Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().expect("temp dir");
        let store = JsonConfigStore::new(dir.path().join("nested").join("config.json"));
        store.save(&sample()).expect("save");
        assert_eq!(store.load().unwrap(), sample());

        let leftovers: Vec<_> = std::fs::read_dir(dir.path().join("nested"))
            .unwrap()
            .flatten()
            .collect();
        assert_eq!(leftovers.len(), 1, "temp file should have been renamed away");
    }

    #[test]
    fn test_corrupt_file_is_collaborator_error() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        let err = JsonConfigStore::new(&path).load().unwrap_err();
        assert!(matches!(err, SettingsError::Collaborator { .. }));
    }

    #[test]
    fn test_invariant_violation_rejected_on_load() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("config.json");
        let mut config = sample();
        let mut dup = config.repositories[0].clone();
        dup.id = "rules-2".into();
        dup.path = "/tmp/other".into();
        config.repositories.push(dup);
        std::fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();
        let err = JsonConfigStore::new(&path).load().unwrap_err();
        assert!(err.to_string().contains("same name"));
    }
}
