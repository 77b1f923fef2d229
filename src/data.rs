use serde::{Deserialize, Serialize};

use crate::error::{Result, SettingsError};
use crate::paths::normalize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepositoryKind {
    Local,
    Remote,
}

impl RepositoryKind {
    pub fn label(self) -> &'static str {
        match self {
            RepositoryKind::Local => "local",
            RepositoryKind::Remote => "remote",
        }
    }
}

/// One managed rules repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepositoryEntry {
    pub id: String,
    pub name: String,
    pub kind: RepositoryKind,
    /// Absolute path after expansion. For remote entries, the clone's working tree.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    /// `None` tracks the remote's default branch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    pub created_at: i64,
}

impl RepositoryEntry {
    pub fn local(config: &Config, name: String, path: String, created_at: i64) -> Self {
        Self {
            id: config.generate_id(&name, created_at),
            name,
            kind: RepositoryKind::Local,
            path,
            remote_url: None,
            branch: None,
            created_at,
        }
    }

    pub fn remote(
        config: &Config,
        name: String,
        url: String,
        branch: Option<String>,
        path: String,
        created_at: i64,
    ) -> Self {
        Self {
            id: config.generate_id(&name, created_at),
            name,
            kind: RepositoryKind::Remote,
            path,
            remote_url: Some(url),
            branch,
            created_at,
        }
    }

    pub fn is_remote(&self) -> bool {
        self.kind == RepositoryKind::Remote
    }

    pub fn branch_label(&self) -> &str {
        self.branch.as_deref().unwrap_or("(default)")
    }
}

/// The persisted configuration snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub repositories: Vec<RepositoryEntry>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find(&self, id: &str) -> Option<&RepositoryEntry> {
        self.repositories.iter().find(|r| r.id == id)
    }

    pub fn find_mut(&mut self, id: &str) -> Option<&mut RepositoryEntry> {
        self.repositories.iter_mut().find(|r| r.id == id)
    }

    /// Names are compared exactly; case is significant.
    pub fn name_taken(&self, name: &str, exclude_id: Option<&str>) -> bool {
        self.repositories
            .iter()
            .filter(|r| Some(r.id.as_str()) != exclude_id)
            .any(|r| r.name == name)
    }

    /// Paths are compared after lexical normalisation.
    pub fn path_taken(&self, path: &str, exclude_id: Option<&str>) -> bool {
        let path = normalize(path);
        self.repositories
            .iter()
            .filter(|r| Some(r.id.as_str()) != exclude_id)
            .any(|r| normalize(&r.path) == path)
    }

    pub fn remote_urls(&self) -> Vec<String> {
        self.repositories
            .iter()
            .filter_map(|r| r.remote_url.clone())
            .collect()
    }

    pub fn remove(&mut self, id: &str) -> Option<RepositoryEntry> {
        let idx = self.repositories.iter().position(|r| r.id == id)?;
        Some(self.repositories.remove(idx))
    }

    /// Deterministic id from `(name, created_at)`: lowercased slug plus a timestamp
    /// suffix, bumped with a counter until it is unique in this snapshot.
    pub fn generate_id(&self, name: &str, created_at: i64) -> String {
        let slug = slugify(name);
        let base = if slug.is_empty() {
            format!("repo-{}", created_at)
        } else {
            format!("{}-{}", slug, created_at)
        };

        if self.find(&base).is_none() {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if self.find(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    /// Checks the collection-wide uniqueness rules every committed snapshot must hold.
    pub fn check_invariants(&self) -> Result<()> {
        for (i, a) in self.repositories.iter().enumerate() {
            if a.name.trim().is_empty() {
                return Err(SettingsError::collaborator(
                    "check configuration",
                    format!("repository {} has an empty name", a.id),
                ));
            }
            if a.kind == RepositoryKind::Remote
                && a.remote_url.as_deref().map_or(true, str::is_empty)
            {
                return Err(SettingsError::collaborator(
                    "check configuration",
                    format!("remote repository \"{}\" has no URL", a.name),
                ));
            }
            for b in &self.repositories[i + 1..] {
                let clash = if a.id == b.id {
                    Some("id")
                } else if a.name == b.name {
                    Some("name")
                } else if normalize(&a.path) == normalize(&b.path) {
                    Some("path")
                } else {
                    None
                };
                if let Some(field) = clash {
                    return Err(SettingsError::collaborator(
                        "check configuration",
                        format!(
                            "repositories \"{}\" and \"{}\" share the same {}",
                            a.name, b.name, field
                        ),
                    ));
                }
            }
        }
        Ok(())
    }
}

fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash && !slug.is_empty() {
            slug.push('-');
            dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
