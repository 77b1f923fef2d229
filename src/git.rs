//! Git operations on managed repository clones.
//!
//! # Error Handling & Edge Cases
//!
//! This module uses libgit2 for all Git operations. Every failure is wrapped into
//! `SettingsError::Collaborator` with the operation name so the settings screens can
//! show it verbatim. Known edge cases:
//!
//! 1. **Not yet cloned**: `is_dirty()` treats a missing working tree as clean, and
//!    `fetch()` clones instead of fetching
//! 2. **Diverged history**: `fetch()` only fast-forwards; it never creates merge commits
//! 3. **Detached HEAD**: `fetch()` with no branch only updates remote-tracking refs
//! 4. **SSH remotes**: authenticated through the SSH agent, never with the token
//!
//! ## Credentials
//!
//! HTTPS remotes authenticate with the stored personal access token (if any),
//! falling back to the SSH agent and then to git's default credential helpers.

use std::path::Path;
use std::sync::Arc;

use git2::{
    build::{CheckoutBuilder, RepoBuilder},
    BranchType, Direction, FetchOptions, Repository, StatusOptions,
};

use crate::credentials::{token_callbacks, CredentialStore};
use crate::error::{Result, SettingsError};

pub trait RemoteOps: Send + Sync {
    fn is_dirty(&self, path: &str) -> Result<bool>;

    /// `Ok(())` when `refs/heads/<branch>` is advertised by the working tree's `origin`.
    fn remote_branch_exists(&self, path: &str, branch: &str) -> Result<()>;

    /// Brings the clone at `path` up to date with `url`, cloning it when absent.
    fn fetch(&self, path: &str, url: &str, branch: Option<&str>) -> Result<()>;
}

/// Thin wrapper around an opened working tree.
pub struct GitClient {
    repo: Repository,
}

impl GitClient {
    /// Opens the repository whose working tree is exactly `path`.
    ///
    /// Unlike discovery, this does not walk up to a parent repository: a clone path
    /// nested inside another checkout must not be mistaken for it.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let repo = Repository::open(path.as_ref())
            .map_err(|e| SettingsError::collaborator("open repository", e))?;
        Ok(Self { repo })
    }

    /// Get the current branch name.
    ///
    /// Returns `None` for a detached or unborn HEAD.
    pub fn head_branch(&self) -> Option<String> {
        let head = self.repo.head().ok()?;
        if !head.is_branch() {
            return None;
        }
        head.shorthand().map(|s| s.to_string())
    }

    /// Any modified, staged, deleted or untracked (non-ignored) file makes the tree dirty.
    pub fn has_local_changes(&self) -> Result<bool> {
        let mut opts = StatusOptions::new();
        opts.include_untracked(true)
            .recurse_untracked_dirs(true)
            .include_ignored(false);

        let statuses = self
            .repo
            .statuses(Some(&mut opts))
            .map_err(|e| SettingsError::collaborator("check working tree", e))?;
        Ok(!statuses.is_empty())
    }

    /// Branch names advertised by `remote_name`.
    pub fn remote_heads(&self, remote_name: &str, token: Option<String>) -> Result<Vec<String>> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|e| SettingsError::collaborator("find remote", e))?;
        let connection = remote
            .connect_auth(Direction::Fetch, Some(token_callbacks(token)), None)
            .map_err(|e| SettingsError::collaborator("connect to remote", e))?;
        let heads = connection
            .list()
            .map_err(|e| SettingsError::collaborator("list remote branches", e))?
            .iter()
            .filter_map(|h| h.name().strip_prefix("refs/heads/").map(str::to_string))
            .collect();
        Ok(heads)
    }

    /// Fetch the default refspecs of `remote_name`.
    pub fn fetch(&self, remote_name: &str, token: Option<String>) -> Result<()> {
        let mut remote = self
            .repo
            .find_remote(remote_name)
            .map_err(|e| SettingsError::collaborator("find remote", e))?;

        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(token_callbacks(token));

        // Empty refspecs means use the remote's default refspecs
        let empty_refspecs: Vec<&str> = vec![];
        remote
            .fetch(&empty_refspecs, Some(&mut fetch_options), None)
            .map_err(|e| SettingsError::collaborator("fetch", e))?;
        Ok(())
    }

    /// Moves local `branch` to `origin/<branch>` if that is a fast-forward, creating the
    /// local branch when missing, and checks it out.
    pub fn fast_forward(&self, branch: &str) -> Result<()> {
        let wrap = |e: git2::Error| SettingsError::collaborator("update branch", e);

        let remote_ref = format!("refs/remotes/origin/{}", branch);
        let remote_oid = self
            .repo
            .refname_to_id(&remote_ref)
            .map_err(|_| {
                SettingsError::precondition(format!(
                    "branch \"{}\" does not exist on the remote",
                    branch
                ))
            })?;
        let remote_commit = self.repo.find_commit(remote_oid).map_err(wrap)?;

        let local_ref = format!("refs/heads/{}", branch);
        match self.repo.find_branch(branch, BranchType::Local) {
            Ok(local) => {
                let local_oid = local
                    .get()
                    .target()
                    .ok_or_else(|| SettingsError::collaborator("update branch", "invalid branch reference"))?;
                if local_oid != remote_oid {
                    let descends = self
                        .repo
                        .graph_descendant_of(remote_oid, local_oid)
                        .map_err(wrap)?;
                    if !descends {
                        return Err(SettingsError::precondition(format!(
                            "local branch \"{}\" has diverged from the remote and cannot be fast-forwarded",
                            branch
                        )));
                    }
                    self.repo
                        .reference(&local_ref, remote_oid, true, "rulem: fast-forward")
                        .map_err(wrap)?;
                }
            }
            Err(_) => {
                let mut created = self
                    .repo
                    .branch(branch, &remote_commit, false)
                    .map_err(wrap)?;
                created
                    .set_upstream(Some(&format!("origin/{}", branch)))
                    .map_err(wrap)?;
            }
        }

        self.repo.set_head(&local_ref).map_err(wrap)?;
        self.repo
            .checkout_head(Some(CheckoutBuilder::new().force()))
            .map_err(wrap)?;
        Ok(())
    }
}

/// libgit2-backed [`RemoteOps`].
pub struct GitRemoteOps {
    credentials: Arc<dyn CredentialStore>,
}

impl GitRemoteOps {
    pub fn new(credentials: Arc<dyn CredentialStore>) -> Self {
        Self { credentials }
    }

    fn token(&self) -> Option<String> {
        match self.credentials.get() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read token, continuing without it");
                None
            }
        }
    }

    fn clone_into(&self, path: &Path, url: &str, branch: Option<&str>) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| SettingsError::collaborator("create clone directory", e))?;
        }
        let mut fetch_options = FetchOptions::new();
        fetch_options.remote_callbacks(token_callbacks(self.token()));

        let mut builder = RepoBuilder::new();
        builder.fetch_options(fetch_options);
        if let Some(branch) = branch {
            builder.branch(branch);
        }
        builder
            .clone(url, path)
            .map_err(|e| SettingsError::collaborator("clone", e))?;
        tracing::info!(%url, path = %path.display(), "cloned repository");
        Ok(())
    }
}

impl RemoteOps for GitRemoteOps {
    fn is_dirty(&self, path: &str) -> Result<bool> {
        let p = Path::new(path);
        if !p.exists() || Repository::open(p).is_err() {
            return Ok(false);
        }
        GitClient::open(p)?.has_local_changes()
    }

    fn remote_branch_exists(&self, path: &str, branch: &str) -> Result<()> {
        let client = GitClient::open(path).map_err(|_| {
            SettingsError::precondition(format!(
                "{} is not a cloned repository yet; refresh it first",
                path
            ))
        })?;
        let heads = client.remote_heads("origin", self.token())?;
        if heads.iter().any(|h| h == branch) {
            Ok(())
        } else {
            Err(SettingsError::precondition(format!(
                "branch \"{}\" does not exist on the remote",
                branch
            )))
        }
    }

    fn fetch(&self, path: &str, url: &str, branch: Option<&str>) -> Result<()> {
        let p = Path::new(path);
        if Repository::open(p).is_err() {
            return self.clone_into(p, url, branch);
        }

        let client = GitClient::open(p)?;
        client.fetch("origin", self.token())?;
        let target = branch.map(str::to_string).or_else(|| client.head_branch());
        match target {
            Some(b) => client.fast_forward(&b)?,
            None => tracing::debug!(%path, "detached HEAD, fetched without updating a branch"),
        }
        tracing::info!(%path, "fetched repository");
        Ok(())
    }
}
