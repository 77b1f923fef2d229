//! In-memory collaborators and a synchronous driver for settings tests.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use super::{Collaborators, Command, SettingsModel, SettingsMsg, Task};
use crate::credentials::CredentialStore;
use crate::data::Config;
use crate::error::{Result, SettingsError};
use crate::git::RemoteOps;
use crate::key_handler::KeyAction;
use crate::paths::PathOps;
use crate::store::ConfigStore;

pub(crate) const NOW: i64 = 1_700_000_000;

fn fixed_clock() -> i64 {
    NOW
}

#[derive(Default)]
pub(crate) struct FakeConfigStore {
    config: Mutex<Config>,
    save_error: Mutex<Option<SettingsError>>,
    saves: AtomicUsize,
}

impl FakeConfigStore {
    pub(crate) fn with(config: Config) -> Self {
        Self {
            config: Mutex::new(config),
            ..Default::default()
        }
    }

    pub(crate) fn fail_saves(&self, error: SettingsError) {
        *self.save_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn saved(&self) -> Config {
        self.config.lock().unwrap().clone()
    }

    pub(crate) fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ConfigStore for FakeConfigStore {
    fn load(&self) -> Result<Config> {
        Ok(self.saved())
    }

    fn save(&self, config: &Config) -> Result<()> {
        if let Some(error) = self.save_error.lock().unwrap().clone() {
            return Err(error);
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        *self.config.lock().unwrap() = config.clone();
        Ok(())
    }
}

/// Accepts tokens starting with `ghp_`.
#[derive(Default)]
pub(crate) struct FakeCredentials {
    stored: Mutex<Option<String>>,
    rejected_remotes: Mutex<HashSet<String>>,
    store_error: Mutex<Option<SettingsError>>,
    pub(crate) remote_checks: Mutex<Vec<String>>,
}

impl FakeCredentials {
    pub(crate) fn with_token(token: &str) -> Self {
        let creds = Self::default();
        *creds.stored.lock().unwrap() = Some(token.to_string());
        creds
    }

    pub(crate) fn reject_remote(&self, url: &str) {
        self.rejected_remotes.lock().unwrap().insert(url.to_string());
    }

    pub(crate) fn fail_store(&self, error: SettingsError) {
        *self.store_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn token(&self) -> Option<String> {
        self.stored.lock().unwrap().clone()
    }
}

impl CredentialStore for FakeCredentials {
    fn get(&self) -> Result<Option<String>> {
        Ok(self.token())
    }

    fn store(&self, secret: &str) -> Result<()> {
        if let Some(error) = self.store_error.lock().unwrap().clone() {
            return Err(error);
        }
        *self.stored.lock().unwrap() = Some(secret.to_string());
        Ok(())
    }

    fn validate_format(&self, secret: &str) -> Result<()> {
        if secret.starts_with("ghp_") {
            Ok(())
        } else {
            Err(SettingsError::validation("token must start with ghp_"))
        }
    }

    fn validate_against_remote(&self, _secret: &str, url: &str) -> Result<()> {
        self.remote_checks.lock().unwrap().push(url.to_string());
        if self.rejected_remotes.lock().unwrap().contains(url) {
            return Err(SettingsError::collaborator(
                "validate token",
                "authentication failed",
            ));
        }
        Ok(())
    }
}

#[derive(Default)]
pub(crate) struct FakeRemoteOps {
    dirty: Mutex<HashSet<String>>,
    dirty_error: Mutex<Option<SettingsError>>,
    /// `None` means every branch exists.
    branches: Mutex<Option<Vec<String>>>,
    fetch_error: Mutex<Option<SettingsError>>,
    pub(crate) fetches: Mutex<Vec<(String, String, Option<String>)>>,
}

impl FakeRemoteOps {
    pub(crate) fn set_dirty(&self, path: &str) {
        self.dirty.lock().unwrap().insert(path.to_string());
    }

    pub(crate) fn fail_dirty_check(&self, error: SettingsError) {
        *self.dirty_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn only_branches(&self, names: &[&str]) {
        *self.branches.lock().unwrap() = Some(names.iter().map(|s| s.to_string()).collect());
    }

    pub(crate) fn fail_fetch(&self, error: SettingsError) {
        *self.fetch_error.lock().unwrap() = Some(error);
    }

    pub(crate) fn fetch_count(&self) -> usize {
        self.fetches.lock().unwrap().len()
    }
}

impl RemoteOps for FakeRemoteOps {
    fn is_dirty(&self, path: &str) -> Result<bool> {
        if let Some(error) = self.dirty_error.lock().unwrap().clone() {
            return Err(error);
        }
        Ok(self.dirty.lock().unwrap().contains(path))
    }

    fn remote_branch_exists(&self, _path: &str, branch: &str) -> Result<()> {
        match self.branches.lock().unwrap().as_ref() {
            Some(known) if !known.iter().any(|b| b == branch) => Err(SettingsError::precondition(
                format!("branch '{}' does not exist on the remote", branch),
            )),
            _ => Ok(()),
        }
    }

    fn fetch(&self, path: &str, url: &str, branch: Option<&str>) -> Result<()> {
        self.fetches.lock().unwrap().push((
            path.to_string(),
            url.to_string(),
            branch.map(str::to_string),
        ));
        match self.fetch_error.lock().unwrap().clone() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Expands `~` to a fixed home; relative paths are rooted at `/work`.
pub(crate) struct FakePaths {
    home: String,
    rejected: Mutex<HashSet<String>>,
}

impl FakePaths {
    pub(crate) fn with_home(home: &str) -> Self {
        Self {
            home: home.to_string(),
            rejected: Mutex::new(HashSet::new()),
        }
    }

    pub(crate) fn reject(&self, expanded: &str) {
        self.rejected.lock().unwrap().insert(expanded.to_string());
    }
}

impl PathOps for FakePaths {
    fn expand(&self, raw: &str) -> String {
        if raw == "~" {
            self.home.clone()
        } else if let Some(rest) = raw.strip_prefix("~/") {
            format!("{}/{}", self.home, rest)
        } else if raw.starts_with('/') {
            raw.to_string()
        } else {
            format!("/work/{}", raw)
        }
    }

    fn validate_storage_path(&self, expanded: &str) -> Result<()> {
        if self.rejected.lock().unwrap().contains(expanded) {
            return Err(SettingsError::validation(format!(
                "{} is not a writable directory",
                expanded
            )));
        }
        Ok(())
    }
}

/// A model wired to fakes. Tasks run inline unless deferred explicitly.
pub(crate) struct Harness {
    pub(crate) model: SettingsModel,
    pub(crate) store: Arc<FakeConfigStore>,
    pub(crate) credentials: Arc<FakeCredentials>,
    pub(crate) remote: Arc<FakeRemoteOps>,
    pub(crate) paths: Arc<FakePaths>,
}

impl Harness {
    pub(crate) fn new(config: Config) -> Self {
        Self::with_credentials(config, FakeCredentials::default())
    }

    pub(crate) fn with_credentials(config: Config, credentials: FakeCredentials) -> Self {
        crate::logging::test();
        let store = Arc::new(FakeConfigStore::with(config));
        let credentials = Arc::new(credentials);
        let remote = Arc::new(FakeRemoteOps::default());
        let paths = Arc::new(FakePaths::with_home("/home/me"));
        let deps = Collaborators {
            config_store: store.clone(),
            credentials: credentials.clone(),
            remote: remote.clone(),
            paths: paths.clone(),
        };
        let model = SettingsModel::new(deps).with_clock(fixed_clock);
        let mut harness = Self {
            model,
            store,
            credentials,
            remote,
            paths,
        };
        let init = harness.model.init();
        harness.run(init);
        harness
    }

    /// Executes commands until none is left; returns the first non-task command.
    pub(crate) fn run(&mut self, mut command: Option<Command>) -> Option<Command> {
        while let Some(cmd) = command {
            match cmd {
                Command::Task(task) => command = self.model.update(task.run()),
                other => return Some(other),
            }
        }
        None
    }

    pub(crate) fn send(&mut self, msg: SettingsMsg) -> Option<Command> {
        let command = self.model.update(msg);
        self.run(command)
    }

    pub(crate) fn key(&mut self, key: KeyAction) -> Option<Command> {
        self.send(SettingsMsg::Key(key))
    }

    /// Sends a key and hands back the issued task without running it.
    pub(crate) fn key_deferred(&mut self, key: KeyAction) -> Task {
        match self.model.update(SettingsMsg::Key(key)) {
            Some(Command::Task(task)) => task,
            other => panic!("expected a task, got {:?}", other),
        }
    }

    pub(crate) fn enter(&mut self) -> Option<Command> {
        self.key(KeyAction::Select)
    }

    pub(crate) fn esc(&mut self) -> Option<Command> {
        self.key(KeyAction::Back)
    }

    pub(crate) fn down(&mut self, times: usize) {
        for _ in 0..times {
            self.key(KeyAction::NavigateDown);
        }
    }

    /// Replaces the input's contents with `text`.
    pub(crate) fn type_text(&mut self, text: &str) {
        self.key(KeyAction::ClearLine);
        for c in text.chars() {
            self.key(KeyAction::InputChar(c));
        }
    }

    pub(crate) fn submit(&mut self, text: &str) -> Option<Command> {
        self.type_text(text);
        self.enter()
    }

    /// Moves the main-menu cursor to the repository at `index` and opens it.
    pub(crate) fn open_repository(&mut self, index: usize) {
        self.down(index);
        self.enter();
    }

    /// Opens the action at `index` of the current repository's action menu.
    pub(crate) fn choose_action(&mut self, index: usize) {
        self.down(index);
        self.enter();
    }
}
