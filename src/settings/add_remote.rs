//! Add-Remote: name, URL, branch and clone path, then either commit directly or
//! collect a token first when the keychain has none.

use std::sync::Arc;

use super::{Command, InputOutcome, SettingsModel, SettingsMsg, Task};
use crate::data::{Config, RepositoryEntry};
use crate::input::InputSpec;
use crate::key_handler::KeyAction;
use crate::paths::default_clone_path;
use crate::state::{Flow, SettingsState};
use crate::validation::{
    validate_branch, validate_name, validate_path, validate_remote_url, validate_secret,
    MAX_NAME_LEN,
};

const URL_LIMIT: usize = 2048;
const BRANCH_LIMIT: usize = 255;
const PATH_LIMIT: usize = 4096;
const TOKEN_LIMIT: usize = 255;

impl SettingsModel {
    pub(super) fn enter_add_remote_name(&mut self) {
        self.transition_to(SettingsState::AddRemoteName);
        let value = self.scratch.add_remote.name.clone();
        self.input
            .reset_to(InputSpec::new(value, "e.g. Shared Rules", MAX_NAME_LEN));
    }

    fn enter_add_remote_url(&mut self) {
        self.transition_to(SettingsState::AddRemoteUrl);
        let value = self.scratch.add_remote.url.clone();
        self.input.reset_to(InputSpec::new(
            value,
            "https://github.com/owner/rules.git",
            URL_LIMIT,
        ));
    }

    fn enter_add_remote_branch(&mut self) {
        self.transition_to(SettingsState::AddRemoteBranch);
        let value = self.scratch.add_remote.branch.clone();
        self.input.reset_to(InputSpec::new(
            value,
            "leave empty for the default branch",
            BRANCH_LIMIT,
        ));
    }

    fn enter_add_remote_path(&mut self) {
        self.transition_to(SettingsState::AddRemotePath);
        let scratch = &self.scratch.add_remote;
        let value = if scratch.path.is_empty() {
            default_clone_path(&scratch.url).unwrap_or_default()
        } else {
            scratch.path.clone()
        };
        self.input
            .reset_to(InputSpec::new(value, "where to clone", PATH_LIMIT));
    }

    pub(super) fn enter_add_remote_pat(&mut self) {
        self.transition_to(SettingsState::AddRemotePat);
        self.input
            .reset_to(InputSpec::new("", "ghp_…", TOKEN_LIMIT).masked());
    }

    fn pending_remote_config(&self) -> Config {
        let scratch = &self.scratch.add_remote;
        let mut next = self.config.clone();
        let branch = (!scratch.branch.is_empty()).then(|| scratch.branch.clone());
        let entry = RepositoryEntry::remote(
            &next,
            scratch.name.clone(),
            scratch.url.clone(),
            branch,
            scratch.path.clone(),
            self.now(),
        );
        next.repositories.push(entry);
        next
    }

    pub(super) fn add_remote_name_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => match validate_name(&raw, &self.config, None) {
                Ok(name) => {
                    self.scratch.add_remote.name = name;
                    self.enter_add_remote_url();
                }
                Err(error) => self.errors.set(error),
            },
            InputOutcome::Back => self.transition_to(SettingsState::AddType),
            InputOutcome::Edited => {}
        }
        None
    }

    pub(super) fn add_remote_url_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => match validate_remote_url(&raw) {
                Ok(url) => {
                    if url != self.scratch.add_remote.url {
                        // a new URL invalidates the derived clone path
                        self.scratch.add_remote.path.clear();
                    }
                    self.scratch.add_remote.url = url;
                    self.enter_add_remote_branch();
                }
                Err(error) => self.errors.set(error),
            },
            InputOutcome::Back => self.enter_add_remote_name(),
            InputOutcome::Edited => {}
        }
        None
    }

    pub(super) fn add_remote_branch_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => match validate_branch(&raw) {
                Ok(branch) => {
                    self.scratch.add_remote.branch = branch.unwrap_or_default();
                    self.enter_add_remote_path();
                }
                Err(error) => self.errors.set(error),
            },
            InputOutcome::Back => self.enter_add_remote_url(),
            InputOutcome::Edited => {}
        }
        None
    }

    pub(super) fn add_remote_path_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => {
                match validate_path(&raw, self.deps.paths.as_ref(), &self.config, None) {
                    Ok(path) => {
                        self.scratch.add_remote.path = path;
                        return self.check_stored_token();
                    }
                    Err(error) => self.errors.set(error),
                }
            }
            InputOutcome::Back => self.enter_add_remote_branch(),
            InputOutcome::Edited => {}
        }
        None
    }

    /// Saves straight away when a token is already stored, otherwise asks for one.
    fn check_stored_token(&mut self) -> Option<Command> {
        let next = self.pending_remote_config();
        let credentials = Arc::clone(&self.deps.credentials);
        let store = Arc::clone(&self.deps.config_store);
        self.issue_commit(Task::new("look up token", move || {
            let flow = Flow::AddRemote;
            match credentials.get() {
                Ok(Some(_)) => match next.check_invariants().and_then(|_| store.save(&next)) {
                    Ok(()) => SettingsMsg::SettingsComplete {
                        flow,
                        config: Some(next),
                    },
                    Err(error) => SettingsMsg::failed(flow, error),
                },
                Ok(None) => SettingsMsg::AddRemotePatNeeded,
                Err(error) => SettingsMsg::failed(flow, error),
            }
        }))
    }

    pub(super) fn add_remote_pat_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => {
                match validate_secret(&raw, self.deps.credentials.as_ref()) {
                    Ok(secret) => return self.store_token_and_save(secret),
                    Err(error) => self.errors.set(error),
                }
            }
            InputOutcome::Back => self.enter_add_remote_path(),
            InputOutcome::Edited => {}
        }
        None
    }

    fn store_token_and_save(&mut self, secret: String) -> Option<Command> {
        let next = self.pending_remote_config();
        let url = self.scratch.add_remote.url.clone();
        let credentials = Arc::clone(&self.deps.credentials);
        let store = Arc::clone(&self.deps.config_store);
        self.issue_commit(Task::new("store token", move || {
            let flow = Flow::AddRemote;
            let result = credentials
                .validate_against_remote(&secret, &url)
                .and_then(|_| credentials.store(&secret))
                .and_then(|_| next.check_invariants())
                .and_then(|_| store.save(&next));
            match result {
                Ok(()) => SettingsMsg::SettingsComplete {
                    flow,
                    config: Some(next),
                },
                Err(error) => SettingsMsg::failed(flow, error),
            }
        }))
    }
}
