//! Message routing.
//!
//! Universal messages (quit, resize, configuration reloads, completion) are handled
//! here regardless of state. Key presses go to the handler of the current state.
//! Results of background work are applied only when still relevant:
//!
//! - dirty-tree and refresh results need the exact state that issued them and must
//!   carry the id of the outstanding request;
//! - `AddRemotePatNeeded` needs the exact state that issued it;
//! - flow error events need the current state to belong to the same flow;
//! - completion always adopts the saved snapshot but only moves the model when the
//!   current state still belongs to the completing flow.

use tracing::{debug, info, warn};

use super::{Command, ConfirmOutcome, SettingsModel, SettingsMsg};
use crate::data::Config;
use crate::error::{Result, SettingsError};
use crate::key_handler::KeyAction;
use crate::state::{Flow, SettingsState, StateKind};

impl SettingsModel {
    pub fn update(&mut self, msg: SettingsMsg) -> Option<Command> {
        match msg {
            SettingsMsg::Key(KeyAction::Quit) => Some(Command::Quit),
            SettingsMsg::Key(key) => self.handle_key(key),
            SettingsMsg::Resize { width, height } => {
                self.resize(width, height);
                None
            }
            SettingsMsg::ConfigLoaded(result) => {
                self.on_config_loaded(result);
                None
            }
            SettingsMsg::SettingsComplete { flow, config } => {
                self.commit_settled();
                self.on_settings_complete(flow, config)
            }
            SettingsMsg::AddLocalError(error) => self.on_commit_error(Flow::AddLocal, error),
            SettingsMsg::AddRemoteError(error) => self.on_commit_error(Flow::AddRemote, error),
            SettingsMsg::EditNameError(error) => self.on_commit_error(Flow::EditName, error),
            SettingsMsg::EditBranchError(error) => self.on_commit_error(Flow::EditBranch, error),
            SettingsMsg::EditClonePathError(error) => {
                self.on_commit_error(Flow::EditClonePath, error)
            }
            SettingsMsg::DeleteError(error) => self.on_commit_error(Flow::Delete, error),
            SettingsMsg::UpdatePatError(error) => self.on_commit_error(Flow::UpdatePat, error),
            SettingsMsg::RefreshError(error) => self.on_flow_error(Flow::Refresh, error),
            SettingsMsg::EditBranchDirtyResult { request, result } => {
                if self.take_request(SettingsState::UpdateBranch, request) {
                    self.on_edit_branch_dirty(result)
                } else {
                    self.drop_stale("edit branch dirty check")
                }
            }
            SettingsMsg::EditClonePathDirtyResult { request, result } => {
                if self.take_request(SettingsState::UpdateClonePath, request) {
                    self.on_edit_clone_path_dirty(result)
                } else {
                    self.drop_stale("edit clone path dirty check")
                }
            }
            SettingsMsg::RefreshDirtyResult { request, result } => {
                if self.take_request(SettingsState::ManualRefresh, request) {
                    self.on_refresh_dirty(result)
                } else {
                    self.drop_stale("refresh dirty check")
                }
            }
            SettingsMsg::RefreshDone { request, result } => {
                if self.take_request(SettingsState::RefreshInProgress, request) {
                    self.refresh_in_progress = false;
                    self.on_refresh_done(result)
                } else {
                    self.drop_stale("refresh")
                }
            }
            SettingsMsg::AddRemotePatNeeded => {
                self.commit_settled();
                if self.state == SettingsState::AddRemotePath {
                    self.enter_add_remote_pat();
                    None
                } else {
                    self.drop_stale("credential lookup")
                }
            }
        }
    }

    /// Every flow except refresh reports its commit failures this way.
    fn on_commit_error(&mut self, flow: Flow, error: SettingsError) -> Option<Command> {
        self.commit_settled();
        self.on_flow_error(flow, error)
    }

    fn on_flow_error(&mut self, flow: Flow, error: SettingsError) -> Option<Command> {
        if self.state.flow() == Some(flow) {
            self.fail(flow, error);
        } else {
            debug!(?flow, state = ?self.state, %error, "dropping stale flow error");
        }
        None
    }

    fn drop_stale(&self, what: &str) -> Option<Command> {
        debug!(what, state = ?self.state, "dropping stale result");
        None
    }

    fn handle_key(&mut self, key: KeyAction) -> Option<Command> {
        let submits = match self.state.kind() {
            StateKind::Input => key == KeyAction::Select,
            StateKind::Confirm => matches!(Self::confirm_key(&key), ConfirmOutcome::Yes),
            _ => false,
        };
        if self.awaiting && submits {
            debug!(state = ?self.state, "ignoring submit while a task is pending");
            return None;
        }

        use SettingsState::*;
        match self.state {
            MainMenu => self.main_menu_key(key),
            RepositoryActions => self.repository_actions_key(key),
            AddType => self.add_type_key(key),

            AddLocalName => self.add_local_name_key(key),
            AddLocalPath => self.add_local_path_key(key),

            AddRemoteName => self.add_remote_name_key(key),
            AddRemoteUrl => self.add_remote_url_key(key),
            AddRemoteBranch => self.add_remote_branch_key(key),
            AddRemotePath => self.add_remote_path_key(key),
            AddRemotePat => self.add_remote_pat_key(key),

            UpdateName => self.update_name_key(key),
            EditNameConfirm => self.edit_name_confirm_key(key),

            UpdateBranch => self.update_branch_key(key),
            EditBranchConfirm => self.edit_branch_confirm_key(key),

            UpdateClonePath => self.update_clone_path_key(key),
            EditClonePathConfirm => self.edit_clone_path_confirm_key(key),

            ConfirmDelete => self.confirm_delete_key(key),

            ManualRefresh => self.manual_refresh_key(key),
            RefreshInProgress => None,

            UpdatePat => self.update_pat_key(key),
            UpdatePatConfirm => self.update_pat_confirm_key(key),

            AddLocalError | AddRemoteError | EditNameError | EditBranchError
            | EditClonePathError | DeleteError | RefreshError | UpdatePatError => {
                self.dismiss_error();
                None
            }

            Complete => {
                self.transition_to(MainMenu);
                None
            }
        }
    }

    fn on_config_loaded(&mut self, result: Result<Config>) {
        match result {
            Ok(config) => {
                info!(repositories = config.repositories.len(), "configuration loaded");
                self.config = config;
                if self.selected.is_some() && self.selected_entry().is_err() {
                    self.selected = None;
                    if self.state == SettingsState::RepositoryActions {
                        self.transition_to(SettingsState::MainMenu);
                    }
                }
                let len = self.list_len();
                if len > 0 {
                    self.cursor = self.cursor.min(len - 1);
                }
            }
            Err(error) => {
                warn!(%error, "failed to load configuration");
                self.errors.set(error);
            }
        }
    }

    fn on_settings_complete(&mut self, flow: Flow, config: Option<Config>) -> Option<Command> {
        if let Some(config) = config {
            self.config = config;
        }
        if self.state.flow() == Some(flow) {
            info!(?flow, "settings flow completed");
            self.scratch.reset(flow);
            self.transition_to(flow.terminal_state());
        } else {
            debug!(?flow, state = ?self.state, "completion arrived after leaving the flow");
        }
        Some(self.reload_command())
    }

    pub(crate) fn unknown_change(&mut self, what: impl Into<String>) {
        let error = SettingsError::UnknownChangeKind(what.into());
        warn!(%error, "rejecting change");
        self.errors.set(error);
    }
}
