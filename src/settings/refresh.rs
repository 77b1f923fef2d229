//! Refresh: confirm, refuse on a dirty clone, then clone or fast-forward from the
//! remote while a spinner runs.

use std::sync::Arc;

use super::{Command, ConfirmOutcome, SettingsModel, SettingsMsg, Task};
use crate::error::{Result, SettingsError};
use crate::key_handler::KeyAction;
use crate::state::{Flow, SettingsState};

pub(crate) const DIRTY_REFRESH: &str =
    "repository has uncommitted changes — please commit or stash before refreshing";

impl SettingsModel {
    pub(super) fn manual_refresh_key(&mut self, key: KeyAction) -> Option<Command> {
        match Self::confirm_key(&key) {
            ConfirmOutcome::Yes => match self.selected_entry() {
                Ok(entry) => {
                    let path = entry.path.clone();
                    self.dirty_check(path, |request, result| {
                        SettingsMsg::RefreshDirtyResult { request, result }
                    })
                }
                Err(error) => {
                    self.fail(Flow::Refresh, error);
                    None
                }
            },
            ConfirmOutcome::No => {
                self.transition_back();
                None
            }
            ConfirmOutcome::Ignored => None,
        }
    }

    pub(super) fn on_refresh_dirty(&mut self, result: Result<bool>) -> Option<Command> {
        match result {
            Ok(false) => self.start_refresh(),
            Ok(true) => {
                self.fail(Flow::Refresh, SettingsError::precondition(DIRTY_REFRESH));
                None
            }
            Err(error) => {
                self.fail(Flow::Refresh, error);
                None
            }
        }
    }

    fn start_refresh(&mut self) -> Option<Command> {
        let entry = match self.selected_entry() {
            Ok(entry) => entry.clone(),
            Err(error) => {
                self.fail(Flow::Refresh, error);
                return None;
            }
        };
        let url = match entry.remote_url.clone() {
            Some(url) => url,
            None => {
                self.fail(
                    Flow::Refresh,
                    SettingsError::precondition("only remote repositories can be refreshed"),
                );
                return None;
            }
        };
        self.transition_to(SettingsState::RefreshInProgress);
        self.refresh_in_progress = true;
        let request = self.begin_request();
        let remote = Arc::clone(&self.deps.remote);
        self.issue(Task::new("refresh repository", move || SettingsMsg::RefreshDone {
            request,
            result: remote.fetch(&entry.path, &url, entry.branch.as_deref()),
        }))
    }

    pub(super) fn on_refresh_done(&mut self, result: Result<()>) -> Option<Command> {
        match result {
            Ok(()) => {
                tracing::info!("repository refreshed");
                self.transition_to(Flow::Refresh.terminal_state());
            }
            Err(error) => self.fail(Flow::Refresh, error),
        }
        None
    }
}
