//! Edit-Branch: validate, refuse on a dirty clone, confirm, then check the branch
//! exists remotely before saving. A fetch afterwards is best effort.

use std::sync::Arc;

use tracing::warn;

use super::{Command, ConfirmOutcome, InputOutcome, SettingsModel, SettingsMsg, Task};
use crate::error::{Result, SettingsError};
use crate::input::InputSpec;
use crate::key_handler::KeyAction;
use crate::state::{Flow, SettingsState};
use crate::validation::validate_branch;

pub(crate) const DIRTY_BRANCH: &str =
    "repository has uncommitted changes — please commit or stash before changing branch";

const BRANCH_LIMIT: usize = 255;

impl SettingsModel {
    pub(super) fn enter_update_branch(&mut self) {
        let value = if self.scratch.edit_branch.new_branch.is_empty() {
            self.selected_entry()
                .ok()
                .and_then(|e| e.branch.clone())
                .unwrap_or_default()
        } else {
            self.scratch.edit_branch.new_branch.clone()
        };
        self.transition_to(SettingsState::UpdateBranch);
        self.input.reset_to(InputSpec::new(
            value,
            "leave empty for the default branch",
            BRANCH_LIMIT,
        ));
    }

    pub(super) fn update_branch_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => match validate_branch(&raw) {
                Ok(branch) => {
                    self.scratch.edit_branch.new_branch = branch.unwrap_or_default();
                    let path = match self.selected_entry() {
                        Ok(entry) => entry.path.clone(),
                        Err(error) => {
                            self.fail(Flow::EditBranch, error);
                            return None;
                        }
                    };
                    return self.dirty_check(path, |request, result| {
                        SettingsMsg::EditBranchDirtyResult { request, result }
                    });
                }
                Err(error) => self.fail(Flow::EditBranch, error),
            },
            InputOutcome::Back => self.transition_to(SettingsState::RepositoryActions),
            InputOutcome::Edited => {}
        }
        None
    }

    pub(super) fn on_edit_branch_dirty(&mut self, result: Result<bool>) -> Option<Command> {
        match result {
            Ok(false) => self.transition_to(SettingsState::EditBranchConfirm),
            Ok(true) => self.fail(Flow::EditBranch, SettingsError::precondition(DIRTY_BRANCH)),
            Err(error) => self.fail(Flow::EditBranch, error),
        }
        None
    }

    pub(super) fn edit_branch_confirm_key(&mut self, key: KeyAction) -> Option<Command> {
        match Self::confirm_key(&key) {
            ConfirmOutcome::Yes => self.save_branch(),
            ConfirmOutcome::No => {
                self.enter_update_branch();
                None
            }
            ConfirmOutcome::Ignored => None,
        }
    }

    fn save_branch(&mut self) -> Option<Command> {
        let flow = Flow::EditBranch;
        let staged = self.scratch.edit_branch.new_branch.clone();
        let branch = (!staged.is_empty()).then_some(staged);

        let mut next = self.config.clone();
        let entry = match self.selected.as_deref().and_then(|id| next.find_mut(id)) {
            Some(entry) => {
                entry.branch = branch.clone();
                entry.clone()
            }
            None => {
                let error = SettingsError::precondition(super::MISSING_SELECTION);
                self.fail(flow, error);
                return None;
            }
        };
        let url = entry.remote_url.clone().unwrap_or_default();

        let remote = Arc::clone(&self.deps.remote);
        let store = Arc::clone(&self.deps.config_store);
        self.issue_commit(Task::new("change branch", move || {
            let checked = match branch.as_deref() {
                Some(b) => remote.remote_branch_exists(&entry.path, b),
                None => Ok(()),
            };
            let saved = checked
                .and_then(|_| next.check_invariants())
                .and_then(|_| store.save(&next));
            if let Err(error) = saved {
                return SettingsMsg::failed(flow, error);
            }
            if let Err(error) = remote.fetch(&entry.path, &url, branch.as_deref()) {
                warn!(%error, path = %entry.path, "fetch after branch change failed");
            }
            SettingsMsg::SettingsComplete {
                flow,
                config: Some(next),
            }
        }))
    }
}
