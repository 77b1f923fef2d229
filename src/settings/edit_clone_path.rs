use super::{Command, ConfirmOutcome, InputOutcome, SettingsModel, SettingsMsg};
use crate::error::{Result, SettingsError};
use crate::input::InputSpec;
use crate::key_handler::KeyAction;
use crate::state::{Flow, SettingsState};
use crate::validation::validate_path;

pub(crate) const DIRTY_CLONE_PATH: &str =
    "repository has uncommitted changes — please commit or stash before changing clone path";

const PATH_LIMIT: usize = 4096;

impl SettingsModel {
    pub(super) fn enter_update_clone_path(&mut self) {
        let value = if self.scratch.edit_clone_path.new_path.is_empty() {
            self.selected_entry()
                .map(|e| e.path.clone())
                .unwrap_or_default()
        } else {
            self.scratch.edit_clone_path.new_path.clone()
        };
        self.transition_to(SettingsState::UpdateClonePath);
        self.input
            .reset_to(InputSpec::new(value, "New path", PATH_LIMIT));
    }

    pub(super) fn update_clone_path_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => {
                let checked = validate_path(
                    &raw,
                    self.deps.paths.as_ref(),
                    &self.config,
                    self.selected.as_deref(),
                );
                match checked {
                    Ok(path) => {
                        self.scratch.edit_clone_path.new_path = path;
                        let (remote, current) = match self.selected_entry() {
                            Ok(entry) => (entry.is_remote(), entry.path.clone()),
                            Err(error) => {
                                self.fail(Flow::EditClonePath, error);
                                return None;
                            }
                        };
                        // local entries have no clone to protect
                        if remote {
                            return self.dirty_check(current, |request, result| {
                                SettingsMsg::EditClonePathDirtyResult { request, result }
                            });
                        }
                        self.transition_to(SettingsState::EditClonePathConfirm);
                    }
                    Err(error) => self.errors.set(error),
                }
            }
            InputOutcome::Back => self.transition_to(SettingsState::RepositoryActions),
            InputOutcome::Edited => {}
        }
        None
    }

    pub(super) fn on_edit_clone_path_dirty(&mut self, result: Result<bool>) -> Option<Command> {
        match result {
            Ok(false) => self.transition_to(SettingsState::EditClonePathConfirm),
            Ok(true) => self.fail(
                Flow::EditClonePath,
                SettingsError::precondition(DIRTY_CLONE_PATH),
            ),
            Err(error) => self.fail(Flow::EditClonePath, error),
        }
        None
    }

    pub(super) fn edit_clone_path_confirm_key(&mut self, key: KeyAction) -> Option<Command> {
        match Self::confirm_key(&key) {
            ConfirmOutcome::Yes => {
                let path = self.scratch.edit_clone_path.new_path.clone();
                self.commit_entry_change(Flow::EditClonePath, |entry| entry.path = path)
            }
            ConfirmOutcome::No => {
                self.enter_update_clone_path();
                None
            }
            ConfirmOutcome::Ignored => None,
        }
    }
}
