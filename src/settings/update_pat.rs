use std::sync::Arc;

use super::{Command, ConfirmOutcome, InputOutcome, SettingsModel, SettingsMsg, Task};
use crate::input::InputSpec;
use crate::key_handler::KeyAction;
use crate::state::{Flow, SettingsState};
use crate::validation::validate_secret;

const TOKEN_LIMIT: usize = 255;

impl SettingsModel {
    pub(super) fn enter_update_pat(&mut self) {
        let value = self.scratch.update_pat.new_secret.clone();
        self.transition_to(SettingsState::UpdatePat);
        self.input
            .reset_to(InputSpec::new(value, "ghp_…", TOKEN_LIMIT).masked());
    }

    pub(super) fn update_pat_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => {
                match validate_secret(&raw, self.deps.credentials.as_ref()) {
                    Ok(secret) => {
                        self.scratch.update_pat.new_secret = secret;
                        self.transition_to(SettingsState::UpdatePatConfirm);
                    }
                    Err(error) => self.errors.set(error),
                }
            }
            InputOutcome::Back => self.transition_to(SettingsState::MainMenu),
            InputOutcome::Edited => {}
        }
        None
    }

    /// The token is checked against every configured remote before it replaces
    /// the stored one.
    pub(super) fn update_pat_confirm_key(&mut self, key: KeyAction) -> Option<Command> {
        match Self::confirm_key(&key) {
            ConfirmOutcome::Yes => {
                let secret = self.scratch.update_pat.new_secret.clone();
                let urls = self.config.remote_urls();
                let credentials = Arc::clone(&self.deps.credentials);
                self.issue_commit(Task::new("update token", move || {
                    let flow = Flow::UpdatePat;
                    let checked = if urls.is_empty() {
                        Ok(())
                    } else {
                        credentials.validate_against_remotes(&secret, &urls)
                    };
                    match checked.and_then(|_| credentials.store(&secret)) {
                        Ok(()) => SettingsMsg::SettingsComplete { flow, config: None },
                        Err(error) => SettingsMsg::failed(flow, error),
                    }
                }))
            }
            ConfirmOutcome::No => {
                self.enter_update_pat();
                None
            }
            ConfirmOutcome::Ignored => None,
        }
    }
}
