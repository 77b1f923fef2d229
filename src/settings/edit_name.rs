use super::{Command, ConfirmOutcome, InputOutcome, SettingsModel};
use crate::input::InputSpec;
use crate::key_handler::KeyAction;
use crate::state::{Flow, SettingsState};
use crate::validation::{validate_name, MAX_NAME_LEN};

impl SettingsModel {
    /// Prefilled with the staged name when coming back from the confirmation,
    /// otherwise with the current name.
    pub(super) fn enter_update_name(&mut self) {
        let value = if self.scratch.edit_name.new_name.is_empty() {
            self.selected_entry()
                .map(|e| e.name.clone())
                .unwrap_or_default()
        } else {
            self.scratch.edit_name.new_name.clone()
        };
        self.transition_to(SettingsState::UpdateName);
        self.input
            .reset_to(InputSpec::new(value, "New name", MAX_NAME_LEN));
    }

    pub(super) fn update_name_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => {
                match validate_name(&raw, &self.config, self.selected.as_deref()) {
                    Ok(name) => {
                        self.scratch.edit_name.new_name = name;
                        self.transition_to(SettingsState::EditNameConfirm);
                    }
                    Err(error) => self.errors.set(error),
                }
            }
            InputOutcome::Back => self.transition_to(SettingsState::RepositoryActions),
            InputOutcome::Edited => {}
        }
        None
    }

    pub(super) fn edit_name_confirm_key(&mut self, key: KeyAction) -> Option<Command> {
        match Self::confirm_key(&key) {
            ConfirmOutcome::Yes => {
                let name = self.scratch.edit_name.new_name.clone();
                self.commit_entry_change(Flow::EditName, |entry| entry.name = name)
            }
            ConfirmOutcome::No => {
                self.enter_update_name();
                None
            }
            ConfirmOutcome::Ignored => None,
        }
    }
}
