//! Add-Local: name, then path, then commit.

use super::{Command, InputOutcome, SettingsModel};
use crate::data::RepositoryEntry;
use crate::input::InputSpec;
use crate::key_handler::KeyAction;
use crate::state::{Flow, SettingsState};
use crate::validation::{validate_name, validate_path, MAX_NAME_LEN};

const PATH_LIMIT: usize = 4096;

impl SettingsModel {
    pub(super) fn enter_add_local_name(&mut self) {
        self.transition_to(SettingsState::AddLocalName);
        let value = self.scratch.add_local.name.clone();
        self.input
            .reset_to(InputSpec::new(value, "e.g. Team Rules", MAX_NAME_LEN));
    }

    fn enter_add_local_path(&mut self) {
        self.transition_to(SettingsState::AddLocalPath);
        let value = self.scratch.add_local.path.clone();
        self.input
            .reset_to(InputSpec::new(value, "e.g. ~/rules", PATH_LIMIT));
    }

    pub(super) fn add_local_name_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => match validate_name(&raw, &self.config, None) {
                Ok(name) => {
                    self.scratch.add_local.name = name;
                    self.enter_add_local_path();
                }
                Err(error) => self.errors.set(error),
            },
            InputOutcome::Back => self.transition_to(SettingsState::AddType),
            InputOutcome::Edited => {}
        }
        None
    }

    pub(super) fn add_local_path_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.edit_input(key) {
            InputOutcome::Accept(raw) => {
                match validate_path(&raw, self.deps.paths.as_ref(), &self.config, None) {
                    Ok(path) => {
                        self.scratch.add_local.path = path.clone();
                        let mut next = self.config.clone();
                        let entry = RepositoryEntry::local(
                            &next,
                            self.scratch.add_local.name.clone(),
                            path,
                            self.now(),
                        );
                        next.repositories.push(entry);
                        return self.commit(Flow::AddLocal, next);
                    }
                    Err(error) => self.errors.set(error),
                }
            }
            InputOutcome::Back => self.enter_add_local_name(),
            InputOutcome::Edited => {}
        }
        None
    }
}
