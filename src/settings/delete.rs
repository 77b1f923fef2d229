use super::{Command, ConfirmOutcome, SettingsModel};
use crate::error::SettingsError;
use crate::key_handler::KeyAction;
use crate::state::Flow;

impl SettingsModel {
    /// Removes the entry from the configuration only; files on disk are left alone.
    pub(super) fn confirm_delete_key(&mut self, key: KeyAction) -> Option<Command> {
        match Self::confirm_key(&key) {
            ConfirmOutcome::Yes => {
                let mut next = self.config.clone();
                let removed = self.selected.as_deref().and_then(|id| next.remove(id));
                match removed {
                    Some(entry) => {
                        tracing::info!(id = %entry.id, name = %entry.name, "deleting repository");
                        self.commit(Flow::Delete, next)
                    }
                    None => {
                        let error = SettingsError::precondition(super::MISSING_SELECTION);
                        self.fail(Flow::Delete, error);
                        None
                    }
                }
            }
            ConfirmOutcome::No => {
                self.transition_back();
                None
            }
            ConfirmOutcome::Ignored => None,
        }
    }
}
