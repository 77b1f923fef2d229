use super::SettingsModel;
use crate::state::{Flow, SettingsState};

impl SettingsModel {
    /// Any key on an error screen abandons the attempt and restarts the flow from
    /// its entry point with empty scratch.
    pub(super) fn dismiss_error(&mut self) {
        let Some(flow) = self.state.flow() else {
            return;
        };
        self.errors.clear();
        self.scratch.reset(flow);
        match flow {
            Flow::AddLocal => self.enter_add_local_name(),
            Flow::AddRemote => self.enter_add_remote_name(),
            Flow::UpdatePat => self.enter_update_pat(),
            Flow::EditName | Flow::EditBranch | Flow::EditClonePath | Flow::Delete => {
                self.transition_to(SettingsState::RepositoryActions)
            }
            Flow::Refresh => {
                self.refresh_in_progress = false;
                self.transition_to(SettingsState::RepositoryActions)
            }
        }
    }
}
