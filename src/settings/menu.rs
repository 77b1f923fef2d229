//! List screens: the repository list, the per-repository action menu and the
//! add-type picker.

use super::{Command, ListOutcome, SettingsModel};
use crate::data::RepositoryEntry;
use crate::key_handler::KeyAction;
use crate::state::SettingsState;

pub const ADD_TYPES: [&str; 2] = ["Local directory", "GitHub repository"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuItem {
    /// Index into the configuration's repository list.
    Repository(usize),
    AddRepository,
    UpdateToken,
}

impl MenuItem {
    pub fn label(self, entries: &[RepositoryEntry]) -> String {
        match self {
            MenuItem::Repository(i) => entries
                .get(i)
                .map(|e| format!("{} ({})", e.name, e.kind.label()))
                .unwrap_or_default(),
            MenuItem::AddRepository => "+ Add repository".to_string(),
            MenuItem::UpdateToken => "Update GitHub token".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepositoryAction {
    EditName,
    EditPath,
    EditBranch,
    Refresh,
    Delete,
    Back,
}

impl RepositoryAction {
    pub fn for_entry(entry: &RepositoryEntry) -> Vec<RepositoryAction> {
        let mut actions = vec![RepositoryAction::EditName, RepositoryAction::EditPath];
        if entry.is_remote() {
            actions.push(RepositoryAction::EditBranch);
            actions.push(RepositoryAction::Refresh);
        }
        actions.push(RepositoryAction::Delete);
        actions.push(RepositoryAction::Back);
        actions
    }

    pub fn applies_to(self, entry: &RepositoryEntry) -> bool {
        match self {
            RepositoryAction::EditBranch | RepositoryAction::Refresh => entry.is_remote(),
            _ => true,
        }
    }

    pub fn label(self, entry: &RepositoryEntry) -> &'static str {
        match self {
            RepositoryAction::EditName => "Rename",
            RepositoryAction::EditPath if entry.is_remote() => "Change clone path",
            RepositoryAction::EditPath => "Change path",
            RepositoryAction::EditBranch => "Change branch",
            RepositoryAction::Refresh => "Refresh now",
            RepositoryAction::Delete => "Delete",
            RepositoryAction::Back => "Back",
        }
    }
}

impl SettingsModel {
    pub fn menu_items(&self) -> Vec<MenuItem> {
        let mut items: Vec<MenuItem> = (0..self.config.repositories.len())
            .map(MenuItem::Repository)
            .collect();
        items.push(MenuItem::AddRepository);
        items.push(MenuItem::UpdateToken);
        items
    }

    pub fn repository_actions(&self) -> Vec<RepositoryAction> {
        self.selected_entry()
            .map(RepositoryAction::for_entry)
            .unwrap_or_else(|_| vec![RepositoryAction::Back])
    }

    /// Number of rows in the current list screen.
    pub(crate) fn list_len(&self) -> usize {
        match self.state {
            SettingsState::MainMenu => self.menu_items().len(),
            SettingsState::RepositoryActions => self.repository_actions().len(),
            SettingsState::AddType => ADD_TYPES.len(),
            _ => 0,
        }
    }

    pub(super) fn main_menu_key(&mut self, key: KeyAction) -> Option<Command> {
        let items = self.menu_items();
        match self.navigate(&key, items.len()) {
            ListOutcome::Select => match items.get(self.cursor).copied() {
                Some(MenuItem::Repository(i)) => {
                    let id = self.config.repositories.get(i).map(|e| e.id.clone());
                    if let Some(id) = id {
                        self.transition_to(SettingsState::RepositoryActions);
                        self.selected = Some(id);
                    }
                    None
                }
                Some(MenuItem::AddRepository) => {
                    self.transition_to(SettingsState::AddType);
                    None
                }
                Some(MenuItem::UpdateToken) => {
                    self.enter_update_pat();
                    None
                }
                None => None,
            },
            ListOutcome::Back => Some(Command::ExitToParent),
            ListOutcome::Moved => None,
        }
    }

    pub(super) fn add_type_key(&mut self, key: KeyAction) -> Option<Command> {
        match self.navigate(&key, ADD_TYPES.len()) {
            ListOutcome::Select => {
                if self.cursor == 0 {
                    self.enter_add_local_name();
                } else {
                    self.enter_add_remote_name();
                }
            }
            ListOutcome::Back => self.transition_to(SettingsState::MainMenu),
            ListOutcome::Moved => {}
        }
        None
    }

    pub(super) fn repository_actions_key(&mut self, key: KeyAction) -> Option<Command> {
        let actions = self.repository_actions();
        match self.navigate(&key, actions.len()) {
            ListOutcome::Select => {
                if let Some(action) = actions.get(self.cursor).copied() {
                    self.start_action(action);
                }
            }
            ListOutcome::Back => self.transition_to(SettingsState::MainMenu),
            ListOutcome::Moved => {}
        }
        None
    }

    /// Enters the flow for `action` on the selected repository.
    pub(crate) fn start_action(&mut self, action: RepositoryAction) {
        if action == RepositoryAction::Back {
            self.transition_to(SettingsState::MainMenu);
            return;
        }
        let entry = match self.selected_entry() {
            Ok(entry) => entry.clone(),
            Err(error) => {
                self.errors.set(error);
                return;
            }
        };
        if !action.applies_to(&entry) {
            self.unknown_change(format!("{:?} on a {} repository", action, entry.kind.label()));
            return;
        }
        match action {
            RepositoryAction::EditName => self.enter_update_name(),
            RepositoryAction::EditPath => self.enter_update_clone_path(),
            RepositoryAction::EditBranch => self.enter_update_branch(),
            RepositoryAction::Refresh => self.transition_to(SettingsState::ManualRefresh),
            RepositoryAction::Delete => self.transition_to(SettingsState::ConfirmDelete),
            RepositoryAction::Back => {}
        }
    }
}
