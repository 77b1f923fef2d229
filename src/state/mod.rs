//! State-machine vocabulary for the settings screens.
//!
//! Every screen is one [`SettingsState`]. States that belong to an editing flow
//! report it through [`SettingsState::flow`]; leaving a flow's region is what
//! clears that flow's scratch slots.
//!
//! # Layout
//!
//! ```text
//! MainMenu ─┬─ RepositoryActions ─┬─ UpdateName ─ EditNameConfirm          (EditNameError)
//!           │                     ├─ UpdateBranch ─ EditBranchConfirm      (EditBranchError)
//!           │                     ├─ UpdateClonePath ─ EditClonePathConfirm (EditClonePathError)
//!           │                     ├─ ConfirmDelete                          (DeleteError)
//!           │                     └─ ManualRefresh ─ RefreshInProgress     (RefreshError)
//!           ├─ AddType ─┬─ AddLocalName ─ AddLocalPath                      (AddLocalError)
//!           │           └─ AddRemoteName ─ URL ─ Branch ─ Path ─ PAT        (AddRemoteError)
//!           └─ UpdatePAT ─ UpdatePATConfirm                                 (UpdatePATError)
//! ```

mod scratch;

pub use scratch::{
    AddLocalScratch, AddRemoteScratch, EditBranchScratch, EditClonePathScratch, EditNameScratch,
    Scratch, UpdatePatScratch,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingsState {
    MainMenu,
    RepositoryActions,

    UpdatePat,
    UpdatePatConfirm,
    UpdatePatError,

    AddType,

    AddLocalName,
    AddLocalPath,
    AddLocalError,

    AddRemoteName,
    AddRemoteUrl,
    AddRemoteBranch,
    AddRemotePath,
    AddRemotePat,
    AddRemoteError,

    UpdateName,
    EditNameConfirm,
    EditNameError,

    UpdateBranch,
    EditBranchConfirm,
    EditBranchError,

    UpdateClonePath,
    EditClonePathConfirm,
    EditClonePathError,

    ConfirmDelete,
    DeleteError,

    ManualRefresh,
    RefreshInProgress,
    RefreshError,

    Complete,
}

/// The editing flows. Each owns one scratch record and one error substate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    AddLocal,
    AddRemote,
    EditName,
    EditBranch,
    EditClonePath,
    Delete,
    Refresh,
    UpdatePat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateKind {
    List,
    Input,
    Confirm,
    Error,
    Progress,
    Done,
}

impl SettingsState {
    pub fn flow(self) -> Option<Flow> {
        use SettingsState::*;
        match self {
            MainMenu | RepositoryActions | AddType | Complete => None,
            UpdatePat | UpdatePatConfirm | UpdatePatError => Some(Flow::UpdatePat),
            AddLocalName | AddLocalPath | AddLocalError => Some(Flow::AddLocal),
            AddRemoteName | AddRemoteUrl | AddRemoteBranch | AddRemotePath | AddRemotePat
            | AddRemoteError => Some(Flow::AddRemote),
            UpdateName | EditNameConfirm | EditNameError => Some(Flow::EditName),
            UpdateBranch | EditBranchConfirm | EditBranchError => Some(Flow::EditBranch),
            UpdateClonePath | EditClonePathConfirm | EditClonePathError => {
                Some(Flow::EditClonePath)
            }
            ConfirmDelete | DeleteError => Some(Flow::Delete),
            ManualRefresh | RefreshInProgress | RefreshError => Some(Flow::Refresh),
        }
    }

    pub fn kind(self) -> StateKind {
        use SettingsState::*;
        match self {
            MainMenu | RepositoryActions | AddType => StateKind::List,
            UpdatePat | AddLocalName | AddLocalPath | AddRemoteName | AddRemoteUrl
            | AddRemoteBranch | AddRemotePath | AddRemotePat | UpdateName | UpdateBranch
            | UpdateClonePath => StateKind::Input,
            UpdatePatConfirm | EditNameConfirm | EditBranchConfirm | EditClonePathConfirm
            | ConfirmDelete | ManualRefresh => StateKind::Confirm,
            UpdatePatError | AddLocalError | AddRemoteError | EditNameError | EditBranchError
            | EditClonePathError | DeleteError | RefreshError => StateKind::Error,
            RefreshInProgress => StateKind::Progress,
            Complete => StateKind::Done,
        }
    }

    pub fn is_error(self) -> bool {
        self.kind() == StateKind::Error
    }

    pub fn title(self) -> &'static str {
        use SettingsState::*;
        match self {
            MainMenu => "Repositories",
            RepositoryActions => "Repository",
            UpdatePat | UpdatePatConfirm | UpdatePatError => "Update GitHub Token",
            AddType => "Add Repository",
            AddLocalName | AddLocalPath | AddLocalError => "Add Local Repository",
            AddRemoteName | AddRemoteUrl | AddRemoteBranch | AddRemotePath | AddRemotePat
            | AddRemoteError => "Add GitHub Repository",
            UpdateName | EditNameConfirm | EditNameError => "Rename Repository",
            UpdateBranch | EditBranchConfirm | EditBranchError => "Change Branch",
            UpdateClonePath | EditClonePathConfirm | EditClonePathError => "Change Path",
            ConfirmDelete | DeleteError => "Delete Repository",
            ManualRefresh | RefreshInProgress | RefreshError => "Refresh Repository",
            Complete => "Done",
        }
    }

    pub fn help(self) -> &'static str {
        match self.kind() {
            StateKind::List => "↑↓ Select  ↵ Open  Esc Back",
            StateKind::Input => "↵ Accept  Esc Back  Ctrl+U Clear",
            StateKind::Confirm => "↵/y Confirm  Esc/n Back",
            StateKind::Error => "Press any key to continue",
            StateKind::Progress => "Please wait…  Ctrl+C Quit",
            StateKind::Done => "Press any key to return",
        }
    }
}

impl Flow {
    /// The error substate this flow routes precondition and collaborator failures to.
    pub fn error_state(self) -> SettingsState {
        match self {
            Flow::AddLocal => SettingsState::AddLocalError,
            Flow::AddRemote => SettingsState::AddRemoteError,
            Flow::EditName => SettingsState::EditNameError,
            Flow::EditBranch => SettingsState::EditBranchError,
            Flow::EditClonePath => SettingsState::EditClonePathError,
            Flow::Delete => SettingsState::DeleteError,
            Flow::Refresh => SettingsState::RefreshError,
            Flow::UpdatePat => SettingsState::UpdatePatError,
        }
    }

    /// Edit, delete and refresh act on the selected repository.
    pub fn needs_selection(self) -> bool {
        matches!(
            self,
            Flow::EditName | Flow::EditBranch | Flow::EditClonePath | Flow::Delete | Flow::Refresh
        )
    }

    /// Where a successful commit lands.
    pub fn terminal_state(self) -> SettingsState {
        match self {
            Flow::AddLocal | Flow::AddRemote | Flow::Refresh => SettingsState::MainMenu,
            _ => SettingsState::Complete,
        }
    }

    pub fn done_message(self) -> &'static str {
        match self {
            Flow::AddLocal | Flow::AddRemote => "Repository added",
            Flow::EditName => "Repository renamed",
            Flow::EditBranch => "Branch updated",
            Flow::EditClonePath => "Path updated",
            Flow::Delete => "Repository deleted",
            Flow::Refresh => "Repository refreshed",
            Flow::UpdatePat => "GitHub token updated",
        }
    }

    pub fn common_causes(self) -> &'static [&'static str] {
        match self {
            Flow::AddLocal => &[
                "The configuration file is not writable",
                "The disk is full",
            ],
            Flow::AddRemote => &[
                "The token is invalid, expired or lacks repo scope",
                "The repository URL is wrong or private",
                "No network connection",
                "The configuration file is not writable",
            ],
            Flow::EditName => &["The configuration file is not writable"],
            Flow::EditBranch => &[
                "Uncommitted changes in the clone (commit or stash them)",
                "The branch does not exist on the remote",
                "The repository has not been cloned yet (refresh it first)",
                "No network connection or an invalid token",
            ],
            Flow::EditClonePath => &[
                "Uncommitted changes in the current clone (commit or stash them)",
                "The configuration file is not writable",
            ],
            Flow::Delete => &["The configuration file is not writable"],
            Flow::Refresh => &[
                "Uncommitted changes in the clone (commit or stash them)",
                "Local commits that diverge from the remote",
                "No network connection or an invalid token",
            ],
            Flow::UpdatePat => &[
                "The token was mistyped or has expired",
                "The token lacks access to one of the configured repositories",
                "The system keychain is locked or unavailable",
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [SettingsState; 30] = [
        SettingsState::MainMenu,
        SettingsState::RepositoryActions,
        SettingsState::UpdatePat,
        SettingsState::UpdatePatConfirm,
        SettingsState::UpdatePatError,
        SettingsState::AddType,
        SettingsState::AddLocalName,
        SettingsState::AddLocalPath,
        SettingsState::AddLocalError,
        SettingsState::AddRemoteName,
        SettingsState::AddRemoteUrl,
        SettingsState::AddRemoteBranch,
        SettingsState::AddRemotePath,
        SettingsState::AddRemotePat,
        SettingsState::AddRemoteError,
        SettingsState::UpdateName,
        SettingsState::EditNameConfirm,
        SettingsState::EditNameError,
        SettingsState::UpdateBranch,
        SettingsState::EditBranchConfirm,
        SettingsState::EditBranchError,
        SettingsState::UpdateClonePath,
        SettingsState::EditClonePathConfirm,
        SettingsState::EditClonePathError,
        SettingsState::ConfirmDelete,
        SettingsState::DeleteError,
        SettingsState::ManualRefresh,
        SettingsState::RefreshInProgress,
        SettingsState::RefreshError,
        SettingsState::Complete,
    ];

    #[test]
    fn test_every_flow_has_exactly_one_error_state() {
        for state in ALL {
            if let Some(flow) = state.flow() {
                let errors: Vec<_> = ALL
                    .iter()
                    .filter(|s| s.flow() == Some(flow) && s.is_error())
                    .collect();
                assert_eq!(errors, vec![&flow.error_state()]);
            }
        }
    }

    #[test]
    fn test_error_states_belong_to_flows() {
        for state in ALL.iter().filter(|s| s.is_error()) {
            assert!(state.flow().is_some(), "{:?} has no flow", state);
        }
    }

    #[test]
    fn test_terminal_states() {
        assert_eq!(Flow::AddLocal.terminal_state(), SettingsState::MainMenu);
        assert_eq!(Flow::EditName.terminal_state(), SettingsState::Complete);
        assert!(Flow::Delete.needs_selection());
        assert!(!Flow::UpdatePat.needs_selection());
    }
}
