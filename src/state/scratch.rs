//! Per-flow staging slots.
//!
//! Each flow reads and writes only its own record. Resetting one flow never touches
//! another flow's record, so leftovers from an abandoned flow survive until that flow
//! itself is entered and left again.

use super::Flow;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddLocalScratch {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddRemoteScratch {
    pub name: String,
    pub url: String,
    /// Empty means the remote's default branch.
    pub branch: String,
    pub path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditNameScratch {
    pub new_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditBranchScratch {
    pub new_branch: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditClonePathScratch {
    pub new_path: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdatePatScratch {
    pub new_secret: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scratch {
    pub add_local: AddLocalScratch,
    pub add_remote: AddRemoteScratch,
    pub edit_name: EditNameScratch,
    pub edit_branch: EditBranchScratch,
    pub edit_clone_path: EditClonePathScratch,
    pub update_pat: UpdatePatScratch,
}

impl Scratch {
    pub fn reset(&mut self, flow: Flow) {
        match flow {
            Flow::AddLocal => self.add_local = AddLocalScratch::default(),
            Flow::AddRemote => self.add_remote = AddRemoteScratch::default(),
            Flow::EditName => self.edit_name = EditNameScratch::default(),
            Flow::EditBranch => self.edit_branch = EditBranchScratch::default(),
            Flow::EditClonePath => self.edit_clone_path = EditClonePathScratch::default(),
            Flow::UpdatePat => self.update_pat = UpdatePatScratch::default(),
            // no staging slots
            Flow::Delete | Flow::Refresh => {}
        }
    }

    pub fn is_empty(&self, flow: Flow) -> bool {
        match flow {
            Flow::AddLocal => self.add_local == AddLocalScratch::default(),
            Flow::AddRemote => self.add_remote == AddRemoteScratch::default(),
            Flow::EditName => self.edit_name == EditNameScratch::default(),
            Flow::EditBranch => self.edit_branch == EditBranchScratch::default(),
            Flow::EditClonePath => self.edit_clone_path == EditClonePathScratch::default(),
            Flow::UpdatePat => self.update_pat == UpdatePatScratch::default(),
            Flow::Delete | Flow::Refresh => true,
        }
    }
}
