//! The settings screen as an Elm-style state machine.
//!
//! [`SettingsModel::update`] consumes one [`SettingsMsg`] (a key press, a resize or
//! the result of a background [`Task`]) and returns at most one [`Command`] for the
//! host loop to execute. The model never blocks: every collaborator call that may
//! touch the network, the keychain or the disk is wrapped in a `Task`.
//!
//! Flows live in their own modules and only ever touch their own scratch record.
//! Results of background tasks are routed by [`dispatch`] and applied only while the
//! model is still in the state (or flow) that issued them.

mod add_local;
mod add_remote;
mod delete;
mod dispatch;
mod edit_branch;
mod edit_clone_path;
mod edit_name;
mod errors;
mod menu;
mod refresh;
mod update_pat;

#[cfg(test)]
pub(crate) mod test_support;

use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};
use tui_input::InputRequest;

use crate::credentials::CredentialStore;
use crate::data::{Config, RepositoryEntry};
use crate::error::{Result, SettingsError};
use crate::git::RemoteOps;
use crate::input::InputWidget;
use crate::key_handler::KeyAction;
use crate::paths::PathOps;
use crate::state::{Flow, Scratch, SettingsState};
use crate::store::ConfigStore;

pub use menu::{MenuItem, RepositoryAction, ADD_TYPES};

/// External services the model talks to. Shared with worker threads.
#[derive(Clone)]
pub struct Collaborators {
    pub config_store: Arc<dyn ConfigStore>,
    pub credentials: Arc<dyn CredentialStore>,
    pub remote: Arc<dyn RemoteOps>,
    pub paths: Arc<dyn PathOps>,
}

/// Deferred work; running it yields the message to feed back into the model.
pub struct Task {
    name: &'static str,
    job: Box<dyn FnOnce() -> SettingsMsg + Send>,
}

impl Task {
    pub fn new(name: &'static str, job: impl FnOnce() -> SettingsMsg + Send + 'static) -> Self {
        Self {
            name,
            job: Box::new(job),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn run(self) -> SettingsMsg {
        (self.job)()
    }
}

impl fmt::Debug for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("name", &self.name).finish()
    }
}

#[derive(Debug)]
pub enum Command {
    /// Terminate the whole program.
    Quit,
    /// Leave the settings screen and return to the parent menu.
    ExitToParent,
    Task(Task),
}

#[derive(Debug)]
pub enum SettingsMsg {
    Key(KeyAction),
    Resize { width: u16, height: u16 },
    ConfigLoaded(Result<Config>),
    /// A flow committed. `config` is the snapshot that was persisted, if any.
    SettingsComplete { flow: Flow, config: Option<Config> },
    AddLocalError(SettingsError),
    AddRemoteError(SettingsError),
    EditNameError(SettingsError),
    EditBranchError(SettingsError),
    EditClonePathError(SettingsError),
    DeleteError(SettingsError),
    UpdatePatError(SettingsError),
    RefreshError(SettingsError),
    /// `request` is the id handed out when the check was issued.
    EditBranchDirtyResult { request: u64, result: Result<bool> },
    EditClonePathDirtyResult { request: u64, result: Result<bool> },
    RefreshDirtyResult { request: u64, result: Result<bool> },
    RefreshDone { request: u64, result: Result<()> },
    AddRemotePatNeeded,
}

impl SettingsMsg {
    /// The error event of `flow`.
    pub fn failed(flow: Flow, error: SettingsError) -> Self {
        match flow {
            Flow::AddLocal => SettingsMsg::AddLocalError(error),
            Flow::AddRemote => SettingsMsg::AddRemoteError(error),
            Flow::EditName => SettingsMsg::EditNameError(error),
            Flow::EditBranch => SettingsMsg::EditBranchError(error),
            Flow::EditClonePath => SettingsMsg::EditClonePathError(error),
            Flow::Delete => SettingsMsg::DeleteError(error),
            Flow::Refresh => SettingsMsg::RefreshError(error),
            Flow::UpdatePat => SettingsMsg::UpdatePatError(error),
        }
    }
}

/// Last error shown by the current view.
#[derive(Debug, Clone, Default)]
pub struct ErrorSurface {
    error: Option<SettingsError>,
}

impl ErrorSurface {
    pub fn set(&mut self, error: SettingsError) {
        self.error = Some(error);
    }

    pub fn clear(&mut self) {
        self.error = None;
    }

    pub fn get(&self) -> Option<&SettingsError> {
        self.error.as_ref()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayoutSize {
    pub width: u16,
    pub height: u16,
}

impl Default for LayoutSize {
    fn default() -> Self {
        Self {
            width: 80,
            height: 24,
        }
    }
}

pub(crate) enum InputOutcome {
    Accept(String),
    Back,
    Edited,
}

pub(crate) enum ConfirmOutcome {
    Yes,
    No,
    Ignored,
}

pub(crate) enum ListOutcome {
    Select,
    Back,
    Moved,
}

const MISSING_SELECTION: &str = "the selected repository no longer exists";
const COMMIT_BUSY: &str = "another change is still being saved, try again when it finishes";

pub struct SettingsModel {
    config: Config,
    state: SettingsState,
    previous_state: SettingsState,
    cursor: usize,
    selected: Option<String>,
    scratch: Scratch,
    input: InputWidget,
    errors: ErrorSurface,
    layout: LayoutSize,
    awaiting: bool,
    /// Survives transitions; cleared only by the commit's own result.
    commit_in_flight: bool,
    next_request: u64,
    pending_request: Option<u64>,
    refresh_in_progress: bool,
    deps: Collaborators,
    clock: fn() -> i64,
}

fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}

impl SettingsModel {
    pub fn new(deps: Collaborators) -> Self {
        Self {
            config: Config::default(),
            state: SettingsState::MainMenu,
            previous_state: SettingsState::MainMenu,
            cursor: 0,
            selected: None,
            scratch: Scratch::default(),
            input: InputWidget::new(),
            errors: ErrorSurface::default(),
            layout: LayoutSize::default(),
            awaiting: false,
            commit_in_flight: false,
            next_request: 0,
            pending_request: None,
            refresh_in_progress: false,
            deps,
            clock: unix_now,
        }
    }

    /// Overrides the timestamp source used for new entries.
    pub fn with_clock(mut self, clock: fn() -> i64) -> Self {
        self.clock = clock;
        self
    }

    /// First command to run: loads the persisted configuration.
    pub fn init(&self) -> Option<Command> {
        Some(self.reload_command())
    }

    pub fn state(&self) -> SettingsState {
        self.state
    }

    pub fn previous_state(&self) -> SettingsState {
        self.previous_state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn scratch(&self) -> &Scratch {
        &self.scratch
    }

    pub fn input(&self) -> &InputWidget {
        &self.input
    }

    pub fn error(&self) -> Option<&SettingsError> {
        self.errors.get()
    }

    pub fn layout(&self) -> LayoutSize {
        self.layout
    }

    pub fn is_awaiting(&self) -> bool {
        self.awaiting
    }

    pub fn is_committing(&self) -> bool {
        self.commit_in_flight
    }

    pub fn refresh_in_progress(&self) -> bool {
        self.refresh_in_progress
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn selected_entry(&self) -> Result<&RepositoryEntry> {
        self.selected
            .as_deref()
            .and_then(|id| self.config.find(id))
            .ok_or_else(|| SettingsError::precondition(MISSING_SELECTION))
    }

    /// Moves to `next`, remembering the current state for [`Self::transition_back`].
    ///
    /// Clears the error surface, the list cursor and any outstanding check. Leaving a
    /// flow's region resets that flow's scratch; other flows' scratch is untouched.
    pub(crate) fn transition_to(&mut self, next: SettingsState) {
        if let Some(leaving) = self.state.flow() {
            if next.flow() != Some(leaving) {
                self.scratch.reset(leaving);
            }
        }
        debug!(from = ?self.state, to = ?next, "settings transition");
        self.previous_state = self.state;
        self.state = next;
        self.errors.clear();
        self.cursor = 0;
        self.awaiting = false;
        self.pending_request = None;
        if next == SettingsState::MainMenu {
            self.selected = None;
        }
    }

    /// Swaps the current and previous states.
    pub(crate) fn transition_back(&mut self) {
        let previous = self.previous_state;
        self.transition_to(previous);
    }

    /// Routes a precondition or collaborator failure to the flow's error substate.
    pub(crate) fn fail(&mut self, flow: Flow, error: SettingsError) {
        warn!(?flow, %error, "settings flow failed");
        self.transition_to(flow.error_state());
        self.errors.set(error);
    }

    pub(crate) fn issue(&mut self, task: Task) -> Option<Command> {
        self.awaiting = true;
        Some(Command::Task(task))
    }

    /// Issues a task that persists a change. At most one is outstanding; further
    /// commits are refused with an inline error until its result arrives.
    pub(crate) fn issue_commit(&mut self, task: Task) -> Option<Command> {
        if self.commit_in_flight {
            debug!(state = ?self.state, "refusing commit while another is being saved");
            self.errors.set(SettingsError::precondition(COMMIT_BUSY));
            return None;
        }
        self.commit_in_flight = true;
        self.issue(task)
    }

    pub(crate) fn commit_settled(&mut self) {
        self.commit_in_flight = false;
    }

    /// Hands out the id a dirty check or fetch result must carry to be applied.
    pub(crate) fn begin_request(&mut self) -> u64 {
        self.next_request += 1;
        self.pending_request = Some(self.next_request);
        self.next_request
    }

    /// True when `request` is the outstanding one and the model is still in `state`.
    /// Consumes the request on success.
    pub(crate) fn take_request(&mut self, state: SettingsState, request: u64) -> bool {
        if self.state == state && self.pending_request == Some(request) {
            self.pending_request = None;
            true
        } else {
            false
        }
    }

    pub(crate) fn reload_command(&self) -> Command {
        let store = Arc::clone(&self.deps.config_store);
        Command::Task(Task::new("load configuration", move || {
            SettingsMsg::ConfigLoaded(store.load())
        }))
    }

    /// Persists `next` in the background; success adopts it and ends `flow`.
    pub(crate) fn commit(&mut self, flow: Flow, next: Config) -> Option<Command> {
        let store = Arc::clone(&self.deps.config_store);
        self.issue_commit(Task::new("save configuration", move || {
            match next.check_invariants().and_then(|_| store.save(&next)) {
                Ok(()) => SettingsMsg::SettingsComplete {
                    flow,
                    config: Some(next),
                },
                Err(error) => SettingsMsg::failed(flow, error),
            }
        }))
    }

    /// Applies `change` to the selected entry of a copy of the configuration and commits it.
    pub(crate) fn commit_entry_change(
        &mut self,
        flow: Flow,
        change: impl FnOnce(&mut RepositoryEntry),
    ) -> Option<Command> {
        let mut next = self.config.clone();
        match self.selected.as_deref().and_then(|id| next.find_mut(id)) {
            Some(entry) => {
                change(entry);
                self.commit(flow, next)
            }
            None => {
                self.fail(flow, SettingsError::precondition(MISSING_SELECTION));
                None
            }
        }
    }

    pub(crate) fn dirty_check(
        &mut self,
        path: String,
        wrap: fn(u64, Result<bool>) -> SettingsMsg,
    ) -> Option<Command> {
        let request = self.begin_request();
        let remote = Arc::clone(&self.deps.remote);
        self.issue(Task::new("check working tree", move || {
            wrap(request, remote.is_dirty(&path))
        }))
    }

    pub(crate) fn now(&self) -> i64 {
        (self.clock)()
    }

    pub(crate) fn resize(&mut self, width: u16, height: u16) {
        self.layout = LayoutSize { width, height };
        self.input.set_width(width.saturating_sub(8).min(72));
    }

    pub(crate) fn edit_input(&mut self, key: KeyAction) -> InputOutcome {
        let req = match key {
            KeyAction::Select => return InputOutcome::Accept(self.input.value().to_string()),
            KeyAction::Back => return InputOutcome::Back,
            KeyAction::InputChar(c) => InputRequest::InsertChar(c),
            KeyAction::Backspace => InputRequest::DeletePrevChar,
            KeyAction::Delete => InputRequest::DeleteNextChar,
            KeyAction::DeleteWord => InputRequest::DeletePrevWord,
            KeyAction::ClearLine => InputRequest::DeleteLine,
            KeyAction::NavigateLeft => InputRequest::GoToPrevChar,
            KeyAction::NavigateRight => InputRequest::GoToNextChar,
            KeyAction::WordLeft => InputRequest::GoToPrevWord,
            KeyAction::WordRight => InputRequest::GoToNextWord,
            KeyAction::Home => InputRequest::GoToStart,
            KeyAction::End => InputRequest::GoToEnd,
            _ => return InputOutcome::Edited,
        };
        self.input.handle(req);
        InputOutcome::Edited
    }

    pub(crate) fn confirm_key(key: &KeyAction) -> ConfirmOutcome {
        match key {
            KeyAction::Select | KeyAction::InputChar('y' | 'Y') => ConfirmOutcome::Yes,
            KeyAction::Back | KeyAction::InputChar('n' | 'N') => ConfirmOutcome::No,
            _ => ConfirmOutcome::Ignored,
        }
    }

    /// Up/down movement clamped to `len` items.
    pub(crate) fn navigate(&mut self, key: &KeyAction, len: usize) -> ListOutcome {
        match key {
            KeyAction::Select => ListOutcome::Select,
            KeyAction::Back => ListOutcome::Back,
            KeyAction::NavigateUp | KeyAction::InputChar('k') => {
                self.cursor = self.cursor.saturating_sub(1);
                ListOutcome::Moved
            }
            KeyAction::NavigateDown | KeyAction::InputChar('j') => {
                if self.cursor + 1 < len {
                    self.cursor += 1;
                }
                ListOutcome::Moved
            }
            KeyAction::Home => {
                self.cursor = 0;
                ListOutcome::Moved
            }
            KeyAction::End => {
                self.cursor = len.saturating_sub(1);
                ListOutcome::Moved
            }
            _ => ListOutcome::Moved,
        }
    }
}
