//! Settings screens for managing rules repositories.

pub mod async_task;
pub mod credentials;
pub mod data;
pub mod error;
pub mod git;
pub mod input;
pub mod key_handler;
pub mod logging;
pub mod pages;
pub mod paths;
pub mod screen;
pub mod settings;
pub mod state;
pub mod status_symbols;
pub mod store;
pub mod ui_utils;
pub mod validation;

pub use data::{Config, RepositoryEntry, RepositoryKind};
pub use error::{Result, SettingsError};
pub use settings::{Collaborators, Command, SettingsModel, SettingsMsg};
pub use state::{Flow, SettingsState};
