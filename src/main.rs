use std::sync::Arc;
use std::time::Duration;

use ratatui::DefaultTerminal;
use tracing::{error, info};

use rulem::async_task::TaskManager;
use rulem::credentials::{CredentialStore, KeyringCredentialStore};
use rulem::git::GitRemoteOps;
use rulem::key_handler::{AppEvent, KeyHandler};
use rulem::logging;
use rulem::paths::SystemPathOps;
use rulem::screen::Screen;
use rulem::settings::{Collaborators, Command, SettingsModel, SettingsMsg};
use rulem::store::JsonConfigStore;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    // Logging is best-effort; the UI still runs without a log file.
    let _log_guard = logging::init().ok();

    let store = JsonConfigStore::from_env();
    info!(config = %store.path().display(), "starting rulem settings");

    let credentials: Arc<dyn CredentialStore> = Arc::new(KeyringCredentialStore::new());
    let deps = Collaborators {
        config_store: Arc::new(store),
        credentials: credentials.clone(),
        remote: Arc::new(GitRemoteOps::new(credentials)),
        paths: Arc::new(SystemPathOps::new()),
    };

    let terminal = ratatui::init();
    let result = App::new(SettingsModel::new(deps)).run(terminal);
    ratatui::restore();
    if let Err(err) = &result {
        error!(error = %err, "settings exited with an error");
    }
    result
}

pub struct App {
    running: bool,
    model: SettingsModel,
    screen: Screen,
    key_handler: KeyHandler,
    tasks: TaskManager,
}

impl App {
    pub fn new(model: SettingsModel) -> Self {
        Self {
            running: false,
            model,
            screen: Screen::new(),
            key_handler: KeyHandler::new(),
            tasks: TaskManager::new(),
        }
    }

    pub fn run(mut self, mut terminal: DefaultTerminal) -> color_eyre::Result<()> {
        self.running = true;

        let size = terminal.size()?;
        self.dispatch(SettingsMsg::Resize {
            width: size.width,
            height: size.height,
        });
        let init = self.model.init();
        self.execute(init);

        while self.running {
            terminal.draw(|frame| self.screen.render(frame, &self.model))?;

            match self.key_handler.handle_crossterm_events(POLL_INTERVAL)? {
                Some(AppEvent::Key(action)) => self.dispatch(SettingsMsg::Key(action)),
                Some(AppEvent::Resize(width, height)) => {
                    self.dispatch(SettingsMsg::Resize { width, height })
                }
                None => {}
            }

            while let Some(msg) = self.tasks.try_recv() {
                self.dispatch(msg);
            }
        }
        Ok(())
    }

    fn dispatch(&mut self, msg: SettingsMsg) {
        let command = self.model.update(msg);
        self.execute(command);
    }

    fn execute(&mut self, command: Option<Command>) {
        match command {
            Some(Command::Task(task)) => self.tasks.spawn(task),
            Some(Command::Quit) | Some(Command::ExitToParent) => self.quit(),
            None => {}
        }
    }

    fn quit(&mut self) {
        self.running = false;
    }
}
