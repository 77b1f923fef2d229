use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// A key press normalised for the settings screens.
///
/// Printable characters always arrive as [`KeyAction::InputChar`]; list and
/// confirmation screens interpret `j`/`k`/`y`/`n` themselves so that those letters
/// stay typeable in input steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    Quit,
    Back,
    NavigateUp,
    NavigateDown,
    NavigateLeft,
    NavigateRight,
    WordLeft,
    WordRight,
    Home,
    End,
    Select,
    InputChar(char),
    Backspace,
    Delete,
    DeleteWord,
    ClearLine,
    None,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Key(KeyAction),
    Resize(u16, u16),
}

#[derive(Debug, Default)]
pub struct KeyHandler;

impl KeyHandler {
    pub fn new() -> Self {
        Self
    }

    /// Waits up to `timeout` for a terminal event.
    pub fn handle_crossterm_events(
        &mut self,
        timeout: Duration,
    ) -> color_eyre::Result<Option<AppEvent>> {
        if !event::poll(timeout)? {
            return Ok(None);
        }
        match event::read()? {
            // it's important to check KeyEventKind::Press to avoid handling key release events
            Event::Key(key) if key.kind == KeyEventKind::Press => {
                Ok(Some(AppEvent::Key(self.on_key_event(key))))
            }
            Event::Resize(width, height) => Ok(Some(AppEvent::Resize(width, height))),
            _ => Ok(None),
        }
    }

    pub fn on_key_event(&mut self, key: KeyEvent) -> KeyAction {
        match (key.modifiers, key.code) {
            (KeyModifiers::CONTROL, KeyCode::Char('c') | KeyCode::Char('C')) => KeyAction::Quit,
            (KeyModifiers::CONTROL, KeyCode::Char('u') | KeyCode::Char('U')) => {
                KeyAction::ClearLine
            }
            (KeyModifiers::CONTROL, KeyCode::Char('w') | KeyCode::Char('W'))
            | (KeyModifiers::ALT, KeyCode::Backspace) => KeyAction::DeleteWord,
            (KeyModifiers::CONTROL, KeyCode::Char('a')) => KeyAction::Home,
            (KeyModifiers::CONTROL, KeyCode::Char('e')) => KeyAction::End,
            (KeyModifiers::CONTROL, KeyCode::Left) | (KeyModifiers::ALT, KeyCode::Char('b')) => {
                KeyAction::WordLeft
            }
            (KeyModifiers::CONTROL, KeyCode::Right) | (KeyModifiers::ALT, KeyCode::Char('f')) => {
                KeyAction::WordRight
            }
            (_, KeyCode::Esc) => KeyAction::Back,
            (_, KeyCode::Enter) => KeyAction::Select,
            (_, KeyCode::Up) => KeyAction::NavigateUp,
            (_, KeyCode::Down) => KeyAction::NavigateDown,
            (_, KeyCode::Left) => KeyAction::NavigateLeft,
            (_, KeyCode::Right) => KeyAction::NavigateRight,
            (_, KeyCode::Home) => KeyAction::Home,
            (_, KeyCode::End) => KeyAction::End,
            (_, KeyCode::Backspace) => KeyAction::Backspace,
            (_, KeyCode::Delete) => KeyAction::Delete,
            (KeyModifiers::NONE | KeyModifiers::SHIFT, KeyCode::Char(c)) => KeyAction::InputChar(c),
            _ => KeyAction::None,
        }
    }
}
