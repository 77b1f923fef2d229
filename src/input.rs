//! Reusable single-line text input shared by every settings input step.
//!
//! Wraps [`tui_input::Input`] (buffer, cursor, word motions) and adds the
//! presentation attributes the settings screens need: placeholder, character
//! limit, echo mode and display width.

use tui_input::{Input, InputRequest};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EchoMode {
    #[default]
    Normal,
    /// Every character is displayed as `*`.
    Masked,
}

/// Complete description of a freshly reset input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputSpec {
    pub value: String,
    pub placeholder: String,
    pub echo: EchoMode,
    pub char_limit: usize,
}

impl InputSpec {
    pub fn new(value: impl Into<String>, placeholder: impl Into<String>, char_limit: usize) -> Self {
        Self {
            value: value.into(),
            placeholder: placeholder.into(),
            echo: EchoMode::Normal,
            char_limit,
        }
    }

    pub fn masked(mut self) -> Self {
        self.echo = EchoMode::Masked;
        self
    }
}

#[derive(Debug, Clone)]
pub struct InputWidget {
    input: Input,
    placeholder: String,
    echo: EchoMode,
    char_limit: usize,
    width: u16,
}

impl Default for InputWidget {
    fn default() -> Self {
        Self::new()
    }
}

impl InputWidget {
    pub fn new() -> Self {
        Self {
            input: Input::default(),
            placeholder: String::new(),
            echo: EchoMode::Normal,
            char_limit: 0,
            width: 40,
        }
    }

    /// Replaces every attribute at once; nothing carries over from the previous step.
    pub fn reset_to(&mut self, spec: InputSpec) {
        let value: String = if spec.char_limit > 0 {
            spec.value.chars().take(spec.char_limit).collect()
        } else {
            spec.value
        };
        self.input = Input::default().with_value(value);
        self.placeholder = spec.placeholder;
        self.echo = spec.echo;
        self.char_limit = spec.char_limit;
    }

    pub fn value(&self) -> &str {
        self.input.value()
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    pub fn echo(&self) -> EchoMode {
        self.echo
    }

    pub fn char_limit(&self) -> usize {
        self.char_limit
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn set_width(&mut self, width: u16) {
        self.width = width.max(1);
    }

    pub fn cursor(&self) -> usize {
        self.input.cursor()
    }

    /// Applies an editing request. Insertions beyond the character limit are dropped.
    pub fn handle(&mut self, req: InputRequest) {
        if let InputRequest::InsertChar(_) = req {
            if self.char_limit > 0 && self.input.value().chars().count() >= self.char_limit {
                return;
            }
        }
        self.input.handle(req);
    }

    /// Text as it should be shown: masked when required, scrolled to keep the cursor visible.
    pub fn display_text(&self) -> (String, usize) {
        let shown: String = match self.echo {
            EchoMode::Normal => self.input.value().to_string(),
            EchoMode::Masked => "*".repeat(self.input.value().chars().count()),
        };
        let width = usize::from(self.width.saturating_sub(1)).max(1);
        let scroll = self.input.visual_scroll(width);
        let visible: String = shown.chars().skip(scroll).take(width).collect();
        let cursor = self.input.visual_cursor().saturating_sub(scroll);
        (visible, cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_to_replaces_everything() {
        let mut w = InputWidget::new();
        w.reset_to(InputSpec::new("secret", "token", 0).masked());
        w.reset_to(InputSpec::new("", "Repository name", 100));
        assert_eq!(w.value(), "");
        assert_eq!(w.placeholder(), "Repository name");
        assert_eq!(w.echo(), EchoMode::Normal);
        assert_eq!(w.char_limit(), 100);
    }

    #[test]
    fn test_char_limit_blocks_insertion() {
        let mut w = InputWidget::new();
        w.reset_to(InputSpec::new("ab", "", 3));
        w.handle(InputRequest::InsertChar('c'));
        w.handle(InputRequest::InsertChar('d'));
        assert_eq!(w.value(), "abc");
        w.handle(InputRequest::DeletePrevChar);
        assert_eq!(w.value(), "ab");
    }

    #[test]
    fn test_masked_display() {
        let mut w = InputWidget::new();
        w.reset_to(InputSpec::new("ghp_x", "", 0).masked());
        let (text, cursor) = w.display_text();
        assert_eq!(text, "*****");
        assert_eq!(cursor, 5);
        assert_eq!(w.value(), "ghp_x");
    }

    #[test]
    fn test_display_scrolls_long_values() {
        let mut w = InputWidget::new();
        w.set_width(6);
        w.reset_to(InputSpec::new("abcdefghij", "", 0));
        let (text, cursor) = w.display_text();
        assert!(text.chars().count() <= 5);
        assert!(cursor <= 5);
        assert_eq!(w.value(), "abcdefghij");
    }
}
