use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout},
    style::Stylize,
    text::Line,
    widgets::Block,
};

use crate::pages::settings::SettingsPage;
use crate::settings::SettingsModel;
use crate::state::StateKind;

#[derive(Debug, Default)]
pub struct Screen {
    settings: SettingsPage,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render(&mut self, frame: &mut Frame, model: &SettingsModel) {
        let area = frame.area();
        let title = Line::from("rulem - Settings")
            .bold()
            .blue()
            .left_aligned();
        let block = Block::bordered().title(title);
        let inner_area = block.inner(area);
        frame.render_widget(block, area);

        // Split into page area and bottom status bar
        let vlayout = Layout::new(
            Direction::Vertical,
            [Constraint::Min(0), Constraint::Length(1)],
        )
        .split(inner_area);

        if model.state().kind() == StateKind::Progress || model.is_awaiting() {
            self.settings.tick();
        }
        self.settings.render(frame, vlayout[0], model);

        let count = model.config().repositories.len();
        let status_line = Line::from(format!(
            "{} repositor{}  |  {}  |  Ctrl+C: Quit",
            count,
            if count == 1 { "y" } else { "ies" },
            model.state().help()
        ))
        .on_dark_gray()
        .white();
        frame.render_widget(status_line, vlayout[1]);
    }
}
