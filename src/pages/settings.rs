use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, List, ListItem, Paragraph, Wrap},
    Frame,
};
use throbber_widgets_tui::{Throbber, ThrobberState, WhichUse, BRAILLE_SIX};

use crate::data::RepositoryEntry;
use crate::settings::{SettingsModel, ADD_TYPES};
use crate::state::{SettingsState, StateKind};
use crate::status_symbols;
use crate::ui_utils::{create_list_state, focused_block, render_input_form};

/// Draws whichever settings screen the model is on.
#[derive(Debug, Default)]
pub struct SettingsPage {
    throbber: ThrobberState,
}

impl SettingsPage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances the refresh spinner. Called once per frame while a refresh runs.
    pub fn tick(&mut self) {
        self.throbber.calc_next();
    }

    pub fn render(&mut self, frame: &mut Frame, area: Rect, model: &SettingsModel) {
        let state = model.state();
        let rows = Layout::new(
            Direction::Vertical,
            [Constraint::Length(2), Constraint::Min(0), Constraint::Length(1)],
        )
        .split(area);

        let header = vec![
            Line::from(state.title()).bold().cyan(),
            Line::from(step_hint(state)).gray(),
        ];
        frame.render_widget(Paragraph::new(header), rows[0]);

        match state.kind() {
            StateKind::List => self.render_list(frame, rows[1], model),
            StateKind::Input => {
                render_input_form(frame, rows[1], input_label(state), model.input())
            }
            StateKind::Confirm => render_confirm(frame, rows[1], model),
            StateKind::Error => render_error(frame, rows[1], model),
            StateKind::Progress => self.render_progress(frame, rows[1], model),
            StateKind::Done => render_done(frame, rows[1], model),
        }

        // Error screens show the error themselves.
        match model.error() {
            Some(error) if !state.is_error() => {
                let line = Line::from(status_symbols::error(&error.to_string())).red();
                frame.render_widget(line, rows[2]);
            }
            _ if model.is_awaiting() => {
                let throbber = Throbber::default()
                    .label("Working…")
                    .throbber_style(Style::new().yellow())
                    .throbber_set(BRAILLE_SIX)
                    .use_type(WhichUse::Spin);
                frame.render_stateful_widget(throbber, rows[2], &mut self.throbber);
            }
            _ => {}
        }
    }

    fn render_list(&self, frame: &mut Frame, area: Rect, model: &SettingsModel) {
        let (title, labels): (&str, Vec<String>) = match model.state() {
            SettingsState::RepositoryActions => {
                let Ok(entry) = model.selected_entry() else {
                    return;
                };
                let split = Layout::new(
                    Direction::Vertical,
                    [Constraint::Length(6), Constraint::Min(0)],
                )
                .split(area);
                frame.render_widget(entry_details(entry), split[0]);
                let labels = model
                    .repository_actions()
                    .iter()
                    .map(|a| a.label(entry).to_string())
                    .collect();
                self.draw_list(frame, split[1], "Actions", labels, model.cursor());
                return;
            }
            SettingsState::AddType => (
                "Repository type",
                ADD_TYPES.iter().map(|s| s.to_string()).collect(),
            ),
            _ => {
                let entries = &model.config().repositories;
                let labels = model
                    .menu_items()
                    .into_iter()
                    .map(|item| item.label(entries))
                    .collect();
                ("Repositories", labels)
            }
        };
        self.draw_list(frame, area, title, labels, model.cursor());
    }

    fn draw_list(&self, frame: &mut Frame, area: Rect, title: &str, labels: Vec<String>, cursor: usize) {
        let mut state = create_list_state(cursor, labels.len());
        let items: Vec<ListItem> = labels.into_iter().map(ListItem::new).collect();
        frame.render_stateful_widget(
            List::new(items)
                .block(focused_block(title, true))
                .highlight_style(Style::new().reversed())
                .highlight_symbol(">> ")
                .repeat_highlight_symbol(true),
            area,
            &mut state,
        );
    }

    fn render_progress(&mut self, frame: &mut Frame, area: Rect, model: &SettingsModel) {
        let name = model
            .selected_entry()
            .map(|e| e.name.clone())
            .unwrap_or_default();
        let block = Block::bordered().title("Refreshing");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let throbber = Throbber::default()
            .label(format!("Fetching {} from its remote…", name))
            .throbber_style(Style::new().yellow().bold())
            .throbber_set(BRAILLE_SIX)
            .use_type(WhichUse::Spin);
        let line = Rect::new(inner.x + 1, inner.y + 1, inner.width.saturating_sub(2), 1);
        if inner.height > 1 {
            frame.render_stateful_widget(throbber, line, &mut self.throbber);
        }
    }
}

fn step_hint(state: SettingsState) -> &'static str {
    use SettingsState::*;
    match state {
        MainMenu => "Choose a repository to manage, or add a new one",
        RepositoryActions => "What would you like to change?",
        AddType => "Where do the rules live?",
        AddLocalName => "Step 1 of 2",
        AddLocalPath => "Step 2 of 2",
        AddRemoteName => "Step 1 of 5",
        AddRemoteUrl => "Step 2 of 5",
        AddRemoteBranch => "Step 3 of 5",
        AddRemotePath => "Step 4 of 5",
        AddRemotePat => "Step 5 of 5",
        _ => "",
    }
}

fn input_label(state: SettingsState) -> &'static str {
    use SettingsState::*;
    match state {
        AddLocalName | AddRemoteName | UpdateName => "Repository name",
        AddLocalPath => "Directory containing the rules",
        AddRemoteUrl => "GitHub repository URL",
        AddRemoteBranch => "Branch (leave empty for the default branch)",
        AddRemotePath | UpdateClonePath => "Local path",
        UpdateBranch => "Branch",
        AddRemotePat => "GitHub personal access token",
        UpdatePat => "New GitHub personal access token",
        _ => "Value",
    }
}

fn entry_details(entry: &RepositoryEntry) -> Paragraph<'_> {
    let field = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(format!("{:>8}: ", label), Style::new().gray()),
            Span::raw(value),
        ])
    };
    let mut lines = vec![
        field("Name", entry.name.clone()),
        field("Type", entry.kind.label().to_string()),
        field("Path", entry.path.clone()),
    ];
    if let Some(url) = &entry.remote_url {
        lines.push(field("Remote", url.clone()));
        lines.push(field("Branch", entry.branch_label().to_string()));
    }
    Paragraph::new(lines)
}

fn render_confirm(frame: &mut Frame, area: Rect, model: &SettingsModel) {
    let scratch = model.scratch();
    let name = model
        .selected_entry()
        .map(|e| e.name.clone())
        .unwrap_or_default();

    let mut lines = vec![Line::from("")];
    match model.state() {
        SettingsState::EditNameConfirm => {
            lines.push(Line::from(format!("Rename \"{}\" to:", name)));
            lines.push(Line::from(scratch.edit_name.new_name.clone()).bold());
        }
        SettingsState::EditBranchConfirm => {
            let branch = if scratch.edit_branch.new_branch.is_empty() {
                "(default)".to_string()
            } else {
                scratch.edit_branch.new_branch.clone()
            };
            lines.push(Line::from(format!("Switch \"{}\" to branch:", name)));
            lines.push(Line::from(branch).bold());
        }
        SettingsState::EditClonePathConfirm => {
            lines.push(Line::from(format!("Move \"{}\" to:", name)));
            lines.push(Line::from(scratch.edit_clone_path.new_path.clone()).bold());
            lines.push(Line::from(""));
            lines.push(
                Line::from(status_symbols::info("Existing files are not moved")).gray(),
            );
        }
        SettingsState::ConfirmDelete => {
            lines.push(Line::from(format!("Delete \"{}\" from the configuration?", name)));
            lines.push(Line::from(""));
            lines.push(
                Line::from(status_symbols::warning("Files on disk are left untouched")).yellow(),
            );
        }
        SettingsState::ManualRefresh => {
            lines.push(Line::from(format!("Fetch the latest rules for \"{}\"?", name)));
        }
        SettingsState::UpdatePatConfirm => {
            let count = model.config().remote_urls().len();
            lines.push(Line::from("Replace the stored GitHub token?"));
            if count > 0 {
                lines.push(
                    Line::from(format!(
                        "It will be checked against {} remote repositor{}",
                        count,
                        if count == 1 { "y" } else { "ies" }
                    ))
                    .gray(),
                );
            }
        }
        _ => {}
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(focused_block("Confirm", true))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_error(frame: &mut Frame, area: Rect, model: &SettingsModel) {
    let mut lines = vec![Line::from("")];
    if let Some(error) = model.error() {
        lines.push(Line::from(status_symbols::error(error.kind_label())).red().bold());
        lines.push(Line::from(""));
        lines.push(Line::from(error.to_string()));
    }
    if let Some(flow) = model.state().flow() {
        lines.push(Line::from(""));
        lines.push(Line::from("Common causes:").gray());
        for cause in flow.common_causes() {
            lines.push(Line::from(format!("  • {}", cause)).gray());
        }
    }
    frame.render_widget(
        Paragraph::new(lines)
            .block(Block::bordered().title("Error").border_style(Style::new().red()))
            .wrap(Wrap { trim: false }),
        area,
    );
}

fn render_done(frame: &mut Frame, area: Rect, model: &SettingsModel) {
    let what = match model.previous_state().flow() {
        Some(flow) => flow.done_message(),
        None => "Saved",
    };
    let lines = vec![
        Line::from(""),
        Line::from(status_symbols::success(what)).green().bold(),
    ];
    frame.render_widget(Paragraph::new(lines).block(focused_block("Done", true)), area);
}
