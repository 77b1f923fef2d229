use ratatui::{
    layout::{Position, Rect},
    style::{Style, Stylize},
    text::{Line, Span},
    widgets::{Block, ListState, Paragraph},
    Frame,
};

use crate::input::InputWidget;

/// Creates a ListState with proper bounds checking
pub fn create_list_state(selected: usize, item_count: usize) -> ListState {
    ListState::default().with_selected(Some(selected.min(item_count.saturating_sub(1))))
}

/// Creates a block with conditional focus styling (yellow border when focused)
pub fn focused_block(title: &str, is_focused: bool) -> Block<'_> {
    let block = Block::bordered().title(title);
    if is_focused {
        block.border_style(Style::new().yellow())
    } else {
        block
    }
}

/// Renders a labelled single-line input and places the terminal cursor in it.
///
/// Shows the placeholder (dimmed) while the value is empty; masked inputs never
/// reveal their value.
pub fn render_input_form(frame: &mut Frame, area: Rect, label: &str, input: &InputWidget) {
    let (visible, cursor) = input.display_text();
    let field = if input.value().is_empty() {
        Line::from(vec![
            Span::raw("> "),
            Span::styled(input.placeholder().to_string(), Style::new().dark_gray()),
        ])
    } else {
        Line::from(vec![Span::raw("> "), Span::raw(visible)])
    };

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("{}:", label), Style::new().yellow())),
        Line::from(""),
        field,
    ];
    if input.char_limit() > 0 && input.char_limit() <= 100 {
        lines.push(Line::from(Span::styled(
            format!("{}/{}", input.value().chars().count(), input.char_limit()),
            Style::new().gray(),
        )));
    }

    let block = focused_block("Input", true);
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(lines).block(block), area);

    // "> " prefix on the fourth line
    let x = inner.x.saturating_add(2).saturating_add(cursor as u16);
    let y = inner.y.saturating_add(3);
    if x < inner.right() && y < inner.bottom() {
        frame.set_cursor_position(Position::new(x, y));
    }
}
