mod fields;

pub use fields::TextInputField;

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use super::theme::Theme;

/// Draw a labelled single-line text input; the focused field gets the accent
/// border and the terminal cursor.
pub fn render_text_input(
    frame: &mut Frame,
    area: Rect,
    title: &str,
    field: &TextInputField,
    focused: bool,
    theme: &Theme,
) {
    let border = if focused {
        Style::default().fg(theme.accent_primary)
    } else {
        Style::default().fg(theme.text_secondary)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title.to_string())
        .border_style(border);
    let inner = block.inner(area);
    let paragraph = Paragraph::new(field.value.clone())
        .style(Style::default().fg(theme.text_primary))
        .block(block);
    frame.render_widget(paragraph, area);
    if focused && inner.width > 0 {
        let x = inner.x + (field.state.cursor as u16).min(inner.width.saturating_sub(1));
        frame.set_cursor_position((x, inner.y));
    }
}
