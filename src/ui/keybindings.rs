use crate::domain::UiMode;
use crate::ui::styles::hint_style;
use ratatui::{layout::Rect, text::Line, widgets::Paragraph, Frame};

/// Hints for the current mode
pub fn hints_for(mode: UiMode) -> &'static str {
    match mode {
        UiMode::Login => " Tab switch field   Enter log in   Esc quit",
        UiMode::Normal => {
            " ↑/↓ select   Space toggle   a add   e edit   d delete   / search   f filter   s sort   L logout   q quit"
        }
        UiMode::Searching => " type to search   Enter keep   Esc clear",
        UiMode::AddingTask | UiMode::EditingTask => " Tab next field   Enter save   Esc cancel",
        UiMode::Notice => " any key to continue",
    }
}

/// Render the keybindings hint bar
pub fn render_keybindings(f: &mut Frame, mode: UiMode, area: Rect) {
    let paragraph = Paragraph::new(Line::raw(hints_for(mode))).style(hint_style());
    f.render_widget(paragraph, area);
}
