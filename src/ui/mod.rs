pub mod input_form;
pub mod keybindings;
pub mod layout;
pub mod list_pane;
pub mod login_pane;
pub mod modal;
pub mod styles;

use crate::app::AppState;
use crate::domain::UiMode;
use input_form::render_input_form;
use keybindings::render_keybindings;
use layout::create_layout;
use list_pane::{render_list_pane, render_status_line};
use login_pane::render_login_pane;
use modal::render_notice_modal;
use ratatui::Frame;

/// Main render function - draws the entire UI
pub fn render(f: &mut Frame, app: &AppState) {
    let size = f.size();
    let layout = create_layout(size);

    render_keybindings(f, app.ui_mode, layout.keybindings_area);

    // Login screen replaces the list while logged out
    if app.store.is_logged_in() {
        render_status_line(f, app, layout.status_area);
        render_list_pane(f, app, layout.list_area);
    } else {
        render_login_pane(f, app, layout.list_area);
    }

    // Render input form if active
    if matches!(app.ui_mode, UiMode::AddingTask | UiMode::EditingTask) {
        render_input_form(f, app, size);
    }

    // Notice goes on top of everything
    if app.ui_mode == UiMode::Notice {
        render_notice_modal(f, app, size);
    }
}
