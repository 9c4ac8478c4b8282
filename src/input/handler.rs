use crate::app::AppState;
use crate::domain::UiMode;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Handle keyboard input events. Returns true when the app should quit.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> bool {
    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    match app.ui_mode {
        UiMode::Login => handle_login_mode(app, key),
        UiMode::Normal => handle_normal_mode(app, key),
        UiMode::Searching => handle_search_mode(app, key),
        UiMode::AddingTask | UiMode::EditingTask => handle_task_form_mode(app, key),
        UiMode::Notice => {
            app.dismiss_notice();
            false
        }
    }
}

/// Handle keys on the login screen
fn handle_login_mode(app: &mut AppState, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => app.submit_login(),
        KeyCode::Tab | KeyCode::BackTab => app.login_toggle_field(),
        KeyCode::Backspace => app.login_backspace(),
        KeyCode::Char(c) => app.login_add_char(c),
        KeyCode::Esc => return true,
        _ => {}
    }
    false
}

/// Handle keys in normal mode
fn handle_normal_mode(app: &mut AppState, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => app.move_selection_up(),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection_down(),

        // Toggle completion
        KeyCode::Char(' ') | KeyCode::Enter => app.toggle_selected(),

        KeyCode::Char('a') | KeyCode::Char('A') => app.start_add_task(),
        KeyCode::Char('e') | KeyCode::Char('E') => app.start_edit_task(),
        KeyCode::Char('d') | KeyCode::Char('D') | KeyCode::Delete => app.delete_selected(),

        KeyCode::Char('/') => app.start_search(),
        KeyCode::Char('f') | KeyCode::Char('F') => app.cycle_filter(),
        KeyCode::Char('s') | KeyCode::Char('S') => app.cycle_sort(),

        KeyCode::Char('L') => app.logout(),

        KeyCode::Char('q') | KeyCode::Char('Q') => return true,
        _ => {}
    }
    false
}

/// Handle keys while typing a search query
fn handle_search_mode(app: &mut AppState, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => app.finish_search(false),
        KeyCode::Esc => app.finish_search(true),
        KeyCode::Backspace => app.search_backspace(),
        KeyCode::Char(c) => app.search_add_char(c),
        _ => {}
    }
    false
}

/// Handle keys in the add/edit form
fn handle_task_form_mode(app: &mut AppState, key: KeyEvent) -> bool {
    match key.code {
        KeyCode::Enter => app.submit_task_form(),
        KeyCode::Esc => app.cancel_task_form(),
        KeyCode::Tab | KeyCode::BackTab => app.task_form_toggle_field(),
        KeyCode::Backspace => app.task_form_backspace(),
        KeyCode::Char(c) => app.task_form_add_char(c),
        _ => {}
    }
    false
}
