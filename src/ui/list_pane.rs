use crate::app::AppState;
use crate::domain::{Task, UiMode};
use crate::ui::styles::{
    border_style, default_style, done_style, due_style, muted_style, overdue_style, selected_style,
    title_style,
};
use chrono::{DateTime, Local};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
    Frame,
};

/// Render the task list pane
pub fn render_list_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let visible = app.visible_tasks();
    let now = Local::now();

    let items: Vec<ListItem> = if visible.is_empty() {
        vec![ListItem::new(Line::styled(empty_message(app), muted_style()))]
    } else {
        visible
            .iter()
            .enumerate()
            .map(|(idx, task)| {
                let style = if idx == app.selected_index {
                    selected_style()
                } else {
                    default_style()
                };
                ListItem::new(create_task_line(task, now)).style(style)
            })
            .collect()
    };

    let title = format!(" Tasks ({}/{}) ", visible.len(), app.store.len());
    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(title, title_style())),
    );

    // Scroll to keep the selection in view
    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected_index));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn empty_message(app: &AppState) -> &'static str {
    if app.store.is_empty() {
        "No tasks yet. Press 'a' to add one."
    } else {
        "No tasks match the current filter."
    }
}

/// Render the status line: user, filter, sort and search query
pub fn render_status_line(f: &mut Frame, app: &AppState, area: Rect) {
    let mut spans = Vec::new();

    if let Some(user) = app.store.user() {
        spans.push(Span::styled(format!(" {} ", user.username), title_style()));
        spans.push(Span::raw("· "));
    }

    spans.push(Span::raw(format!("Filter: {} ", app.status_filter.label())));

    if let Some(criteria) = app.sort_criteria {
        spans.push(Span::raw(format!("· {} ", criteria.label())));
    }

    if app.ui_mode == UiMode::Searching {
        spans.push(Span::raw("· Search: "));
        spans.push(Span::styled(app.search_text.clone(), due_style()));
        spans.push(Span::styled("█", due_style()));
    } else if !app.search_text.is_empty() {
        spans.push(Span::raw(format!("· Search: {}", app.search_text)));
    }

    f.render_widget(Paragraph::new(Line::from(spans)).style(muted_style()), area);
}

/// Create a single line for a task
/// Format: [x] Write report  Q3 numbers  ⏰ October 5 2026, 3:00 PM
fn create_task_line(task: &Task, now: DateTime<Local>) -> Line<'static> {
    let mut spans = Vec::new();

    let checkbox = if task.completed { "[x] " } else { "[ ] " };
    spans.push(Span::raw(checkbox));

    if task.completed {
        spans.push(Span::styled(task.title.clone(), done_style()));
    } else {
        spans.push(Span::raw(task.title.clone()));
    }

    if !task.description.is_empty() {
        spans.push(Span::raw("  "));
        spans.push(Span::styled(task.description.clone(), muted_style()));
    }

    if let (Some(due), Some(label)) = (task.due_date, task.due_date_formatted()) {
        let style = if !task.completed && due < now {
            overdue_style()
        } else {
            due_style()
        };
        spans.push(Span::raw("  "));
        spans.push(Span::styled(format!("⏰ {}", label), style));
    }

    Line::from(spans)
}
