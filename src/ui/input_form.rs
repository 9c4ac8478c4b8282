use crate::app::{AppState, TaskFormState};
use crate::domain::FormField;
use crate::ui::{
    layout::create_modal_area,
    styles::{modal_bg_style, modal_title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

/// Render the input form for adding or editing a task
pub fn render_input_form(f: &mut Frame, app: &AppState, area: Rect) {
    if let Some(form) = &app.task_form {
        let modal_area = create_modal_area(area, 16);

        // Clear the area behind the form
        f.render_widget(Clear, modal_area);

        let title_text = if form.editing.is_some() {
            " Edit Task "
        } else {
            " Add Task "
        };

        let paragraph = Paragraph::new(form_lines(form))
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(Span::styled(title_text, modal_title_style()))
                    .style(modal_bg_style()),
            )
            .wrap(Wrap { trim: false });

        f.render_widget(paragraph, modal_area);
    }
}

fn form_lines(form: &TaskFormState) -> Vec<Line<'_>> {
    let mut lines = Vec::new();

    lines.push(Line::raw(""));
    push_field(&mut lines, "Title:", &form.title, form.field == FormField::Title);
    push_field(
        &mut lines,
        "Description:",
        &form.description,
        form.field == FormField::Description,
    );
    push_field(
        &mut lines,
        "Due date (YYYY-MM-DD [HH:MM], blank for none):",
        &form.due_date,
        form.field == FormField::DueDate,
    );

    lines.push(Line::raw("Tab to switch fields  ·  Enter to save  ·  Esc to cancel"));
    lines
}

fn push_field<'a>(lines: &mut Vec<Line<'a>>, label: &'a str, value: &'a str, active: bool) {
    if active {
        lines.push(Line::raw(format!("{} (editing)", label)));
    } else {
        lines.push(Line::raw(label));
    }

    lines.push(Line::from(vec![
        Span::raw("> "),
        Span::styled(value, modal_title_style()),
        if active {
            Span::styled("█", modal_title_style()) // Cursor
        } else {
            Span::raw("")
        },
    ]));
    lines.push(Line::raw(""));
}
