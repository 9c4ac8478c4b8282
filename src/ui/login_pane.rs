use crate::app::{AppState, LoginFormState};
use crate::domain::LoginField;
use crate::ui::{
    layout::create_modal_area,
    styles::{border_style, modal_title_style, title_style},
};
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Render the login screen
pub fn render_login_pane(f: &mut Frame, app: &AppState, area: Rect) {
    let form_area = create_modal_area(area, 11);

    let paragraph = Paragraph::new(login_lines(&app.login_form)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border_style())
            .title(Span::styled(" Log in ", title_style())),
    );

    f.render_widget(paragraph, form_area);
}

fn login_lines(form: &LoginFormState) -> Vec<Line<'static>> {
    // Password is never echoed
    let masked = "*".repeat(form.password.chars().count());

    let mut lines = vec![Line::raw("")];
    lines.push(field_line(
        "Username: ",
        form.username.clone(),
        form.field == LoginField::Username,
    ));
    lines.push(Line::raw(""));
    lines.push(field_line(
        "Password: ",
        masked,
        form.field == LoginField::Password,
    ));
    lines.push(Line::raw(""));
    lines.push(Line::raw("Tab to switch fields  ·  Enter to log in  ·  Esc to quit"));
    lines
}

fn field_line(label: &'static str, value: String, active: bool) -> Line<'static> {
    let mut spans = vec![Span::raw(label), Span::styled(value, modal_title_style())];
    if active {
        spans.push(Span::styled("█", modal_title_style()));
    }
    Line::from(spans)
}
