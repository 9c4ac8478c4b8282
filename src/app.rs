use crate::domain::{FormField, LoginField, SortCriteria, StatusFilter, Task, TaskId, UiMode};
use crate::persistence::PendingWrite;
use crate::store::{StoreError, StoreResult, TaskStore};
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use tracing::{debug, warn};

/// Format used to prefill and parse the due date field
pub const DUE_DATE_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Login screen state
#[derive(Debug, Clone)]
pub struct LoginFormState {
    pub username: String,
    pub password: String,
    pub field: LoginField,
}

impl LoginFormState {
    fn new() -> Self {
        Self {
            username: String::new(),
            password: String::new(),
            field: LoginField::Username,
        }
    }
}

/// Input form state for adding or editing a task
#[derive(Debug, Clone)]
pub struct TaskFormState {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub field: FormField,
    /// Some when editing an existing task
    pub editing: Option<TaskId>,
}

/// Main application state
pub struct AppState {
    pub store: TaskStore,
    pub ui_mode: UiMode,
    pub login_form: LoginFormState,
    pub task_form: Option<TaskFormState>,
    pub search_text: String,
    pub status_filter: StatusFilter,
    pub sort_criteria: Option<SortCriteria>,
    pub selected_index: usize,
    pub notice: Option<String>,
    notice_return: UiMode,
}

impl AppState {
    /// A persisted session skips the login screen
    pub fn new(store: TaskStore) -> Self {
        let ui_mode = if store.is_logged_in() {
            UiMode::Normal
        } else {
            UiMode::Login
        };

        Self {
            store,
            ui_mode,
            login_form: LoginFormState::new(),
            task_form: None,
            search_text: String::new(),
            status_filter: StatusFilter::All,
            sort_criteria: None,
            selected_index: 0,
            notice: None,
            notice_return: UiMode::Normal,
        }
    }

    /// Derived view: active filter and search over the canonical list
    pub fn visible_tasks(&self) -> Vec<&Task> {
        if self.search_text.is_empty() {
            self.store.filter_tasks(self.status_filter)
        } else {
            self.store.search_tasks(self.status_filter, &self.search_text)
        }
    }

    /// Id of the selected row in the visible list
    pub fn selected_task_id(&self) -> Option<TaskId> {
        self.visible_tasks().get(self.selected_index).map(|task| task.id)
    }

    pub fn move_selection_up(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.visible_tasks().len() {
            self.selected_index += 1;
        }
    }

    /// Keep the selection inside the visible list
    fn clamp_selection(&mut self) {
        let visible = self.visible_tasks().len();
        if visible == 0 {
            self.selected_index = 0;
        } else if self.selected_index >= visible {
            self.selected_index = visible - 1;
        }
    }

    /// Show a blocking message; any key returns to the current mode
    pub fn show_notice(&mut self, message: impl Into<String>) {
        if self.ui_mode != UiMode::Notice {
            self.notice_return = self.ui_mode;
        }
        self.notice = Some(message.into());
        self.ui_mode = UiMode::Notice;
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
        self.ui_mode = self.notice_return;
    }

    // Login screen

    pub fn login_toggle_field(&mut self) {
        self.login_form.field = self.login_form.field.next();
    }

    pub fn login_add_char(&mut self, c: char) {
        match self.login_form.field {
            LoginField::Username => self.login_form.username.push(c),
            LoginField::Password => self.login_form.password.push(c),
        }
    }

    pub fn login_backspace(&mut self) {
        match self.login_form.field {
            LoginField::Username => self.login_form.username.pop(),
            LoginField::Password => self.login_form.password.pop(),
        };
    }

    /// Submit the login form; empty fields raise a notice
    pub fn submit_login(&mut self) {
        let result = self
            .store
            .login(&self.login_form.username, &self.login_form.password);

        match result {
            Ok(_write) => {
                self.login_form = LoginFormState::new();
                self.ui_mode = UiMode::Normal;
                self.clamp_selection();
            }
            Err(e) => self.show_notice(e.to_string()),
        }
    }

    /// Clear the session and return to the login screen
    pub fn logout(&mut self) {
        let _write = self.store.logout();
        self.task_form = None;
        self.search_text.clear();
        self.selected_index = 0;
        self.ui_mode = UiMode::Login;
    }

    // Task list

    pub fn toggle_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            let result = self.store.toggle_task_completion(id);
            self.apply(result);
        }
    }

    pub fn delete_selected(&mut self) {
        if let Some(id) = self.selected_task_id() {
            let result = self.store.delete_task(id);
            self.apply(result);
        }
    }

    /// Advance the status filter (All -> Completed -> Pending)
    pub fn cycle_filter(&mut self) {
        self.status_filter = self.status_filter.next();
        self.clamp_selection();
    }

    /// Advance the sort criteria and reorder the list
    pub fn cycle_sort(&mut self) {
        let criteria = SortCriteria::cycle(self.sort_criteria);
        self.sort_criteria = Some(criteria);
        let result = self.store.sort_tasks(criteria);
        self.apply(result);
    }

    // Search

    pub fn start_search(&mut self) {
        self.ui_mode = UiMode::Searching;
    }

    pub fn search_add_char(&mut self, c: char) {
        self.search_text.push(c);
        self.selected_index = 0;
    }

    pub fn search_backspace(&mut self) {
        self.search_text.pop();
        self.clamp_selection();
    }

    /// Leave search mode, optionally clearing the query
    pub fn finish_search(&mut self, clear: bool) {
        if clear {
            self.search_text.clear();
        }
        self.ui_mode = UiMode::Normal;
        self.clamp_selection();
    }

    // Task form

    pub fn start_add_task(&mut self) {
        self.task_form = Some(TaskFormState {
            title: String::new(),
            description: String::new(),
            due_date: String::new(),
            field: FormField::Title,
            editing: None,
        });
        self.ui_mode = UiMode::AddingTask;
    }

    /// Open the form prefilled with the selected task
    pub fn start_edit_task(&mut self) {
        let Some(id) = self.selected_task_id() else {
            return;
        };
        let Some(task) = self.store.task(id) else {
            return;
        };

        self.task_form = Some(TaskFormState {
            title: task.title.clone(),
            description: task.description.clone(),
            due_date: task
                .due_date
                .map(|due| due.format(DUE_DATE_INPUT_FORMAT).to_string())
                .unwrap_or_default(),
            field: FormField::Title,
            editing: Some(id),
        });
        self.ui_mode = UiMode::EditingTask;
    }

    pub fn task_form_toggle_field(&mut self) {
        if let Some(form) = &mut self.task_form {
            form.field = form.field.next();
        }
    }

    pub fn task_form_add_char(&mut self, c: char) {
        if let Some(form) = &mut self.task_form {
            match form.field {
                FormField::Title => form.title.push(c),
                FormField::Description => form.description.push(c),
                FormField::DueDate => form.due_date.push(c),
            }
        }
    }

    pub fn task_form_backspace(&mut self) {
        if let Some(form) = &mut self.task_form {
            match form.field {
                FormField::Title => form.title.pop(),
                FormField::Description => form.description.pop(),
                FormField::DueDate => form.due_date.pop(),
            };
        }
    }

    /// Submit the form. Adding needs a title; editing needs a title and a
    /// description. Invalid input keeps the form open.
    pub fn submit_task_form(&mut self) {
        let Some(form) = self.task_form.clone() else {
            return;
        };

        let title = form.title.trim();
        if title.is_empty() {
            return;
        }
        if form.editing.is_some() && form.description.trim().is_empty() {
            return;
        }

        let due_date = match parse_due_date(&form.due_date) {
            Ok(due_date) => due_date,
            Err(message) => {
                self.show_notice(message);
                return;
            }
        };

        // A past date is only accepted when an edit leaves it untouched
        if let Some(due) = due_date {
            if due.date_naive() < Local::now().date_naive() && !self.due_date_unchanged(&form) {
                self.show_notice(format!("Due date '{}' is in the past.", form.due_date.trim()));
                return;
            }
        }

        let result = match form.editing {
            Some(id) => self
                .store
                .edit_task(id, title.to_string(), form.description.clone(), due_date),
            None => {
                let task = Task::new(self.store.next_id(), title.to_string(), form.description.clone(), due_date);
                self.store.add_task(task)
            }
        };

        self.task_form = None;
        self.ui_mode = UiMode::Normal;
        self.apply(result);
    }

    fn due_date_unchanged(&self, form: &TaskFormState) -> bool {
        let existing = form
            .editing
            .and_then(|id| self.store.task(id))
            .and_then(|task| task.due_date)
            .map(|due| due.format(DUE_DATE_INPUT_FORMAT).to_string());
        existing.as_deref() == Some(form.due_date.trim())
    }

    pub fn cancel_task_form(&mut self) {
        self.task_form = None;
        self.ui_mode = UiMode::Normal;
    }

    /// Wait for queued writes before exit
    pub fn shutdown(&self) {
        if let Err(e) = self.store.flush() {
            warn!(error = %e, "failed to flush pending writes");
        }
    }

    /// Fire-and-forget a store result; failures of the view's own lookups
    /// are only logged
    fn apply(&mut self, result: StoreResult<PendingWrite>) {
        match result {
            Ok(_write) => {}
            Err(StoreError::NotFound(id)) => debug!(%id, "task vanished before the action ran"),
            Err(e) => self.show_notice(e.to_string()),
        }
        self.clamp_selection();
    }
}

/// Parse the due date field: blank, `YYYY-MM-DD` or `YYYY-MM-DD HH:MM`
pub fn parse_due_date(input: &str) -> Result<Option<DateTime<Local>>, String> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(None);
    }

    let naive = NaiveDateTime::parse_from_str(input, DUE_DATE_INPUT_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .map(|date| date.and_time(NaiveTime::default()))
        })
        .map_err(|_| format!("Invalid due date '{}'. Use YYYY-MM-DD or YYYY-MM-DD HH:MM.", input))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(Some)
        .ok_or_else(|| format!("Due date '{}' does not exist in the local time zone.", input))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::{KeyValueStore, MemoryStore, TASKS_KEY, USER_KEY};
    use chrono::{Datelike, Timelike};
    use pretty_assertions::assert_eq;

    fn create_test_app() -> (AppState, MemoryStore) {
        let backend = MemoryStore::new();
        let mut store = TaskStore::open(backend.clone());
        store.login("ada", "pw").unwrap();
        store
            .add_task(Task::new(TaskId(1), "Task 1".to_string(), "first".to_string(), None))
            .unwrap();
        store
            .add_task(Task::new(TaskId(2), "Task 2".to_string(), "second".to_string(), None))
            .unwrap();
        (AppState::new(store), backend)
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            app.task_form_add_char(c);
        }
    }

    fn titles(app: &AppState) -> Vec<String> {
        app.visible_tasks().iter().map(|t| t.title.clone()).collect()
    }

    #[test]
    fn test_starts_on_login_without_session() {
        let app = AppState::new(TaskStore::open(MemoryStore::new()));
        assert_eq!(app.ui_mode, UiMode::Login);
    }

    #[test]
    fn test_persisted_session_skips_login() {
        let (app, _backend) = create_test_app();
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_login_with_empty_password_shows_notice() {
        let mut app = AppState::new(TaskStore::open(MemoryStore::new()));
        for c in "ada".chars() {
            app.login_add_char(c);
        }

        app.submit_login();

        assert_eq!(app.ui_mode, UiMode::Notice);
        assert_eq!(app.notice.as_deref(), Some("Please enter both username and password."));
        assert!(!app.store.is_logged_in());

        app.dismiss_notice();
        assert_eq!(app.ui_mode, UiMode::Login);
        assert_eq!(app.login_form.username, "ada");
    }

    #[test]
    fn test_login_then_logout() {
        let backend = MemoryStore::new();
        let mut app = AppState::new(TaskStore::open(backend.clone()));
        for c in "ada".chars() {
            app.login_add_char(c);
        }
        app.login_toggle_field();
        for c in "pw".chars() {
            app.login_add_char(c);
        }
        app.login_backspace();

        app.submit_login();
        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(app.login_form.username.is_empty());
        app.store.flush().unwrap();
        assert!(backend.get(USER_KEY).unwrap().is_some());

        app.logout();
        app.store.flush().unwrap();
        assert_eq!(app.ui_mode, UiMode::Login);
        assert!(backend.get(USER_KEY).unwrap().is_none());
    }

    #[test]
    fn test_move_selection() {
        let (mut app, _backend) = create_test_app();

        app.move_selection_down();
        assert_eq!(app.selected_index, 1);

        // Can't go past the end
        app.move_selection_down();
        assert_eq!(app.selected_index, 1);

        app.move_selection_up();
        app.move_selection_up();
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_toggle_selected_moves_task_last() {
        let (mut app, _backend) = create_test_app();

        app.toggle_selected();

        assert_eq!(titles(&app), vec!["Task 2", "Task 1"]);
        assert!(app.store.task(TaskId(1)).unwrap().completed);
    }

    #[test]
    fn test_delete_selected_clamps_selection() {
        let (mut app, _backend) = create_test_app();
        app.move_selection_down();

        app.delete_selected();

        assert_eq!(titles(&app), vec!["Task 1"]);
        assert_eq!(app.selected_index, 0);
    }

    #[test]
    fn test_add_task_through_form() {
        let (mut app, backend) = create_test_app();

        app.start_add_task();
        assert_eq!(app.ui_mode, UiMode::AddingTask);
        type_text(&mut app, "  Buy milk  ");
        app.task_form_toggle_field();
        type_text(&mut app, "semi-skimmed");
        app.task_form_toggle_field();
        type_text(&mut app, "2099-03-04 15:05");
        app.submit_task_form();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert!(app.task_form.is_none());
        let added = app.store.tasks().last().unwrap();
        assert_eq!(added.title, "Buy milk");
        assert_eq!(added.description, "semi-skimmed");
        assert!(!added.completed);
        let due = added.due_date.unwrap();
        assert_eq!((due.year(), due.month(), due.day(), due.hour(), due.minute()), (2099, 3, 4, 15, 5));

        app.store.flush().unwrap();
        let raw = backend.get(TASKS_KEY).unwrap().unwrap();
        assert!(raw.contains("Buy milk"));
    }

    #[test]
    fn test_add_blank_title_keeps_form_open() {
        let (mut app, _backend) = create_test_app();

        app.start_add_task();
        type_text(&mut app, "   ");
        app.submit_task_form();

        assert_eq!(app.ui_mode, UiMode::AddingTask);
        assert_eq!(app.store.len(), 2);
    }

    #[test]
    fn test_bad_due_date_shows_notice() {
        let (mut app, _backend) = create_test_app();

        app.start_add_task();
        type_text(&mut app, "Dentist");
        app.task_form_toggle_field();
        app.task_form_toggle_field();
        type_text(&mut app, "someday");
        app.submit_task_form();

        assert_eq!(app.ui_mode, UiMode::Notice);
        assert_eq!(app.store.len(), 2);

        app.dismiss_notice();
        assert_eq!(app.ui_mode, UiMode::AddingTask);
        assert!(app.task_form.is_some());
    }

    #[test]
    fn test_past_due_date_shows_notice() {
        let (mut app, _backend) = create_test_app();

        app.start_add_task();
        type_text(&mut app, "Dentist");
        app.task_form_toggle_field();
        app.task_form_toggle_field();
        type_text(&mut app, "2001-01-01");
        app.submit_task_form();

        assert_eq!(app.ui_mode, UiMode::Notice);
        assert!(app.notice.as_deref().unwrap().contains("in the past"));
        assert_eq!(app.store.len(), 2);
    }

    #[test]
    fn test_edit_keeps_existing_past_due_date() {
        let (mut app, _backend) = create_test_app();
        let overdue = Local.with_ymd_and_hms(2001, 1, 1, 9, 30, 0).unwrap();
        app.store
            .edit_task(TaskId(1), "Task 1".to_string(), "first".to_string(), Some(overdue))
            .unwrap();

        app.start_edit_task();
        type_text(&mut app, " renamed");
        app.submit_task_form();

        assert_eq!(app.ui_mode, UiMode::Normal);
        let edited = app.store.task(TaskId(1)).unwrap();
        assert_eq!(edited.title, "Task 1 renamed");
        assert_eq!(edited.due_date, Some(overdue));
    }

    #[test]
    fn test_edit_requires_description() {
        let (mut app, _backend) = create_test_app();

        app.start_edit_task();
        assert_eq!(app.ui_mode, UiMode::EditingTask);
        app.task_form_toggle_field();
        for _ in 0.."first".len() {
            app.task_form_backspace();
        }
        app.submit_task_form();

        assert_eq!(app.ui_mode, UiMode::EditingTask);
        assert_eq!(app.store.task(TaskId(1)).unwrap().description, "first");
    }

    #[test]
    fn test_edit_keeps_completion_and_id() {
        let (mut app, _backend) = create_test_app();
        app.toggle_selected();
        // Task 1 is now last and completed; select it
        app.move_selection_down();
        assert_eq!(app.selected_task_id(), Some(TaskId(1)));

        app.start_edit_task();
        type_text(&mut app, " renamed");
        app.submit_task_form();

        let edited = app.store.task(TaskId(1)).unwrap();
        assert_eq!(edited.title, "Task 1 renamed");
        assert!(edited.completed);
    }

    #[test]
    fn test_cancel_form_changes_nothing() {
        let (mut app, _backend) = create_test_app();
        app.start_edit_task();
        type_text(&mut app, "zzz");
        app.cancel_task_form();

        assert_eq!(app.ui_mode, UiMode::Normal);
        assert_eq!(app.store.task(TaskId(1)).unwrap().title, "Task 1");
    }

    #[test]
    fn test_filter_does_not_touch_store() {
        let (mut app, _backend) = create_test_app();
        app.toggle_selected();

        app.cycle_filter();
        assert_eq!(app.status_filter, StatusFilter::Completed);
        assert_eq!(titles(&app), vec!["Task 1"]);

        app.cycle_filter();
        assert_eq!(titles(&app), vec!["Task 2"]);
        assert_eq!(app.store.len(), 2);

        app.cycle_filter();
        assert_eq!(app.status_filter, StatusFilter::All);
        assert_eq!(titles(&app).len(), 2);
    }

    #[test]
    fn test_search_narrows_view() {
        let (mut app, _backend) = create_test_app();

        app.start_search();
        for c in "2".chars() {
            app.search_add_char(c);
        }
        assert_eq!(titles(&app), vec!["Task 2"]);

        app.finish_search(false);
        assert_eq!(app.search_text, "2");
        assert_eq!(app.ui_mode, UiMode::Normal);

        app.start_search();
        app.finish_search(true);
        assert_eq!(titles(&app).len(), 2);
    }

    #[test]
    fn test_visible_list_matches_store_views() {
        let (mut app, _backend) = create_test_app();
        app.toggle_selected();
        app.status_filter = StatusFilter::Pending;

        fn ids(tasks: Vec<&Task>) -> Vec<TaskId> {
            tasks.iter().map(|t| t.id).collect()
        }
        assert_eq!(ids(app.visible_tasks()), ids(app.store.filter_tasks(StatusFilter::Pending)));

        app.search_text = "task 2".to_string();
        assert_eq!(
            ids(app.visible_tasks()),
            ids(app.store.search_tasks(StatusFilter::Pending, "task 2"))
        );
        assert_eq!(ids(app.visible_tasks()), vec![TaskId(2)]);
    }

    #[test]
    fn test_cycle_sort_reorders_store() {
        let (mut app, _backend) = create_test_app();
        app.store
            .add_task(Task::new(TaskId(3), "Alpha".to_string(), String::new(), None))
            .unwrap();

        app.cycle_sort();
        assert_eq!(app.sort_criteria, Some(SortCriteria::Title));
        assert_eq!(titles(&app), vec!["Alpha", "Task 1", "Task 2"]);

        app.cycle_sort();
        app.cycle_sort();
        assert_eq!(app.sort_criteria, Some(SortCriteria::CreatedAt));
        assert_eq!(titles(&app), vec!["Task 1", "Task 2", "Alpha"]);
    }

    #[test]
    fn test_parse_due_date_formats() {
        assert_eq!(parse_due_date("  ").unwrap(), None);

        let day = parse_due_date("2025-12-31").unwrap().unwrap();
        assert_eq!((day.month(), day.day(), day.hour()), (12, 31, 0));

        let timed = parse_due_date("2025-12-31 18:30").unwrap().unwrap();
        assert_eq!((timed.hour(), timed.minute()), (18, 30));

        assert!(parse_due_date("31/12/2025").is_err());
    }
}
