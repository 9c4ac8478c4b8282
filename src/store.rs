use crate::domain::{partition_completed_last, sort_by_criteria, visible_tasks, SortCriteria, StatusFilter, Task, TaskId};
use crate::persistence::{load_json, KeyValueStore, PendingWrite, StorageResult, Writer, TASKS_KEY, USER_KEY};
use crate::session::User;
use chrono::{DateTime, Local};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Task store errors. Validation and lookup failures leave the store unchanged.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Task {0} not found")]
    NotFound(TaskId),

    #[error("Task {0} already exists")]
    DuplicateId(TaskId),

    #[error("Task title cannot be empty")]
    EmptyTitle,

    #[error("Please enter both username and password.")]
    MissingCredentials,

    #[error("Failed to encode '{key}': {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Single source of truth for the task list and the session.
///
/// Every successful mutation replaces the in-memory list first and then
/// queues a write of the whole list; the returned `PendingWrite` can be
/// dropped or waited on.
pub struct TaskStore {
    tasks: Vec<Task>,
    user: Option<User>,
    writer: Writer,
}

impl TaskStore {
    /// Load tasks and session from `backend`, then hand it to the writer.
    /// Unreadable tasks are skipped one by one; an unreadable session is
    /// treated as absent.
    pub fn open<S>(mut backend: S) -> Self
    where
        S: KeyValueStore + Send + 'static,
    {
        let mut tasks = load_tasks(&mut backend);
        partition_completed_last(&mut tasks);
        let user: Option<User> = load_or_default(&backend, USER_KEY);

        info!(tasks = tasks.len(), logged_in = user.is_some(), "task store opened");

        Self {
            tasks,
            user,
            writer: Writer::spawn(backend),
        }
    }

    /// Canonical task list, completed tasks last
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.user.is_some()
    }

    /// Fresh id: the current timestamp, bumped past every existing id.
    /// If that would overflow, the first free id from now on is used.
    pub fn next_id(&self) -> TaskId {
        let now = TaskId::now();
        match self.tasks.iter().map(|task| task.id).max() {
            Some(max) if max >= now => max
                .0
                .checked_add(1)
                .map(TaskId)
                .unwrap_or_else(|| self.first_free_id(now)),
            _ => now,
        }
    }

    fn first_free_id(&self, from: TaskId) -> TaskId {
        (from.0..=i64::MAX)
            .chain(0..from.0)
            .map(TaskId)
            .find(|id| self.task(*id).is_none())
            .unwrap_or(from)
    }

    /// Append a task. Blank titles and duplicate ids are rejected.
    pub fn add_task(&mut self, task: Task) -> StoreResult<PendingWrite> {
        if task.title.trim().is_empty() {
            return Err(StoreError::EmptyTitle);
        }
        if self.task(task.id).is_some() {
            return Err(StoreError::DuplicateId(task.id));
        }

        debug!(id = %task.id, "add task");
        self.tasks.push(task);
        partition_completed_last(&mut self.tasks);
        self.persist_tasks()
    }

    /// Flip completion; completed tasks move behind pending ones
    pub fn toggle_task_completion(&mut self, id: TaskId) -> StoreResult<PendingWrite> {
        let index = self.position(id)?;
        self.tasks[index].toggle();

        debug!(%id, completed = self.tasks[index].completed, "toggle task");
        partition_completed_last(&mut self.tasks);
        self.persist_tasks()
    }

    pub fn delete_task(&mut self, id: TaskId) -> StoreResult<PendingWrite> {
        let index = self.position(id)?;
        self.tasks.remove(index);

        debug!(%id, "delete task");
        self.persist_tasks()
    }

    /// Replace title, description and due date. `id` and `completed` are
    /// untouched; content validation belongs to the caller.
    pub fn edit_task(
        &mut self,
        id: TaskId,
        title: String,
        description: String,
        due_date: Option<DateTime<Local>>,
    ) -> StoreResult<PendingWrite> {
        let index = self.position(id)?;
        let task = &mut self.tasks[index];
        task.title = title;
        task.description = description;
        task.due_date = due_date;

        debug!(%id, "edit task");
        self.persist_tasks()
    }

    /// Reorder the full list by `criteria`, completed tasks last
    pub fn sort_tasks(&mut self, criteria: SortCriteria) -> StoreResult<PendingWrite> {
        sort_by_criteria(&mut self.tasks, criteria);

        debug!(criteria = criteria.key(), "sort tasks");
        self.persist_tasks()
    }

    /// Derived view by completion status; the canonical list is not touched
    pub fn filter_tasks(&self, status: StatusFilter) -> Vec<&Task> {
        visible_tasks(&self.tasks, status, "")
    }

    /// Derived view by status and case-insensitive title search
    pub fn search_tasks(&self, status: StatusFilter, query: &str) -> Vec<&Task> {
        visible_tasks(&self.tasks, status, query)
    }

    /// Presence-checked login; persists `{"username": ...}`
    pub fn login(&mut self, username: &str, password: &str) -> StoreResult<PendingWrite> {
        let user = User::from_credentials(username, password).ok_or(StoreError::MissingCredentials)?;
        let json = encode(USER_KEY, &user)?;

        info!(username = %user.username, "logged in");
        self.user = Some(user);
        Ok(self.writer.set(USER_KEY, json))
    }

    /// Clear the session and its persisted key
    pub fn logout(&mut self) -> PendingWrite {
        if let Some(user) = self.user.take() {
            info!(username = %user.username, "logged out");
        }
        self.writer.remove(USER_KEY)
    }

    /// Wait for every queued write
    pub fn flush(&self) -> StorageResult<()> {
        self.writer.flush()
    }

    fn position(&self, id: TaskId) -> StoreResult<usize> {
        self.tasks
            .iter()
            .position(|task| task.id == id)
            .ok_or(StoreError::NotFound(id))
    }

    fn persist_tasks(&self) -> StoreResult<PendingWrite> {
        let json = encode(TASKS_KEY, &self.tasks)?;
        Ok(self.writer.set(TASKS_KEY, json))
    }
}

fn encode<T: serde::Serialize + ?Sized>(key: &'static str, value: &T) -> StoreResult<String> {
    serde_json::to_string(value).map_err(|source| StoreError::Encode { key, source })
}

/// Key the raw tasks value is copied to when it is not a JSON array
const UNREADABLE_TASKS_KEY: &str = "tasks.bad";

/// Decode the stored list entry by entry so one bad task costs only itself
fn load_tasks<S: KeyValueStore>(backend: &mut S) -> Vec<Task> {
    let raw = match backend.get(TASKS_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return Vec::new(),
        Err(e) => {
            warn!(key = TASKS_KEY, error = %e, "could not read stored tasks");
            return Vec::new();
        }
    };

    let entries: Vec<serde_json::Value> = match serde_json::from_str(&raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                key = TASKS_KEY,
                error = %e,
                backup = UNREADABLE_TASKS_KEY,
                "stored tasks unreadable, keeping a copy"
            );
            if let Err(e) = backend.set(UNREADABLE_TASKS_KEY, &raw) {
                warn!(error = %e, "failed to keep a copy of unreadable tasks");
            }
            return Vec::new();
        }
    };

    let mut tasks: Vec<Task> = Vec::with_capacity(entries.len());
    for (index, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<Task>(entry) {
            Ok(task) if tasks.iter().any(|t| t.id == task.id) => {
                warn!(index, id = %task.id, "skipping task with duplicate id");
            }
            Ok(task) => tasks.push(task),
            Err(e) => warn!(index, error = %e, "skipping unreadable task"),
        }
    }
    tasks
}

fn load_or_default<T, S>(backend: &S, key: &str) -> Option<T>
where
    T: DeserializeOwned,
    S: KeyValueStore,
{
    match load_json(backend, key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key = %key, error = %e, "ignoring unreadable stored value");
            None
        }
    }
}
