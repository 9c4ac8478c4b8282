use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Task identity: creation timestamp in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub i64);

impl TaskId {
    /// Id derived from the current wall clock
    pub fn now() -> Self {
        Self(Local::now().timestamp_millis())
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A to-do item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    /// No due date is stored as `null`; older data wrote `false` or `""`
    #[serde(default, deserialize_with = "deserialize_due_date")]
    pub due_date: Option<DateTime<Local>>,
}

impl Task {
    pub fn new(id: TaskId, title: String, description: String, due_date: Option<DateTime<Local>>) -> Self {
        Self {
            id,
            title,
            description,
            completed: false,
            due_date,
        }
    }

    /// Flip the completion flag
    pub fn toggle(&mut self) {
        self.completed = !self.completed;
    }

    /// Due date formatted for display, e.g. "March 4 2025, 3:05 PM"
    pub fn due_date_formatted(&self) -> Option<String> {
        self.due_date
            .map(|due| due.format("%B %-d %Y, %-I:%M %p").to_string())
    }
}

/// Accepts an RFC 3339 string, `null`, `false` or `""`
fn deserialize_due_date<'de, D>(deserializer: D) -> Result<Option<DateTime<Local>>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawDueDate {
        // Only the shape matters; any boolean means no due date
        Flag(#[allow(dead_code)] bool),
        Text(String),
    }

    match Option::<RawDueDate>::deserialize(deserializer)? {
        None | Some(RawDueDate::Flag(_)) => Ok(None),
        Some(RawDueDate::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(RawDueDate::Text(text)) => parse_stored_due_date(text.trim())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid due date '{}'", text))),
    }
}

/// RFC 3339, or a local date-time without an offset
fn parse_stored_due_date(text: &str) -> Option<DateTime<Local>> {
    if let Ok(due) = DateTime::parse_from_rfc3339(text) {
        return Some(due.with_timezone(&Local));
    }

    let naive = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    Local.from_local_datetime(&naive).earliest()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_task() -> Task {
        Task::new(
            TaskId(1),
            "Buy milk".to_string(),
            "two litres".to_string(),
            None,
        )
    }

    #[test]
    fn test_task_new_is_pending() {
        let task = sample_task();
        assert_eq!(task.id, TaskId(1));
        assert!(!task.completed);
        assert!(task.due_date.is_none());
    }

    #[test]
    fn test_toggle_twice_restores_task() {
        let original = sample_task();
        let mut task = original.clone();

        task.toggle();
        assert!(task.completed);

        task.toggle();
        assert_eq!(task, original);
    }

    #[test]
    fn test_json_uses_camel_case_keys() {
        let task = sample_task();
        let json = serde_json::to_value(&task).unwrap();

        assert_eq!(json["id"], 1);
        assert_eq!(json["title"], "Buy milk");
        assert_eq!(json["completed"], false);
        assert!(json["dueDate"].is_null());
    }

    #[test]
    fn test_due_date_false_means_none() {
        let json = r#"{"id":5,"title":"A","description":"","completed":false,"dueDate":false}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.due_date.is_none());
    }

    #[test]
    fn test_due_date_empty_string_means_none() {
        let json = r#"{"id":5,"title":"A","dueDate":""}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert!(task.due_date.is_none());
        assert_eq!(task.description, "");
        assert!(!task.completed);
    }

    #[test]
    fn test_due_date_survives_json() {
        let due = Local.with_ymd_and_hms(2025, 3, 4, 15, 5, 0).unwrap();
        let mut task = sample_task();
        task.due_date = Some(due);

        let json = serde_json::to_string(&task).unwrap();
        let loaded: Task = serde_json::from_str(&json).unwrap();
        assert_eq!(loaded.due_date, Some(due));
    }

    #[test]
    fn test_due_date_without_offset_is_local() {
        let json = r#"{"id":5,"title":"A","dueDate":"2025-03-04T15:05:00"}"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(
            task.due_date,
            Some(Local.with_ymd_and_hms(2025, 3, 4, 15, 5, 0).unwrap())
        );
    }

    #[test]
    fn test_invalid_due_date_is_rejected() {
        let json = r#"{"id":5,"title":"A","dueDate":"next tuesday"}"#;
        assert!(serde_json::from_str::<Task>(json).is_err());
    }

    #[test]
    fn test_due_date_formatted() {
        let mut task = sample_task();
        assert!(task.due_date_formatted().is_none());

        task.due_date = Some(Local.with_ymd_and_hms(2025, 3, 4, 15, 5, 0).unwrap());
        assert_eq!(task.due_date_formatted().unwrap(), "March 4 2025, 3:05 PM");
    }
}
