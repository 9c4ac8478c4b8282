use super::enums::{SortCriteria, StatusFilter};
use super::task::Task;
use std::cmp::Ordering;

/// Stable-partition completed tasks to the end of the list.
/// Relative order inside the pending and completed groups is preserved.
pub fn partition_completed_last(tasks: &mut [Task]) {
    // sort_by_key is stable, so this is a stable partition
    tasks.sort_by_key(|task| task.completed);
}

/// Check the completed-last ordering
#[cfg(test)]
pub fn is_completed_last(tasks: &[Task]) -> bool {
    tasks
        .windows(2)
        .all(|pair| !(pair[0].completed && !pair[1].completed))
}

/// Locale-like title comparison: case-folded first, then lowercase
/// before uppercase for titles that differ only in case
pub fn compare_titles(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| b.cmp(a))
}

/// Tasks without a due date sort as the Unix epoch
fn due_date_key(task: &Task) -> i64 {
    task.due_date.map(|due| due.timestamp_millis()).unwrap_or(0)
}

/// Sort the full list by the given criteria, then re-apply completed-last
pub fn sort_by_criteria(tasks: &mut [Task], criteria: SortCriteria) {
    match criteria {
        SortCriteria::Title => tasks.sort_by(|a, b| compare_titles(&a.title, &b.title)),
        SortCriteria::DueDate => tasks.sort_by_key(due_date_key),
        SortCriteria::CreatedAt => tasks.sort_by_key(|task| task.id),
    }
    partition_completed_last(tasks);
}

/// Case-insensitive substring match against the title.
/// An empty query matches everything.
pub fn title_matches(task: &Task, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    task.title.to_lowercase().contains(&query.to_lowercase())
}

/// Derived view: status filter intersected with the title search.
/// Never modifies the canonical list; order follows the input.
pub fn visible_tasks<'a>(tasks: &'a [Task], filter: StatusFilter, query: &str) -> Vec<&'a Task> {
    tasks
        .iter()
        .filter(|task| filter.matches(task.completed))
        .filter(|task| title_matches(task, query))
        .collect()
}
