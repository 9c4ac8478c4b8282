pub mod enums;
pub mod task;
pub mod views;

pub use enums::{FormField, LoginField, SortCriteria, StatusFilter, UiMode};
pub use task::{Task, TaskId};
pub use views::{partition_completed_last, sort_by_criteria, visible_tasks};

#[cfg(test)]
pub use views::is_completed_last;
