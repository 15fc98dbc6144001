//! View Helpers
//!
//! Derives what the pages display from the collection stores: the task subset
//! of one type, the linked journal title, and the new-task form state.

use chrono::NaiveDate;

use crate::models::{EntityId, JournalEntry, NewTask, Task, TaskType};
use crate::store::Collection;

/// Tasks of one type, in collection order
pub fn tasks_of_type(tasks: &[Task], task_type: TaskType) -> Vec<Task> {
    tasks.iter().filter(|t| t.task_type == task_type).cloned().collect()
}

/// Split tasks into the daily and general buckets
pub fn partition_by_type(tasks: &[Task]) -> (Vec<Task>, Vec<Task>) {
    tasks.iter().cloned().partition(|t| t.task_type == TaskType::Daily)
}

/// Title of the journal entry a task links to.
///
/// Resolved against the loaded journal; until the journal has loaded, the
/// title the server joined into the task is shown instead.
pub fn linked_title<'a>(task: &'a Task, journal: &'a Collection<JournalEntry>) -> Option<&'a str> {
    let id = task.journal_entry_id?;
    if journal.is_loaded() {
        journal.get(id).map(|entry| entry.title.as_str())
    } else {
        task.journal_entry_title.as_deref()
    }
}

/// One rendered row of a task list
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRow {
    pub task: Task,
    pub link_title: Option<String>,
    pub pending: bool,
}

pub fn task_rows(tasks: &Collection<Task>, journal: &Collection<JournalEntry>, task_type: TaskType) -> Vec<TaskRow> {
    tasks_of_type(tasks.items(), task_type)
        .into_iter()
        .map(|task| TaskRow {
            link_title: linked_title(&task, journal).map(str::to_string),
            pending: tasks.is_pending(task.id),
            task,
        })
        .collect()
}

/// Pending input of the new-task form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskForm {
    pub text: String,
    /// Raw value of the date input (`YYYY-MM-DD` or empty)
    pub due_date: String,
    pub journal_entry_id: Option<EntityId>,
}

impl TaskForm {
    /// Turn the form into a create request and clear it.
    ///
    /// Blank text leaves the form untouched and yields nothing.
    pub fn take_draft(&mut self, task_type: TaskType) -> Option<NewTask> {
        let text = self.text.trim();
        if text.is_empty() {
            return None;
        }
        let draft = NewTask {
            text: text.to_string(),
            due_date: NaiveDate::parse_from_str(self.due_date.trim(), "%Y-%m-%d").ok(),
            task_type,
            journal_entry_id: self.journal_entry_id,
        };
        *self = TaskForm::default();
        Some(draft)
    }
}
