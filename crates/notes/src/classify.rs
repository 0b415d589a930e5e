//! Partition fetched tasks by category and derive presentation values.

use chrono::NaiveDate;
use habitica::{Task, TaskCategory};
use tracing::warn;

/// Glyphs for the four priority steps, lowest first.
const PRIORITY_GLYPHS: [&str; 4] = ["⏬", "🔽", "🔼", "⏫"];

/// Tasks grouped by category. Every known category has a bucket, possibly
/// empty; rewards and completed todos are carried here but never persisted.
#[derive(Debug, Default)]
pub struct TaskCollection {
    pub habits: Vec<Task>,
    pub dailies: Vec<Task>,
    pub todos: Vec<Task>,
    pub rewards: Vec<Task>,
    pub completed_todos: Vec<Task>,
}

impl TaskCollection {
    /// Bucket for a known category; `Unknown` has no bucket.
    #[must_use]
    pub fn for_category(&self, category: TaskCategory) -> Option<&[Task]> {
        match category {
            TaskCategory::Habit => Some(&self.habits),
            TaskCategory::Daily => Some(&self.dailies),
            TaskCategory::Todo => Some(&self.todos),
            TaskCategory::Reward => Some(&self.rewards),
            TaskCategory::CompletedTodo => Some(&self.completed_todos),
            TaskCategory::Unknown => None,
        }
    }

    /// Buckets that get written to storage, in fixed order. Rewards and
    /// completed todos are fetched but never persisted.
    pub fn persisted(&self) -> impl Iterator<Item = (TaskCategory, &[Task])> {
        [
            (TaskCategory::Habit, self.habits.as_slice()),
            (TaskCategory::Daily, self.dailies.as_slice()),
            (TaskCategory::Todo, self.todos.as_slice()),
        ]
        .into_iter()
    }

    /// Total task count across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        TaskCategory::KNOWN
            .iter()
            .filter_map(|&category| self.for_category(category))
            .map(<[Task]>::len)
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Group tasks by category, preserving input order within each bucket. A task
/// whose category is not one of the five known values is dropped with a
/// warning; classification itself never fails.
#[must_use]
pub fn classify(tasks: Vec<Task>) -> TaskCollection {
    let mut collection = TaskCollection::default();
    for task in tasks {
        match task.category {
            TaskCategory::Habit => collection.habits.push(task),
            TaskCategory::Daily => collection.dailies.push(task),
            TaskCategory::Todo => collection.todos.push(task),
            TaskCategory::Reward => collection.rewards.push(task),
            TaskCategory::CompletedTodo => collection.completed_todos.push(task),
            TaskCategory::Unknown => {
                warn!(task_id = %task.id, "dropping task with unknown category");
            }
        }
    }
    collection
}

/// Resolve the date a task should display as due.
///
/// Dailies are always due on the given day. A todo with upcoming due instants
/// shows the earliest of them; a todo with only a direct date shows that.
/// Everything else has no due date.
#[must_use]
pub fn due_display(task: &Task, today: NaiveDate) -> Option<NaiveDate> {
    match task.category {
        TaskCategory::Daily => Some(today),
        TaskCategory::Todo => task
            .next_due
            .iter()
            .min()
            .or(task.date.as_ref())
            .map(|instant| instant.date_naive()),
        _ => None,
    }
}

/// Map a priority value to its glyph. Total over the real line: values are
/// clamped into [0, 3] and rounded, NaN counts as lowest.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn priority_glyph(priority: f64) -> &'static str {
    let clamped = if priority.is_nan() {
        0.0
    } else {
        priority.clamp(0.0, 3.0)
    };
    PRIORITY_GLYPHS[clamped.round() as usize]
}
