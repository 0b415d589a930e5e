//! Habitica entity type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The five task kinds Habitica serves, plus a fallback for anything the API
/// grows later. Unknown categories deserialize instead of failing the whole
/// response; downstream classification drops them with a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskCategory {
    Habit,
    Daily,
    Todo,
    Reward,
    CompletedTodo,
    #[serde(other)]
    Unknown,
}

impl TaskCategory {
    /// The five categories the remote account can actually hold.
    pub const KNOWN: [Self; 5] = [
        Self::Habit,
        Self::Daily,
        Self::Todo,
        Self::Reward,
        Self::CompletedTodo,
    ];

    /// Wire name, as it appears in the `type` field of a task.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Habit => "habit",
            Self::Daily => "daily",
            Self::Todo => "todo",
            Self::Reward => "reward",
            Self::CompletedTodo => "completedTodo",
            Self::Unknown => "unknown",
        }
    }

    /// Value for the `type` query parameter of `GET /tasks/user`. The API
    /// takes the plural spellings here ("dailys" included).
    #[must_use]
    pub const fn query_value(self) -> Option<&'static str> {
        match self {
            Self::Habit => Some("habits"),
            Self::Daily => Some("dailys"),
            Self::Todo => Some("todos"),
            Self::Reward => Some("rewards"),
            Self::CompletedTodo => Some("completedTodos"),
            Self::Unknown => None,
        }
    }
}

impl fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a task's checklist.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    /// Unique identifier within the task
    pub id: String,
    /// Entry text
    pub text: String,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
}

/// One remote work item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique identifier within the remote account
    #[serde(alias = "_id")]
    pub id: String,
    /// Task kind
    #[serde(rename = "type")]
    pub category: TaskCategory,
    /// Free text shown to the user
    pub text: String,
    /// Completion flag (absent for habits and rewards)
    #[serde(default)]
    pub completed: bool,
    /// Difficulty; expected in 0-3 but may arrive out of range
    #[serde(default = "default_priority")]
    pub priority: f64,
    /// Direct due instant, when set on a todo
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    /// Upcoming due instants, when the task repeats
    #[serde(default)]
    pub next_due: Vec<DateTime<Utc>>,
    /// Ordered checklist
    #[serde(default)]
    pub checklist: Vec<ChecklistItem>,
    /// Tag identifiers
    #[serde(default)]
    pub tags: Vec<String>,
}

const fn default_priority() -> f64 {
    1.0
}

/// Optional filters for `GET /tasks/user`.
#[derive(Debug, Clone, Default)]
pub struct TaskQuery {
    /// Restrict the fetch to one category
    pub category: Option<TaskCategory>,
    /// Forwarded as the `dueDate` parameter
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskQuery {
    /// Fetch only the given category.
    #[must_use]
    pub fn category(category: TaskCategory) -> Self {
        Self {
            category: Some(category),
            due_date: None,
        }
    }

    /// Query-string pairs for the request.
    #[must_use]
    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(value) = self.category.and_then(TaskCategory::query_value) {
            params.push(("type", value.to_string()));
        }
        if let Some(due) = self.due_date {
            params.push(("dueDate", due.to_rfc3339()));
        }
        params
    }
}

/// Response envelope used by every Habitica endpoint.
#[derive(Debug, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
}
