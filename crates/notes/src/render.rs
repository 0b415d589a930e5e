//! Deterministic task → markdown projection.

use std::fmt::Write as _;

use chrono::NaiveDate;
use habitica::Task;

use crate::classify::{due_display, priority_glyph};

/// Per-sync rendering configuration, owned by the caller and applied
/// uniformly to every task.
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Prefix for checklist lines
    pub indent: String,
    /// Tag token inserted after the checkbox of every primary line
    pub global_tag: Option<String>,
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            indent: "    ".to_string(),
            global_tag: None,
        }
    }
}

/// Render one task as a markdown block: a primary checkbox line followed by
/// one indented checkbox line per checklist entry.
///
/// Pure: identical task, settings and `today` always yield identical text.
/// `today` feeds due-date resolution and is the projection's only notion of
/// time.
#[must_use]
pub fn render_task(task: &Task, settings: &RenderSettings, today: NaiveDate) -> String {
    let mut line = String::new();
    line.push_str(checkbox(task.completed));

    if let Some(tag) = &settings.global_tag {
        write!(line, " #{tag}").ok();
    }

    write!(line, " {} {}", task.text, priority_glyph(task.priority)).ok();

    if let Some(due) = due_display(task, today) {
        write!(line, " 📅 {}", due.format("%Y-%m-%d")).ok();
    }

    for item in &task.checklist {
        write!(line, "\n{}{} {}", settings.indent, checkbox(item.completed), item.text).ok();
    }

    line
}

const fn checkbox(completed: bool) -> &'static str {
    if completed {
        "- [x]"
    } else {
        "- [ ]"
    }
}
