use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single node in the task forest.
///
/// Serializes in the camelCase shape the remote document store holds
/// (`startDate`, `endDate`, `imageUrl`). All fields other than `id` and
/// `name` default when absent, so partial documents deserialize cleanly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Opaque id, unique across the whole tree, stable for the task's life
    pub id: String,
    /// Display text (persisted tasks should have trimmed content)
    pub name: String,
    /// Independently settable at any level — a parent may be complete while
    /// its children are not
    #[serde(default)]
    pub completed: bool,
    /// Free text, may be empty
    #[serde(default)]
    pub description: String,
    /// Ordered children, exclusively owned by this task
    #[serde(default)]
    pub subtasks: Vec<Task>,
    /// Scheduled range start (civil date, UTC reference)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_date: Option<NaiveDate>,
    /// Scheduled range end, inclusive
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    /// Ids of tasks this one depends on (informational, not enforced)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    /// Opaque reference to an attached image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Task {
    /// Create a task with a fresh id and no schedule.
    pub fn new(name: impl Into<String>) -> Self {
        Task {
            id: generate_task_id(),
            name: name.into(),
            completed: false,
            description: String::new(),
            subtasks: Vec::new(),
            start_date: None,
            end_date: None,
            dependencies: Vec::new(),
            image_url: None,
        }
    }

    /// True when both range endpoints are set.
    pub fn is_scheduled(&self) -> bool {
        self.start_date.is_some() && self.end_date.is_some()
    }

    /// Inclusive day span of the scheduled range. A task spanning a single
    /// day has duration 1. None when unscheduled.
    pub fn duration_days(&self) -> Option<i64> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) => Some((end - start).num_days() + 1),
            _ => None,
        }
    }
}

/// Generate a tree-unique task id.
pub fn generate_task_id() -> String {
    Uuid::new_v4().to_string()
}
