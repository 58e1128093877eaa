use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::task::Task;

/// Violation of a tree-wide invariant, caught when ingesting a tree from
/// the remote store.
#[derive(Debug, thiserror::Error)]
pub enum TreeInvariantError {
    #[error("duplicate task id in tree: {0}")]
    DuplicateId(String),
}

/// The rooted, ordered forest of tasks for a single owner.
///
/// Invariant: every id is unique across the whole tree, not just among
/// siblings. Mutation functions in [`crate::ops`] preserve this; trees
/// arriving from outside are checked with [`TaskTree::validate`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskTree {
    pub tasks: Vec<Task>,
}

impl TaskTree {
    pub fn new(tasks: Vec<Task>) -> Self {
        TaskTree { tasks }
    }

    /// Find a task by id at any depth.
    pub fn find(&self, id: &str) -> Option<&Task> {
        find_in_list(&self.tasks, id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.find(id).is_some()
    }

    /// Visit every task in the tree, parents before children.
    pub fn for_each(&self, f: &mut dyn FnMut(&Task)) {
        for_each_in_list(&self.tasks, f);
    }

    /// Total number of tasks at all depths.
    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.for_each(&mut |_| count += 1);
        count
    }

    /// True when the task with `id` sits anywhere inside the subtree rooted
    /// at `ancestor_id`. A task is not its own descendant.
    pub fn is_descendant(&self, ancestor_id: &str, id: &str) -> bool {
        self.find(ancestor_id)
            .is_some_and(|ancestor| find_in_list(&ancestor.subtasks, id).is_some())
    }

    /// Check the tree-wide unique-id invariant.
    pub fn validate(&self) -> Result<(), TreeInvariantError> {
        let mut seen: HashSet<String> = HashSet::new();
        let mut duplicate: Option<String> = None;
        self.for_each(&mut |task| {
            if duplicate.is_none() && !seen.insert(task.id.clone()) {
                duplicate = Some(task.id.clone());
            }
        });
        match duplicate {
            Some(id) => Err(TreeInvariantError::DuplicateId(id)),
            None => Ok(()),
        }
    }
}

fn find_in_list<'a>(tasks: &'a [Task], id: &str) -> Option<&'a Task> {
    for task in tasks {
        if task.id == id {
            return Some(task);
        }
        if let Some(found) = find_in_list(&task.subtasks, id) {
            return Some(found);
        }
    }
    None
}

fn for_each_in_list(tasks: &[Task], f: &mut dyn FnMut(&Task)) {
    for task in tasks {
        f(task);
        for_each_in_list(&task.subtasks, f);
    }
}
