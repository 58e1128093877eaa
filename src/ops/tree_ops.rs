//! Pure mutation functions over [`TaskTree`].
//!
//! Every function takes the tree by reference and returns a new tree; the
//! input is never touched. Mutations referencing an id absent from the tree
//! return a tree deeply equal to the input — a stale UI reference must not
//! crash a mutation.

use indexmap::IndexMap;

use crate::model::{Task, TaskTree};

/// Error type for tree operations
#[derive(Debug, thiserror::Error)]
pub enum TreeError {
    #[error("cannot reparent {id} under {new_parent_id}: target is inside the moved subtree")]
    WouldCreateCycle { id: String, new_parent_id: String },
}

/// Aggregated completion over a tree. Every node counts once toward
/// `total`; a node counts toward `completed` from its own flag alone,
/// regardless of its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Completion percentage; the empty forest is 0%.
    pub fn percent(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.completed as f64 / self.total as f64 * 100.0
        }
    }
}

/// Replace the task whose id matches `updated.id` wholesale, children
/// included. Children absent from `updated.subtasks` are gone, not merged.
pub fn apply_update(tree: &TaskTree, updated: &Task) -> TaskTree {
    TaskTree::new(update_in_list(&tree.tasks, updated))
}

fn update_in_list(tasks: &[Task], updated: &Task) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            if task.id == updated.id {
                updated.clone()
            } else {
                Task {
                    subtasks: update_in_list(&task.subtasks, updated),
                    ..task.clone()
                }
            }
        })
        .collect()
}

/// Apply many updates in one traversal. A matched node takes its own fields
/// from the update but keeps the recursively updated children — a batch
/// update must not truncate an unrelated subtree. Update ids absent from
/// the tree are ignored.
pub fn apply_batch_update(tree: &TaskTree, updates: &[Task]) -> TaskTree {
    let by_id: IndexMap<&str, &Task> = updates.iter().map(|u| (u.id.as_str(), u)).collect();
    TaskTree::new(batch_in_list(&tree.tasks, &by_id))
}

fn batch_in_list(tasks: &[Task], by_id: &IndexMap<&str, &Task>) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            let subtasks = batch_in_list(&task.subtasks, by_id);
            match by_id.get(task.id.as_str()) {
                Some(update) => Task {
                    subtasks,
                    ..(*update).clone()
                },
                None => Task {
                    subtasks,
                    ..task.clone()
                },
            }
        })
        .collect()
}

/// Remove the task with the given id together with its entire subtree.
pub fn apply_delete(tree: &TaskTree, id: &str) -> TaskTree {
    TaskTree::new(delete_in_list(&tree.tasks, id))
}

fn delete_in_list(tasks: &[Task], id: &str) -> Vec<Task> {
    tasks
        .iter()
        .filter(|task| task.id != id)
        .map(|task| Task {
            subtasks: delete_in_list(&task.subtasks, id),
            ..task.clone()
        })
        .collect()
}

/// Append `new_task` to the end of `parent_id`'s subtask list. An unknown
/// parent leaves the tree unchanged.
pub fn apply_add_subtask(tree: &TaskTree, parent_id: &str, new_task: Task) -> TaskTree {
    TaskTree::new(add_in_list(&tree.tasks, parent_id, &new_task))
}

fn add_in_list(tasks: &[Task], parent_id: &str, new_task: &Task) -> Vec<Task> {
    tasks
        .iter()
        .map(|task| {
            if task.id == parent_id {
                let mut subtasks = task.subtasks.clone();
                subtasks.push(new_task.clone());
                Task {
                    subtasks,
                    ..task.clone()
                }
            } else {
                Task {
                    subtasks: add_in_list(&task.subtasks, parent_id, new_task),
                    ..task.clone()
                }
            }
        })
        .collect()
}

/// Detach the task with the given id (subtree intact) and return it
/// alongside the tree with that task removed. The first half of
/// reparenting.
pub fn find_and_remove(tree: &TaskTree, id: &str) -> (Option<Task>, TaskTree) {
    let mut removed = None;
    let tasks = detach_in_list(&tree.tasks, id, &mut removed);
    (removed, TaskTree::new(tasks))
}

fn detach_in_list(tasks: &[Task], id: &str, removed: &mut Option<Task>) -> Vec<Task> {
    let mut out = Vec::with_capacity(tasks.len());
    for task in tasks {
        if task.id == id {
            *removed = Some(task.clone());
            continue;
        }
        out.push(Task {
            subtasks: detach_in_list(&task.subtasks, id, removed),
            ..task.clone()
        });
    }
    out
}

/// Move the task with the given id (subtree unmodified) under a new parent,
/// inserting as the last child, or to the top level when `new_parent_id` is
/// None. A missing id or a missing parent is a no-op. Reparenting a task
/// under its own descendant is rejected.
pub fn apply_reparent(
    tree: &TaskTree,
    id: &str,
    new_parent_id: Option<&str>,
) -> Result<TaskTree, TreeError> {
    if let Some(parent_id) = new_parent_id {
        if parent_id == id || tree.is_descendant(id, parent_id) {
            return Err(TreeError::WouldCreateCycle {
                id: id.to_string(),
                new_parent_id: parent_id.to_string(),
            });
        }
        // A vanished parent must not swallow the detached subtree
        if !tree.contains(parent_id) {
            return Ok(tree.clone());
        }
    }

    let (removed, remaining) = find_and_remove(tree, id);
    let Some(task) = removed else {
        return Ok(tree.clone());
    };

    match new_parent_id {
        None => {
            let mut tasks = remaining.tasks;
            tasks.push(task);
            Ok(TaskTree::new(tasks))
        }
        Some(parent_id) => Ok(apply_add_subtask(&remaining, parent_id, task)),
    }
}

/// Count completion over the whole tree.
pub fn progress(tree: &TaskTree) -> Progress {
    let mut tally = Progress::default();
    tree.for_each(&mut |task| {
        tally.total += 1;
        if task.completed {
            tally.completed += 1;
        }
    });
    tally
}
