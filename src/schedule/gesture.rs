//! The drag / resize / create-by-drag state machine.
//!
//! One continuous pointer interaction (press, move, release) is a gesture.
//! The controller holds at most one active gesture; motion produces a
//! presentation-only preview, and release produces the batch of task
//! updates for a single [`crate::ops::apply_batch_update`] call, so
//! consumers observe one atomic tree transition per gesture.

use chrono::{Duration, NaiveDate};

use crate::model::{Task, TaskTree};
use crate::schedule::calendar::{
    clamp_day_width, date_to_index, index_to_date, inclusive_width, pixel_to_index,
};

/// Error type for gesture transitions
#[derive(Debug, thiserror::Error)]
pub enum GestureError {
    #[error("a gesture is already active")]
    GestureActive,
    #[error("task {0} has no scheduled dates")]
    Unscheduled(String),
}

/// Which edge of a task bar a resize grabs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeEdge {
    Start,
    End,
}

/// The single active pointer interaction, if any. Exactly one variant holds
/// at a time, which is what makes the one-gesture-at-a-time invariant
/// checkable by type.
#[derive(Debug, Clone, PartialEq)]
pub enum GestureState {
    Idle,
    /// Whole-bar drag: both endpoints shift together
    Dragging {
        task_id: String,
        start_index: i64,
        end_index: i64,
        pointer_start: f32,
    },
    /// Left-handle resize: only the start moves, clamped at the end
    ResizingStart {
        task_id: String,
        start_index: i64,
        end_index: i64,
        pointer_start: f32,
    },
    /// Right-handle resize: only the end moves, clamped at the start
    ResizingEnd {
        task_id: String,
        start_index: i64,
        end_index: i64,
        pointer_start: f32,
    },
    /// Press-and-drag on an empty row of an unscheduled task
    CreatingRange { task_id: String, anchor_index: i64 },
}

/// Proposed schedule geometry while a gesture is in flight. Presentation
/// state only — nothing is committed until pointer-up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GesturePreview {
    pub start_index: i64,
    pub end_index: i64,
}

impl GesturePreview {
    /// Rendered bar width at the given zoom.
    pub fn width(&self, day_width: f32) -> f32 {
        inclusive_width(self.start_index, self.end_index, day_width)
    }
}

/// Drives gestures for one timeline surface.
pub struct GestureController {
    chart_start: NaiveDate,
    day_width: f32,
    state: GestureState,
}

impl GestureController {
    pub fn new(chart_start: NaiveDate, day_width: f32) -> Self {
        GestureController {
            chart_start,
            day_width: clamp_day_width(day_width),
            state: GestureState::Idle,
        }
    }

    pub fn state(&self) -> &GestureState {
        &self.state
    }

    pub fn is_active(&self) -> bool {
        self.state != GestureState::Idle
    }

    pub fn chart_start(&self) -> NaiveDate {
        self.chart_start
    }

    pub fn day_width(&self) -> f32 {
        self.day_width
    }

    /// Adjust zoom. Safe mid-gesture: deltas are recomputed from the
    /// current width on every move, so the interaction's semantics do not
    /// drift.
    pub fn set_day_width(&mut self, width: f32) {
        self.day_width = clamp_day_width(width);
    }

    /// Pointer-down on an existing task bar.
    pub fn begin_drag(&mut self, task: &Task, pointer_x: f32) -> Result<(), GestureError> {
        self.ensure_idle()?;
        let (start_index, end_index) = self.task_indices(task)?;
        self.state = GestureState::Dragging {
            task_id: task.id.clone(),
            start_index,
            end_index,
            pointer_start: pointer_x,
        };
        Ok(())
    }

    /// Pointer-down on a bar's edge handle.
    pub fn begin_resize(
        &mut self,
        task: &Task,
        edge: ResizeEdge,
        pointer_x: f32,
    ) -> Result<(), GestureError> {
        self.ensure_idle()?;
        let (start_index, end_index) = self.task_indices(task)?;
        let task_id = task.id.clone();
        self.state = match edge {
            ResizeEdge::Start => GestureState::ResizingStart {
                task_id,
                start_index,
                end_index,
                pointer_start: pointer_x,
            },
            ResizeEdge::End => GestureState::ResizingEnd {
                task_id,
                start_index,
                end_index,
                pointer_start: pointer_x,
            },
        };
        Ok(())
    }

    /// Pointer-down on the empty row of a not-yet-scheduled task. Anchors
    /// on the day column under the pointer.
    pub fn begin_create(&mut self, task_id: &str, pointer_x: f32) -> Result<(), GestureError> {
        self.ensure_idle()?;
        self.state = GestureState::CreatingRange {
            task_id: task_id.to_string(),
            anchor_index: pixel_to_index(pointer_x, self.day_width),
        };
        Ok(())
    }

    /// Pointer-move: recompute the proposed range from the captured origin
    /// and the current pointer. None when no gesture is active.
    pub fn preview(&self, pointer_x: f32) -> Option<GesturePreview> {
        match &self.state {
            GestureState::Idle => None,
            GestureState::Dragging {
                start_index,
                end_index,
                pointer_start,
                ..
            } => {
                let delta = self.day_delta(*pointer_start, pointer_x);
                Some(GesturePreview {
                    start_index: start_index + delta,
                    end_index: end_index + delta,
                })
            }
            GestureState::ResizingStart {
                start_index,
                end_index,
                pointer_start,
                ..
            } => {
                let delta = self.day_delta(*pointer_start, pointer_x);
                // never inverted: snaps to a single-day task at the end
                Some(GesturePreview {
                    start_index: (start_index + delta).min(*end_index),
                    end_index: *end_index,
                })
            }
            GestureState::ResizingEnd {
                start_index,
                end_index,
                pointer_start,
                ..
            } => {
                let delta = self.day_delta(*pointer_start, pointer_x);
                Some(GesturePreview {
                    start_index: *start_index,
                    end_index: (end_index + delta).max(*start_index),
                })
            }
            GestureState::CreatingRange { anchor_index, .. } => {
                let current = pixel_to_index(pointer_x, self.day_width);
                Some(GesturePreview {
                    start_index: (*anchor_index).min(current),
                    end_index: (*anchor_index).max(current),
                })
            }
        }
    }

    /// Pointer-up: return to idle and build the batched updates for this
    /// gesture. A zero-delta release, a cancelled gesture, or a task that
    /// vanished from the tree all yield an empty batch.
    pub fn commit(&mut self, pointer_x: f32, tree: &TaskTree) -> Vec<Task> {
        let state = std::mem::replace(&mut self.state, GestureState::Idle);
        match state {
            GestureState::Idle => Vec::new(),
            GestureState::Dragging {
                task_id,
                pointer_start,
                ..
            } => {
                let delta = self.day_delta(pointer_start, pointer_x);
                if delta == 0 {
                    return Vec::new();
                }
                let Some(task) = tree.find(&task_id) else {
                    return Vec::new();
                };
                let mut updates = Vec::new();
                collect_shifted(task, delta, &mut updates);
                updates
            }
            GestureState::ResizingStart {
                task_id,
                start_index,
                end_index,
                pointer_start,
            } => {
                let delta = self.day_delta(pointer_start, pointer_x);
                let new_start = (start_index + delta).min(end_index);
                if new_start == start_index {
                    return Vec::new();
                }
                let Some(task) = tree.find(&task_id) else {
                    return Vec::new();
                };
                let mut updated = task.clone();
                updated.start_date = Some(index_to_date(self.chart_start, new_start));
                vec![updated]
            }
            GestureState::ResizingEnd {
                task_id,
                start_index,
                end_index,
                pointer_start,
            } => {
                let delta = self.day_delta(pointer_start, pointer_x);
                let new_end = (end_index + delta).max(start_index);
                if new_end == end_index {
                    return Vec::new();
                }
                let Some(task) = tree.find(&task_id) else {
                    return Vec::new();
                };
                let mut updated = task.clone();
                updated.end_date = Some(index_to_date(self.chart_start, new_end));
                vec![updated]
            }
            GestureState::CreatingRange {
                task_id,
                anchor_index,
            } => {
                let current = pixel_to_index(pointer_x, self.day_width);
                let Some(task) = tree.find(&task_id) else {
                    return Vec::new();
                };
                let mut updated = task.clone();
                updated.start_date =
                    Some(index_to_date(self.chart_start, anchor_index.min(current)));
                updated.end_date =
                    Some(index_to_date(self.chart_start, anchor_index.max(current)));
                vec![updated]
            }
        }
    }

    /// External cancellation (pointer capture lost): discard the preview.
    /// Nothing was committed, so the pre-gesture state is already intact.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    fn ensure_idle(&self) -> Result<(), GestureError> {
        if self.is_active() {
            return Err(GestureError::GestureActive);
        }
        Ok(())
    }

    fn task_indices(&self, task: &Task) -> Result<(i64, i64), GestureError> {
        match (task.start_date, task.end_date) {
            (Some(start), Some(end)) => Ok((
                date_to_index(self.chart_start, start),
                date_to_index(self.chart_start, end),
            )),
            _ => Err(GestureError::Unscheduled(task.id.clone())),
        }
    }

    fn day_delta(&self, pointer_start: f32, pointer_x: f32) -> i64 {
        ((pointer_x - pointer_start) / self.day_width).round() as i64
    }
}

/// Collect the dragged task and, recursively, every descendant with a
/// resolvable schedule, each shifted by the same day delta. Descendants
/// without both dates keep their (absent) schedule but their children are
/// still visited.
fn collect_shifted(task: &Task, delta_days: i64, updates: &mut Vec<Task>) {
    if let (Some(start), Some(end)) = (task.start_date, task.end_date) {
        let mut shifted = task.clone();
        shifted.start_date = Some(start + Duration::days(delta_days));
        shifted.end_date = Some(end + Duration::days(delta_days));
        updates.push(shifted);
    }
    for sub in &task.subtasks {
        collect_shifted(sub, delta_days, updates);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::apply_batch_update;
    use pretty_assertions::assert_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn scheduled(id: &str, start: NaiveDate, end: NaiveDate) -> Task {
        let mut t = Task::new(id);
        t.id = id.into();
        t.start_date = Some(start);
        t.end_date = Some(end);
        t
    }

    fn unscheduled(id: &str) -> Task {
        let mut t = Task::new(id);
        t.id = id.into();
        t
    }

    /// parent 2024-08-01..03, child 2024-08-01..02, grandchild without
    /// dates, plus an unrelated sibling.
    fn sample_tree() -> TaskTree {
        let mut parent = scheduled("parent", date(2024, 8, 1), date(2024, 8, 3));
        let mut child = scheduled("child", date(2024, 8, 1), date(2024, 8, 2));
        child.subtasks.push(unscheduled("grandchild"));
        parent.subtasks.push(child);
        TaskTree::new(vec![parent, scheduled("other", date(2024, 8, 10), date(2024, 8, 12))])
    }

    fn controller() -> GestureController {
        GestureController::new(date(2024, 8, 1), 20.0)
    }

    // --- exclusivity and validation ---

    #[test]
    fn only_one_gesture_at_a_time() {
        let tree = sample_tree();
        let mut ctl = controller();
        ctl.begin_drag(tree.find("parent").unwrap(), 100.0).unwrap();
        let err = ctl
            .begin_drag(tree.find("other").unwrap(), 50.0)
            .unwrap_err();
        assert!(matches!(err, GestureError::GestureActive));
        assert!(matches!(
            ctl.begin_create("grandchild", 0.0),
            Err(GestureError::GestureActive)
        ));
    }

    #[test]
    fn drag_requires_a_schedule() {
        let mut ctl = controller();
        let err = ctl.begin_drag(&unscheduled("x"), 0.0).unwrap_err();
        assert!(matches!(err, GestureError::Unscheduled(id) if id == "x"));
        assert!(!ctl.is_active());
    }

    // --- drag ---

    #[test]
    fn drag_preview_shifts_both_endpoints() {
        let tree = sample_tree();
        let mut ctl = controller();
        ctl.begin_drag(tree.find("parent").unwrap(), 100.0).unwrap();

        // +5 days at 20 px/day
        let preview = ctl.preview(200.0).unwrap();
        assert_eq!(preview, GesturePreview { start_index: 5, end_index: 7 });
        assert_eq!(preview.width(20.0), 60.0);
    }

    #[test]
    fn drag_commit_cascades_to_scheduled_descendants() {
        let tree = sample_tree();
        let mut ctl = controller();
        ctl.begin_drag(tree.find("parent").unwrap(), 100.0).unwrap();

        let updates = ctl.commit(200.0, &tree);
        // parent and child shift; the dateless grandchild is untouched
        assert_eq!(updates.len(), 2);

        let shifted = apply_batch_update(&tree, &updates);
        let parent = shifted.find("parent").unwrap();
        assert_eq!(parent.start_date, Some(date(2024, 8, 6)));
        assert_eq!(parent.end_date, Some(date(2024, 8, 8)));
        let child = shifted.find("child").unwrap();
        assert_eq!(child.start_date, Some(date(2024, 8, 6)));
        assert_eq!(child.end_date, Some(date(2024, 8, 7)));
        // durations preserved
        assert_eq!(parent.duration_days(), Some(3));
        assert_eq!(child.duration_days(), Some(2));
        // grandchild survives, still unscheduled
        let grandchild = shifted.find("grandchild").unwrap();
        assert!(!grandchild.is_scheduled());
        // unrelated sibling untouched
        assert_eq!(shifted.find("other"), tree.find("other"));
    }

    #[test]
    fn drag_backwards_shifts_into_the_past() {
        let tree = sample_tree();
        let mut ctl = controller();
        ctl.begin_drag(tree.find("parent").unwrap(), 100.0).unwrap();

        let updates = ctl.commit(60.0, &tree); // -2 days
        let shifted = apply_batch_update(&tree, &updates);
        assert_eq!(
            shifted.find("parent").unwrap().start_date,
            Some(date(2024, 7, 30))
        );
    }

    #[test]
    fn zero_delta_release_is_a_noop() {
        let tree = sample_tree();
        let mut ctl = controller();
        ctl.begin_drag(tree.find("parent").unwrap(), 100.0).unwrap();
        // 7 px at 20 px/day rounds to zero days
        assert!(ctl.commit(107.0, &tree).is_empty());
        assert!(!ctl.is_active());
    }

    #[test]
    fn commit_after_task_vanished_is_empty() {
        let tree = sample_tree();
        let mut ctl = controller();
        ctl.begin_drag(tree.find("parent").unwrap(), 100.0).unwrap();
        let pruned = crate::ops::apply_delete(&tree, "parent");
        assert!(ctl.commit(200.0, &pruned).is_empty());
    }

    // --- resize ---

    #[test]
    fn resize_start_moves_only_the_start() {
        let tree = sample_tree();
        let mut ctl = controller();
        ctl.begin_resize(tree.find("parent").unwrap(), ResizeEdge::Start, 0.0)
            .unwrap();

        let updates = ctl.commit(20.0, &tree); // +1 day
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].start_date, Some(date(2024, 8, 2)));
        assert_eq!(updates[0].end_date, Some(date(2024, 8, 3)));
        // descendants are never resized
        assert_eq!(updates[0].id, "parent");
    }

    #[test]
    fn resize_start_clamps_at_the_end() {
        let tree = TaskTree::new(vec![scheduled(
            "t",
            date(2024, 8, 1),
            date(2024, 8, 5),
        )]);
        let mut ctl = controller();
        ctl.begin_resize(tree.find("t").unwrap(), ResizeEdge::Start, 0.0)
            .unwrap();

        // +9 days would pass the end; snaps to a single-day task
        let preview = ctl.preview(180.0).unwrap();
        assert_eq!(preview, GesturePreview { start_index: 4, end_index: 4 });

        let updates = ctl.commit(180.0, &tree);
        assert_eq!(updates[0].start_date, Some(date(2024, 8, 5)));
        assert_eq!(updates[0].end_date, Some(date(2024, 8, 5)));
        assert_eq!(updates[0].duration_days(), Some(1));
    }

    #[test]
    fn resize_end_clamps_at_the_start() {
        let tree = TaskTree::new(vec![scheduled(
            "t",
            date(2024, 8, 1),
            date(2024, 8, 5),
        )]);
        let mut ctl = controller();
        ctl.begin_resize(tree.find("t").unwrap(), ResizeEdge::End, 0.0)
            .unwrap();

        let updates = ctl.commit(-300.0, &tree); // far left of the start
        assert_eq!(updates[0].start_date, Some(date(2024, 8, 1)));
        assert_eq!(updates[0].end_date, Some(date(2024, 8, 1)));
    }

    #[test]
    fn resize_end_extends_duration() {
        let tree = sample_tree();
        let mut ctl = controller();
        ctl.begin_resize(tree.find("parent").unwrap(), ResizeEdge::End, 0.0)
            .unwrap();
        let updates = ctl.commit(40.0, &tree); // +2 days
        assert_eq!(updates[0].end_date, Some(date(2024, 8, 5)));
        assert_eq!(updates[0].duration_days(), Some(5));
    }

    // --- create-by-drag ---

    #[test]
    fn create_range_spans_min_to_max() {
        let mut tree = sample_tree();
        tree.tasks.push(unscheduled("fresh"));
        let mut ctl = controller();
        // press in day column 3, release back in column 1
        ctl.begin_create("fresh", 65.0).unwrap();

        let preview = ctl.preview(25.0).unwrap();
        assert_eq!(preview, GesturePreview { start_index: 1, end_index: 3 });

        let updates = ctl.commit(25.0, &tree);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].start_date, Some(date(2024, 8, 2)));
        assert_eq!(updates[0].end_date, Some(date(2024, 8, 4)));
    }

    #[test]
    fn create_without_motion_yields_a_single_day() {
        let mut tree = sample_tree();
        tree.tasks.push(unscheduled("fresh"));
        let mut ctl = controller();
        ctl.begin_create("fresh", 45.0).unwrap();
        let updates = ctl.commit(45.0, &tree);
        assert_eq!(updates[0].start_date, Some(date(2024, 8, 3)));
        assert_eq!(updates[0].end_date, Some(date(2024, 8, 3)));
    }

    // --- cancel and zoom ---

    #[test]
    fn cancel_discards_the_preview() {
        let tree = sample_tree();
        let mut ctl = controller();
        ctl.begin_drag(tree.find("parent").unwrap(), 100.0).unwrap();
        ctl.cancel();
        assert!(!ctl.is_active());
        assert!(ctl.preview(500.0).is_none());
        assert!(ctl.commit(500.0, &tree).is_empty());
    }

    #[test]
    fn zoom_change_mid_gesture_uses_current_width() {
        let tree = sample_tree();
        let mut ctl = controller();
        ctl.begin_drag(tree.find("parent").unwrap(), 100.0).unwrap();

        // 100 px is +5 days at 20 px/day, but +2 days after zooming to 50
        ctl.set_day_width(50.0);
        let preview = ctl.preview(200.0).unwrap();
        assert_eq!(preview, GesturePreview { start_index: 2, end_index: 4 });
    }

    #[test]
    fn day_width_is_clamped_on_construction_and_update() {
        let mut ctl = GestureController::new(date(2024, 8, 1), 1.0);
        assert_eq!(ctl.day_width(), 10.0);
        ctl.set_day_width(1000.0);
        assert_eq!(ctl.day_width(), 100.0);
    }
}
