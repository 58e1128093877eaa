//! Hierarchical task scheduling core.
//!
//! The crate owns three things: the recursive task tree and the pure
//! mutation functions over it, the calendar/day-index mapping a timeline
//! surface needs, and the gesture state machine that turns pointer motion
//! into batched date updates. Persistence is a trait boundary; the
//! [`sync::SyncAdapter`] applies mutations optimistically and reverts on
//! save failure.

pub mod model;
pub mod ops;
pub mod schedule;
pub mod sync;
