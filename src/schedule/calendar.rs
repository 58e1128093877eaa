//! Conversions between civil dates, day indices, and pixel coordinates.
//!
//! A timeline surface anchors on a chart start date; a day index is the
//! whole-day offset from that anchor. Day arithmetic is exact integer
//! arithmetic — floats appear only at the pixel boundary.

use chrono::{Duration, NaiveDate};

/// Narrowest allowed zoom (pixels per day)
pub const MIN_DAY_WIDTH: f32 = 10.0;
/// Widest allowed zoom (pixels per day)
pub const MAX_DAY_WIDTH: f32 = 100.0;

/// Clamp a user-adjusted zoom factor to the supported range.
pub fn clamp_day_width(width: f32) -> f32 {
    width.clamp(MIN_DAY_WIDTH, MAX_DAY_WIDTH)
}

/// Whole-day offset of `date` from the chart start. Negative for dates
/// before the start.
pub fn date_to_index(start: NaiveDate, date: NaiveDate) -> i64 {
    (date - start).num_days()
}

/// Inverse of [`date_to_index`].
pub fn index_to_date(start: NaiveDate, index: i64) -> NaiveDate {
    start + Duration::days(index)
}

/// Which day column a pixel coordinate falls into.
pub fn pixel_to_index(pixel: f32, day_width: f32) -> i64 {
    (pixel / day_width).floor() as i64
}

/// Rendered width of an inclusive index span: a task from day N to day N
/// occupies exactly one day width, never zero.
pub fn inclusive_width(start_index: i64, end_index: i64, day_width: f32) -> f32 {
    (end_index - start_index + 1) as f32 * day_width
}
