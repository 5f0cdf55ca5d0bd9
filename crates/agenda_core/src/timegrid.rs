//! Vertical time-grid mapping for the day canvas.

pub const MINUTES_PER_DAY: i32 = 24 * 60;

/// User-facing start times snap to this grid.
pub const SNAP_STEP_MIN: i32 = 15;

/// Resizing can never shrink an event below this.
pub const MIN_EVENT_MIN: i32 = 15;

/// Duration given to newly created events.
pub const DEFAULT_CREATE_MIN: i32 = 30;

/// Logical pixels per hour row unless the canvas overrides it.
pub const DEFAULT_ROW_HEIGHT: f32 = 68.0;

pub fn minutes_to_y(row_height: f32, minutes: i32) -> f32 {
    (minutes as f32 / 60.0) * row_height
}

pub fn y_to_minutes(row_height: f32, y: f32) -> i32 {
    ((y / row_height) * 60.0).round() as i32
}

/// Round to the nearest multiple of `step`.
pub fn snap_minutes(minutes: i32, step: i32) -> i32 {
    if step <= 0 {
        return minutes;
    }
    ((minutes as f32 / step as f32).round() as i32) * step
}

/// Clamp into `[0, 1440)`.
pub fn clamp_minutes_in_day(minutes: i32) -> i32 {
    minutes.clamp(0, MINUTES_PER_DAY - 1)
}
