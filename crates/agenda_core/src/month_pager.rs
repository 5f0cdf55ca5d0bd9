//! Month pager backing the expandable month grid.
//!
//! Unlike the week strip this is a fixed three-page window (previous,
//! current, next month) recycled around a cursor: every swipe commit
//! recenters the surface without animation and advances the cursor in the
//! same step. Some scroll surfaces deliver a second momentum-end right after
//! such a recycle, so commits are guarded both by the resetting flag and by
//! a short wall-clock window.

use chrono::NaiveDate;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::date::{add_months, iso_day, month_start, same_day_in_month};

/// Momentum-end events arriving this soon after a recycle are echoes of the
/// recenter itself, not user swipes.
pub const RECENTER_GUARD: Duration = Duration::from_millis(300);

pub const MONTH_PAGE_COUNT: usize = 3;
pub const MONTH_CENTER_INDEX: usize = 1;

pub struct MonthPager {
    cursor: NaiveDate,
    resetting: bool,
    ignore_until: Option<Instant>,
}

impl MonthPager {
    pub fn new(month: NaiveDate) -> Self {
        Self {
            cursor: month_start(month),
            resetting: false,
            ignore_until: None,
        }
    }

    /// First day of the centered month.
    pub fn cursor_month(&self) -> NaiveDate {
        self.cursor
    }

    /// The three month starts currently backing the pages.
    pub fn pages(&self) -> [NaiveDate; MONTH_PAGE_COUNT] {
        [
            add_months(self.cursor, -1),
            self.cursor,
            add_months(self.cursor, 1),
        ]
    }

    pub fn is_resetting(&self) -> bool {
        self.resetting
    }

    /// Sync the cursor when the grid opens. The host must recenter the
    /// surface unanimated and call [`finish_reset`](Self::finish_reset) after
    /// the next frame.
    pub fn open_at(&mut self, selected: NaiveDate, now: Instant) {
        self.cursor = month_start(selected);
        self.begin_reset(now);
    }

    pub fn begin_reset(&mut self, now: Instant) {
        self.resetting = true;
        self.ignore_until = Some(now + RECENTER_GUARD);
    }

    /// Clear the resetting flag, strictly after the recenter has rendered.
    pub fn finish_reset(&mut self) {
        self.resetting = false;
    }

    /// A swipe settled on `settled_index`. Returns the day that becomes the
    /// new selection: same day-of-month as `selected`, clamped to the target
    /// month's length. `None` means the event was a recenter echo or the
    /// surface settled back on the center page.
    pub fn on_momentum_end(
        &mut self,
        settled_index: usize,
        selected: NaiveDate,
        now: Instant,
    ) -> Option<NaiveDate> {
        if self.resetting {
            return None;
        }
        if self.ignore_until.is_some_and(|until| now < until) {
            return None;
        }
        if settled_index == MONTH_CENTER_INDEX {
            return None;
        }

        let forward = settled_index > MONTH_CENTER_INDEX;
        self.cursor = add_months(self.cursor, if forward { 1 } else { -1 });
        // Block immediately: the recenter can fire another momentum end.
        self.begin_reset(now);

        let next = same_day_in_month(self.cursor, selected);
        debug!(month = %iso_day(self.cursor), next = %iso_day(next), "month swipe commit");
        Some(next)
    }
}
