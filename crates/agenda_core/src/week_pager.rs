//! Infinite week pager.
//!
//! Presents a fixed window of week pages around a center date. Jumping to a
//! date outside the window rebuilds the whole window and defers the focus
//! scroll until the host surface has committed the new pages; the deferred
//! scroll is unanimated, since the jump is a data reset rather than a pan.

use chrono::{Duration, NaiveDate};
use tracing::debug;

use crate::date::{days_between, iso_day, week_start, weekday_offset};

pub const DEFAULT_WEEKS_BEFORE: usize = 208; // ~4 years
pub const DEFAULT_WEEKS_AFTER: usize = 208;

/// A scroll the host surface should perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollRequest {
    pub index: usize,
    pub animated: bool,
}

/// Outcome of a scroll-to-date request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeekScroll {
    /// The target week was already in the window.
    InWindow(ScrollRequest),
    /// The window was rebuilt around the target; the focus scroll is pending
    /// until the host commits the new pages (see
    /// [`WeekPager::take_pending_scroll`]).
    Rebuilt,
}

pub struct WeekPager {
    /// Mondays of the windowed weeks, oldest first.
    pages: Vec<NaiveDate>,
    focused: usize,
    before: usize,
    after: usize,
    pending_focus: Option<NaiveDate>,
}

impl WeekPager {
    pub fn new(center: NaiveDate, before: usize, after: usize) -> Self {
        Self {
            pages: build_weeks_around(center, before, after),
            focused: before,
            before,
            after,
            pending_focus: None,
        }
    }

    pub fn pages(&self) -> &[NaiveDate] {
        &self.pages
    }

    pub fn focused_index(&self) -> usize {
        self.focused
    }

    pub fn focused_week_start(&self) -> NaiveDate {
        self.pages[self.focused]
    }

    fn index_of_week(&self, start: NaiveDate) -> Option<usize> {
        let delta = days_between(self.pages[0], start);
        if delta < 0 || delta % 7 != 0 {
            return None;
        }
        let idx = (delta / 7) as usize;
        (idx < self.pages.len()).then_some(idx)
    }

    /// Focus the week containing `day`, rebuilding the window if needed.
    pub fn scroll_to_date(&mut self, day: NaiveDate, animated: bool) -> WeekScroll {
        let start = week_start(day);
        if let Some(index) = self.index_of_week(start) {
            self.focused = index;
            return WeekScroll::InWindow(ScrollRequest { index, animated });
        }

        debug!(target_week = %iso_day(start), "week window rebuild");
        self.pending_focus = Some(start);
        self.pages = build_weeks_around(day, self.before, self.after);
        WeekScroll::Rebuilt
    }

    /// Resolve a deferred focus scroll once the rebuilt window is committed.
    pub fn take_pending_scroll(&mut self) -> Option<ScrollRequest> {
        let start = self.pending_focus.take()?;
        let index = self.index_of_week(start).unwrap_or(self.before);
        self.focused = index;
        Some(ScrollRequest {
            index,
            animated: false,
        })
    }

    /// A swipe settled on `settled_index`. Returns the day that becomes the
    /// new selection: the day in the settled week at the same weekday offset
    /// as the previously selected day, so "which day of the week" survives
    /// paging.
    pub fn commit_swipe(&mut self, settled_index: usize, selected: NaiveDate) -> NaiveDate {
        self.focused = settled_index.min(self.pages.len() - 1);
        self.day_at_focus(selected)
    }

    /// Chevron navigation: one page forward or back, clamped at the window
    /// bounds, with the same deterministic selection rule as a swipe.
    pub fn step(&mut self, forward: bool, selected: NaiveDate) -> (ScrollRequest, NaiveDate) {
        self.focused = if forward {
            (self.focused + 1).min(self.pages.len() - 1)
        } else {
            self.focused.saturating_sub(1)
        };
        (
            ScrollRequest {
                index: self.focused,
                animated: true,
            },
            self.day_at_focus(selected),
        )
    }

    /// The host surface could not lay out the requested page. Recover by
    /// snapping to the logical center without animation.
    pub fn on_scroll_failed(&mut self) -> ScrollRequest {
        self.focused = self.before.min(self.pages.len() - 1);
        ScrollRequest {
            index: self.focused,
            animated: false,
        }
    }

    fn day_at_focus(&self, selected: NaiveDate) -> NaiveDate {
        self.pages[self.focused] + Duration::days(weekday_offset(selected) as i64)
    }
}

fn build_weeks_around(center: NaiveDate, before: usize, after: usize) -> Vec<NaiveDate> {
    let first = week_start(center) - Duration::weeks(before as i64);
    (0..before + after + 1)
        .map(|i| first + Duration::weeks(i as i64))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::date::parse_iso_day;
    use pretty_assertions::assert_eq;

    fn d(iso: &str) -> NaiveDate {
        parse_iso_day(iso).unwrap()
    }

    #[test]
    fn window_is_centered_on_the_focused_week() {
        let pager = WeekPager::new(d("2024-06-12"), 4, 4);
        assert_eq!(pager.pages().len(), 9);
        assert_eq!(pager.focused_index(), 4);
        assert_eq!(pager.focused_week_start(), d("2024-06-10"));
        assert_eq!(pager.pages()[0], d("2024-05-13"));
        assert_eq!(pager.pages()[8], d("2024-07-08"));
    }

    #[test]
    fn in_window_scroll_keeps_the_animation_flag() {
        let mut pager = WeekPager::new(d("2024-06-12"), 4, 4);
        let outcome = pager.scroll_to_date(d("2024-06-20"), true);
        assert_eq!(
            outcome,
            WeekScroll::InWindow(ScrollRequest {
                index: 5,
                animated: true
            })
        );
        assert_eq!(pager.focused_week_start(), d("2024-06-17"));
    }

    #[test]
    fn out_of_window_jump_rebuilds_then_focuses_unanimated() {
        let mut pager = WeekPager::new(d("2024-06-12"), 4, 4);
        let outcome = pager.scroll_to_date(d("2030-01-15"), true);
        assert_eq!(outcome, WeekScroll::Rebuilt);

        let pending = pager.take_pending_scroll().unwrap();
        assert!(!pending.animated);
        assert_eq!(pager.focused_week_start(), week_start(d("2030-01-15")));
        // the pending scroll resolves exactly once
        assert_eq!(pager.take_pending_scroll(), None);
    }

    #[test]
    fn focused_page_always_contains_the_target() {
        // in-window and rebuild-requiring targets alike
        for iso in ["2024-06-10", "2024-07-01", "2019-02-28", "2031-12-31"] {
            let mut pager = WeekPager::new(d("2024-06-12"), 8, 8);
            match pager.scroll_to_date(d(iso), true) {
                WeekScroll::InWindow(_) => {}
                WeekScroll::Rebuilt => {
                    pager.take_pending_scroll().unwrap();
                }
            }
            let start = pager.focused_week_start();
            let delta = days_between(start, d(iso));
            assert!((0..7).contains(&delta), "{iso} not inside focused week");
        }
    }

    #[test]
    fn swipe_preserves_the_weekday_offset() {
        for k in 0..7u32 {
            let selected = d("2024-06-10") + Duration::days(k as i64);
            let mut pager = WeekPager::new(selected, 4, 4);

            let next = pager.commit_swipe(5, selected);
            assert_eq!(weekday_offset(next), k);
            assert_eq!(week_start(next), d("2024-06-17"));

            let prev = pager.commit_swipe(3, next);
            assert_eq!(weekday_offset(prev), k);
            assert_eq!(week_start(prev), d("2024-06-03"));
        }
    }

    #[test]
    fn chevrons_clamp_at_the_window_bounds() {
        let mut pager = WeekPager::new(d("2024-06-12"), 1, 1);
        let (req, _) = pager.step(false, d("2024-06-12"));
        assert_eq!(req.index, 0);
        let (req, _) = pager.step(false, d("2024-06-05"));
        assert_eq!(req.index, 0);
        let (req, day) = pager.step(true, d("2024-06-05"));
        assert_eq!(req.index, 1);
        assert_eq!(day, d("2024-06-12"));
    }

    #[test]
    fn scroll_failure_snaps_to_center() {
        let mut pager = WeekPager::new(d("2024-06-12"), 4, 4);
        pager.scroll_to_date(d("2024-07-10"), true);
        let req = pager.on_scroll_failed();
        assert_eq!(
            req,
            ScrollRequest {
                index: 4,
                animated: false
            }
        );
    }
}
