//! Day pager state machine driving the timeline.
//!
//! The pager owns a cursor day and renders a window of pages around it.
//! External selection changes (week strip, month grid, today button) are
//! debounced, then played as a single one-page animated step toward the
//! target regardless of distance; the cursor lands exactly on the target at
//! momentum end. Jumps beyond the page range skip the animation entirely.
//! User swipes go the other way: live previews while the finger is down,
//! one committed selection write at momentum end.
//!
//! Every recenter sets a resetting flag that the host clears after the next
//! frame, so the settle event caused by the recenter itself is never
//! mistaken for a user page change. Sequence tokens guard against a stale
//! external animation committing over a newer user gesture.

use chrono::{Duration as Days, NaiveDate, NaiveTime, Timelike};
use std::time::{Duration, Instant};
use tracing::debug;

use crate::date::{days_between, iso_day};
use crate::selection::{SelectionSource, SelectionStore};

pub const DEFAULT_DAY_RANGE: usize = 5;

/// Rapid external selection changes within this window are coalesced;
/// only the latest target is animated.
pub const EXTERNAL_SYNC_DEBOUNCE: Duration = Duration::from_millis(60);

/// What the host surface should do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayPagerCmd {
    /// Animate one page toward the target; the exact landing day is applied
    /// at momentum end.
    AnimateStep { forward: bool },
    /// Recenter on the cursor without animation (a data reset, not a pan).
    SnapCenter,
}

/// Outcome of pressing the today affordance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TodayAction {
    /// Selection was moved to today; the pager animates there via its
    /// normal external-sync path.
    Jump,
    /// Already on today: scroll the page vertically to the now marker.
    RevealNow,
}

#[derive(Debug)]
struct PendingExternal {
    target: NaiveDate,
    deadline: Instant,
    token: u64,
}

#[derive(Debug)]
struct InFlight {
    target: NaiveDate,
    token: u64,
}

pub struct DayPager {
    cursor: NaiveDate,
    before: usize,
    after: usize,
    seen_generation: u64,
    /// Bumped for every new external request and every user grab; a pending
    /// or in-flight sync whose token no longer matches is stale.
    token: u64,
    pending: Option<PendingExternal>,
    in_flight: Option<InFlight>,
    /// Page delta currently under the user's finger, if any.
    preview_delta: Option<i64>,
    resetting: bool,
}

impl DayPager {
    pub fn new(store: &SelectionStore, before: usize, after: usize) -> Self {
        Self {
            cursor: store.selected(),
            before,
            after,
            seen_generation: store.generation(),
            token: 0,
            pending: None,
            in_flight: None,
            preview_delta: None,
            resetting: false,
        }
    }

    pub fn cursor_day(&self) -> NaiveDate {
        self.cursor
    }

    pub fn center_index(&self) -> usize {
        self.before
    }

    pub fn page_count(&self) -> usize {
        self.before + self.after + 1
    }

    /// Days backing the window, oldest first; the cursor sits at
    /// [`center_index`](Self::center_index).
    pub fn pages(&self) -> Vec<NaiveDate> {
        let first = self.cursor - Days::days(self.before as i64);
        (0..self.page_count() as i64)
            .map(|i| first + Days::days(i))
            .collect()
    }

    pub fn is_resetting(&self) -> bool {
        self.resetting
    }

    /// The host calls this strictly after a `SnapCenter` has rendered.
    pub fn on_recentered(&mut self) {
        self.resetting = false;
    }

    /// Frame-driven sync against the selection store. Observes external
    /// changes, debounces them, and emits the resulting scroll command once
    /// the debounce window closes.
    pub fn poll(&mut self, store: &SelectionStore, now: Instant) -> Option<DayPagerCmd> {
        if let Some(change) = store.changed_since(self.seen_generation) {
            self.seen_generation = change.generation;

            if change.source.is_timeline_origin() {
                // self-originated, never re-trigger our own sync
            } else if change.source == SelectionSource::Init {
                self.cursor = change.day;
                self.token += 1;
                self.pending = None;
                self.in_flight = None;
                self.preview_delta = None;
                self.resetting = true;
                return Some(DayPagerCmd::SnapCenter);
            } else if change.day != self.cursor {
                self.token += 1;
                self.pending = Some(PendingExternal {
                    target: change.day,
                    deadline: now + EXTERNAL_SYNC_DEBOUNCE,
                    token: self.token,
                });
            }
        }

        if self.pending.as_ref().is_some_and(|p| now >= p.deadline) {
            if let Some(pending) = self.pending.take() {
                return self.fire_external(pending);
            }
        }

        None
    }

    fn fire_external(&mut self, pending: PendingExternal) -> Option<DayPagerCmd> {
        if pending.token != self.token {
            debug!(target = %iso_day(pending.target), "stale external sync discarded");
            return None;
        }
        if self.preview_delta.is_some() {
            // the user's finger is down; their gesture wins
            debug!(target = %iso_day(pending.target), "external sync dropped during user drag");
            return None;
        }

        let delta = days_between(self.cursor, pending.target);
        if delta == 0 {
            return None;
        }

        let range = if delta > 0 { self.after } else { self.before };
        if delta.unsigned_abs() as usize > range {
            debug!(target = %iso_day(pending.target), delta, "hard landing");
            self.cursor = pending.target;
            self.resetting = true;
            return Some(DayPagerCmd::SnapCenter);
        }

        self.in_flight = Some(InFlight {
            target: pending.target,
            token: pending.token,
        });
        Some(DayPagerCmd::AnimateStep { forward: delta > 0 })
    }

    /// The user grabbed the strip. Cancels any pending or in-flight external
    /// sync; whatever the gesture settles on wins.
    pub fn on_drag_begin(&mut self) {
        self.token += 1;
        self.pending = None;
        self.preview_delta.get_or_insert(0);
    }

    /// Live page delta implied by the current drag offset. Pushes a preview
    /// selection for the implied day whenever the delta changes, including
    /// the revert back to the cursor day when the finger returns to center.
    pub fn on_drag_offset(&mut self, page_delta: i64, store: &mut SelectionStore) {
        if self.resetting {
            return;
        }

        let delta = page_delta.clamp(-(self.before as i64), self.after as i64);
        let prev = *self.preview_delta.get_or_insert(0);
        if delta == prev {
            return;
        }

        self.preview_delta = Some(delta);
        let implied = self.cursor + Days::days(delta);
        store.set_selected(implied, SelectionSource::TimelinePreview);
        self.seen_generation = store.generation();
    }

    /// The strip settled `settled_delta` pages from center. This is the only
    /// path that performs a real, non-preview commit.
    pub fn on_momentum_end(
        &mut self,
        settled_delta: i64,
        store: &mut SelectionStore,
    ) -> Option<DayPagerCmd> {
        if self.resetting {
            return None;
        }

        if let Some(in_flight) = self.in_flight.take() {
            if in_flight.token == self.token {
                // external one-page step finished: land exactly on the
                // target, however far away it was
                self.cursor = in_flight.target;
                self.resetting = true;
                return Some(DayPagerCmd::SnapCenter);
            }
            if self.preview_delta.is_none() {
                // superseded by a newer external target, not by a user grab:
                // there is no gesture to commit, so recenter and let the
                // newer sync play out
                debug!(target = %iso_day(in_flight.target), "stale external settle discarded");
                self.resetting = true;
                return Some(DayPagerCmd::SnapCenter);
            }
            // superseded by a user grab; fall through to the gesture path
        }

        let delta = settled_delta.clamp(-(self.before as i64), self.after as i64);
        self.preview_delta = None;

        if delta == 0 {
            // back at center: the preview already reverted the selection
            return None;
        }

        self.cursor += Days::days(delta);
        store.set_selected(self.cursor, SelectionSource::Timeline);
        self.seen_generation = store.generation();
        self.resetting = true;
        Some(DayPagerCmd::SnapCenter)
    }

    /// Today affordance. Jumps selection when away from today, otherwise
    /// asks the host to reveal the now marker.
    pub fn press_today(&mut self, store: &mut SelectionStore, today: NaiveDate) -> TodayAction {
        if self.cursor != today {
            store.set_selected(today, SelectionSource::TodayButton);
            TodayAction::Jump
        } else {
            TodayAction::RevealNow
        }
    }
}

/// The live current-time marker. Holds the minute-of-day it was last
/// computed for so hosts can repaint at most once per minute and stop the
/// marker entirely when today scrolls away.
#[derive(Debug, Default)]
pub struct NowMarker {
    minute: Option<i32>,
}

impl NowMarker {
    /// Returns true when the displayed minute changed.
    pub fn tick(&mut self, now: NaiveTime) -> bool {
        let minute = (now.hour() * 60 + now.minute()) as i32;
        if self.minute == Some(minute) {
            return false;
        }
        self.minute = Some(minute);
        true
    }

    pub fn minute(&self) -> Option<i32> {
        self.minute
    }

    /// Today is no longer displayed (or the page unmounted).
    pub fn stop(&mut self) {
        self.minute = None;
    }
}
